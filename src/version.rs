//! Ordering of version strings as they appear in `@since` tags.
//!
//! Versions are compared run by run: digits numerically, text
//! case-insensitively. A text run sorts before a number, so `4.9-beta`
//! comes before `4.9`, which comes before `4.9.1`.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run<'a> {
    Number(&'a str),
    Text(&'a str),
}

/// Split a version string into alternating numeric and alphabetic runs.
/// Any other character acts as a separator.
fn runs(version: &str) -> Vec<Run<'_>> {
    let mut out = Vec::new();
    let mut start: Option<(usize, bool)> = None;

    for (i, c) in version.char_indices() {
        let class = if c.is_ascii_digit() {
            Some(true)
        } else if c.is_alphabetic() {
            Some(false)
        } else {
            None
        };
        match (start, class) {
            (Some((_, digit)), Some(d)) if digit == d => {}
            (Some((s, digit)), _) => {
                out.push(make_run(&version[s..i], digit));
                start = class.map(|d| (i, d));
            }
            (None, Some(d)) => start = Some((i, d)),
            (None, None) => {}
        }
    }
    if let Some((s, digit)) = start {
        out.push(make_run(&version[s..], digit));
    }
    out
}

fn make_run(text: &str, digit: bool) -> Run<'_> {
    if digit {
        Run::Number(text)
    } else {
        Run::Text(text)
    }
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_runs(a: &Run<'_>, b: &Run<'_>) -> Ordering {
    match (a, b) {
        (Run::Number(x), Run::Number(y)) => compare_numbers(x, y),
        (Run::Text(x), Run::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Run::Text(_), Run::Number(_)) => Ordering::Less,
        (Run::Number(_), Run::Text(_)) => Ordering::Greater,
    }
}

/// Compare two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = runs(a.trim());
    let right = runs(b.trim());

    for (x, y) in left.iter().zip(right.iter()) {
        let ord = compare_runs(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    // One side has extra runs: extra text is a pre-release marker,
    // extra numbers a later patch level.
    match left.len().cmp(&right.len()) {
        Ordering::Equal => a.trim().cmp(b.trim()),
        Ordering::Greater => match left[right.len()] {
            Run::Text(_) => Ordering::Less,
            Run::Number(_) => Ordering::Greater,
        },
        Ordering::Less => match right[left.len()] {
            Run::Text(_) => Ordering::Greater,
            Run::Number(_) => Ordering::Less,
        },
    }
}

/// The greatest non-empty version among `versions`, or an empty string.
pub fn max_version<'a, I>(versions: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .max_by(|a, b| compare_versions(a, b))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs_compare_numerically() {
        assert_eq!(compare_versions("4.10", "4.9"), Ordering::Greater);
        assert_eq!(compare_versions("4.9.0", "4.9"), Ordering::Greater);
        assert_eq!(compare_versions("2.0.0", "10.0"), Ordering::Less);
        assert_eq!(compare_versions("4.09", "4.9"), Ordering::Less);
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        assert_eq!(compare_versions("5.0-beta1", "5.0"), Ordering::Less);
        assert_eq!(compare_versions("5.0-alpha", "5.0-beta"), Ordering::Less);
        assert_eq!(compare_versions("5.0", "5.0-RC1"), Ordering::Greater);
    }

    #[test]
    fn test_text_prefix_is_ignored_as_separator() {
        assert_eq!(compare_versions("MU (3.0.0)", "MU (3.0.0)"), Ordering::Equal);
        assert_eq!(compare_versions("3.0.0", "3.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_max_version() {
        assert_eq!(max_version(["4.2.0", "4.9.0", "4.0.0"]), "4.9.0");
        assert_eq!(max_version(["", "1.5", " "]), "1.5");
        assert_eq!(max_version(Vec::<&str>::new()), "");
        assert_eq!(max_version(["", ""]), "");
    }
}
