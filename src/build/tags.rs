//! `@since` / `@deprecated` tag parsing for documentation blocks.

use lazy_static::lazy_static;
use regex::Regex;

/// Value stored for `@deprecated` without a version.
pub const DEPRECATED_UNSPECIFIED: &str = "-";

lazy_static! {
    /// A version tag anywhere on a doc line, with its trailing text.
    static ref TAG_PATTERN: Regex = Regex::new(r"(?i)@(since|deprecated)(.*)$").unwrap();
}

/// Version information extracted from one doc block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionTags {
    pub since: String,
    pub deprecated: String,
}

/// Parse the version tags of a doc block.
///
/// The first non-empty `@since` wins. Every `@deprecated` with a value
/// overwrites the previous one; a bare `@deprecated` records
/// [`DEPRECATED_UNSPECIFIED`] unless a version was already seen.
pub fn parse_version_tags(doc: &str) -> VersionTags {
    let mut tags = VersionTags::default();

    let lines = doc.lines().map(clean_line).filter(|l| !l.is_empty());
    for line in lines {
        let Some(caps) = TAG_PATTERN.captures(line) else {
            continue;
        };
        let tag = caps[1].to_ascii_lowercase();
        let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

        match (tag.as_str(), value.is_empty()) {
            ("since", false) if tags.since.is_empty() => tags.since = value.to_string(),
            ("deprecated", false) => tags.deprecated = value.to_string(),
            ("deprecated", true)
                if tags.deprecated.is_empty() || tags.deprecated == DEPRECATED_UNSPECIFIED =>
            {
                tags.deprecated = DEPRECATED_UNSPECIFIED.to_string()
            }
            _ => {}
        }
    }

    tags
}

/// Trim a doc line and drop a trailing comment terminator.
fn clean_line(line: &str) -> &str {
    let line = line.trim();
    line.strip_suffix("*/").map(str::trim_end).unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_and_deprecated() {
        let tags = parse_version_tags(
            "/**\n * 'xyz' function.\n *\n * @since    1.0.0\n * @deprecated 1.0.1\n */",
        );
        assert_eq!(tags.since, "1.0.0");
        assert_eq!(tags.deprecated, "1.0.1");
    }

    #[test]
    fn test_single_line_block() {
        let tags = parse_version_tags("/** @since 4.0.0 */");
        assert_eq!(tags.since, "4.0.0");
        assert_eq!(tags.deprecated, "");
    }

    #[test]
    fn test_first_since_wins() {
        let tags = parse_version_tags(
            "/**\n * @since 2.1.0\n * @since 3.0.0 Added the $args parameter.\n */",
        );
        assert_eq!(tags.since, "2.1.0");
    }

    #[test]
    fn test_empty_since_is_ignored() {
        let tags = parse_version_tags("/**\n * @since\n * @since 1.5\n */");
        assert_eq!(tags.since, "1.5");

        let tags = parse_version_tags("/**\n * @since\n */");
        assert_eq!(tags.since, "");
    }

    #[test]
    fn test_bare_deprecated_uses_sentinel() {
        let tags = parse_version_tags("/**\n * @since\n * @deprecated\n */");
        assert_eq!(tags.since, "");
        assert_eq!(tags.deprecated, DEPRECATED_UNSPECIFIED);
    }

    #[test]
    fn test_bare_deprecated_keeps_explicit_version() {
        let tags = parse_version_tags("/**\n * @deprecated 3.1.0\n * @deprecated\n */");
        assert_eq!(tags.deprecated, "3.1.0");

        let tags = parse_version_tags("/**\n * @deprecated 3.1.0\n * @deprecated 3.2.0 Use bar()\n */");
        assert_eq!(tags.deprecated, "3.2.0 Use bar()");
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        let tags = parse_version_tags("/**\n * @Since 2.0\n * @DEPRECATED 2.5\n */");
        assert_eq!(tags.since, "2.0");
        assert_eq!(tags.deprecated, "2.5");
    }

    #[test]
    fn test_block_without_tags() {
        assert_eq!(parse_version_tags("/** Just a summary. */"), VersionTags::default());
    }
}
