//! Detection runner: scans client files against a version database.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::build::{DatabaseError, VersionDatabase};
use crate::files::{self, FileFinder, SourceError};
use crate::lexer;

use super::{match_call_sites, scan_call_sites, CallSite, UsageGroups, UsageReport};

/// Finds versioned function calls in client code.
///
/// The database is loaded once and only read afterwards.
pub struct Detector {
    database: VersionDatabase,
    extensions: Vec<String>,
    excluded_paths: Vec<String>,
}

impl Detector {
    pub fn new(database: VersionDatabase) -> Self {
        lexer::init();
        Self {
            database,
            extensions: vec!["php".to_string()],
            excluded_paths: Vec::new(),
        }
    }

    /// Load the database from `path`. A missing, unreadable, invalid or
    /// empty database is an error; no detection is attempted without one.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let database = VersionDatabase::load(path)?;
        Ok(Self::new(database))
    }

    pub fn extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions.to_vec();
        self
    }

    pub fn exclude_paths(mut self, patterns: &[String]) -> Self {
        self.excluded_paths = patterns.to_vec();
        self
    }

    pub fn database(&self) -> &VersionDatabase {
        &self.database
    }

    /// Scan a file or a directory tree, whichever `target` is.
    /// A target that does not exist yields an empty report.
    pub fn detect<P: AsRef<Path>>(&self, target: P) -> anyhow::Result<UsageReport> {
        let target = target.as_ref();
        if target.is_dir() {
            self.detect_tree(target)
        } else if target.exists() {
            Ok(self.detect_file(target))
        } else {
            warn!("Target {} does not exist", target.display());
            Ok(UsageReport::new())
        }
    }

    /// Scan one client file. Lines are reported as a plain list.
    pub fn detect_file<P: AsRef<Path>>(&self, path: P) -> UsageReport {
        let path = path.as_ref();
        let mut report = UsageReport::new();
        let name = files::relative_path(path, path);

        if let Some(sites) = self.scan_file(path, &name, &mut report) {
            report.usages = match_call_sites(&sites, &self.database);
            report.stats.matched_calls = report.usages.values().map(|u| u.call_count()).sum();
        }

        report
    }

    /// Scan every client file under `root`, grouping lines by relative path.
    pub fn detect_tree<P: AsRef<Path>>(&self, root: P) -> anyhow::Result<UsageReport> {
        let root = root.as_ref();
        info!("Scanning {}", root.display());

        let finder = FileFinder::new(root)
            .extensions(&self.extensions)
            .exclude_paths(&self.excluded_paths)?;

        let mut report = UsageReport::new();
        let mut groups = UsageGroups::new();
        for path in finder.files() {
            let rel = files::relative_path(root, &path);
            let Some(sites) = self.scan_file(&path, &rel, &mut report) else {
                continue;
            };
            let matches = match_call_sites(&sites, &self.database);
            report.stats.matched_calls +=
                matches.values().map(|u| u.call_count()).sum::<usize>();
            groups.add_file(&rel, matches);
        }
        report.usages = groups.into_usages();

        info!(
            "Found {} versioned functions in {} files",
            report.len(),
            report.stats.files_scanned
        );
        Ok(report)
    }

    /// Tokenize and scan one file, updating the counters.
    /// Returns `None` when the file could not be read.
    fn scan_file(
        &self,
        path: &Path,
        rel: &str,
        report: &mut UsageReport,
    ) -> Option<Vec<CallSite>> {
        debug!("{}", rel);

        let sites = match files::read_tokens(path) {
            Ok(stream) => {
                if let Some(e) = &stream.unterminated {
                    warn!("{} is truncated, kept calls found before it: {}", rel, e);
                    report.stats.files_truncated += 1;
                }
                scan_call_sites(&stream.tokens)
            }
            Err(SourceError::Malformed(e)) => {
                warn!("Malformed token stream in {}, treating as empty: {}", rel, e);
                report.stats.files_malformed += 1;
                Vec::new()
            }
            Err(e) => {
                warn!("Skipping {}: {}", rel, e);
                report.stats.files_skipped += 1;
                return None;
            }
        };

        report.stats.files_scanned += 1;
        report.stats.call_sites += sites.len();
        Some(sites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{DeclarationRecord, EntityKind};
    use crate::detect::UsageLines;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn detector() -> Detector {
        let mut db = VersionDatabase::new();
        for (name, since) in [("alpha", "4.0.0"), ("gamma", "4.10")] {
            db.merge(DeclarationRecord {
                name: name.to_string(),
                kind: EntityKind::Function,
                file: "wp-includes/functions.php".to_string(),
                line: 1,
                since: since.to_string(),
                deprecated: String::new(),
            });
        }
        Detector::new(db)
    }

    #[test]
    fn test_detect_single_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("client.php");
        fs::write(&file, "<?php\nalpha();\nbeta();\nalpha();\n").unwrap();

        let report = detector().detect(&file).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.usages["alpha"].lines, UsageLines::Single(vec![2, 4]));
        assert_eq!(report.highest_version(), "4.0.0");
        assert_eq!(report.stats.call_sites, 3);
        assert_eq!(report.stats.matched_calls, 2);
    }

    #[test]
    fn test_detect_tree_groups_by_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("inc")).unwrap();
        fs::write(temp.path().join("main.php"), "<?php\nalpha();\n").unwrap();
        fs::write(temp.path().join("inc/util.php"), "<?php\n\ngamma(); alpha();\n").unwrap();
        fs::write(temp.path().join("inc/open.php"), "<?php gamma(); /* open").unwrap();

        let report = detector().detect(temp.path()).unwrap();
        assert_eq!(
            report.usages["alpha"].lines,
            UsageLines::ByFile(BTreeMap::from([
                ("inc/util.php".to_string(), vec![3]),
                ("main.php".to_string(), vec![2]),
            ]))
        );
        assert_eq!(
            report.usages["gamma"].lines,
            UsageLines::ByFile(BTreeMap::from([
                ("inc/open.php".to_string(), vec![1]),
                ("inc/util.php".to_string(), vec![3]),
            ]))
        );
        assert_eq!(report.highest_version(), "4.10");
        assert_eq!(report.stats.files_scanned, 3);
        assert_eq!(report.stats.files_malformed, 0);
        assert_eq!(report.stats.files_truncated, 1);
    }

    #[test]
    fn test_latin1_comment_does_not_hide_calls() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("client.php");
        fs::write(&file, b"<?php\n// caf\xE9\nalpha();").unwrap();

        let report = detector().detect(&file).unwrap();
        assert_eq!(report.usages["alpha"].lines, UsageLines::Single(vec![3]));
        assert_eq!(report.stats.files_malformed, 0);
        assert_eq!(report.stats.matched_calls, 1);
    }

    #[test]
    fn test_missing_target_is_empty() {
        let temp = TempDir::new().unwrap();
        let report = detector().detect(temp.path().join("nope.php")).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_missing_database_is_fatal() {
        let temp = TempDir::new().unwrap();
        let result = Detector::from_file(temp.path().join("missing.json"));
        assert!(matches!(result, Err(DatabaseError::Missing(_))));
    }
}
