//! Build runner: scans a corpus and accumulates the version database.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::files::{self, FileFinder, SourceError};
use crate::lexer;

use super::{extract_declarations, BuildStats, EntityKind, VersionDatabase};

/// The database produced by a build plus what happened along the way.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub database: VersionDatabase,
    pub stats: BuildStats,
}

/// Scans every source file of a corpus into a [`VersionDatabase`].
///
/// Files are visited in lexicographic path order and merged one at a time,
/// so a name declared twice resolves to the same record on every run.
pub struct Builder {
    root: PathBuf,
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
    excluded_paths: Vec<String>,
    show_progress: bool,
}

impl Builder {
    /// Create a builder for the corpus rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        lexer::init();
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: vec!["php".to_string()],
            excluded_dirs: Vec::new(),
            excluded_paths: Vec::new(),
            show_progress: false,
        }
    }

    pub fn extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions.to_vec();
        self
    }

    /// Top-level directories holding content layered on the corpus.
    pub fn exclude_dirs(mut self, dirs: &[String]) -> Self {
        self.excluded_dirs = dirs.to_vec();
        self
    }

    pub fn exclude_paths(mut self, patterns: &[String]) -> Self {
        self.excluded_paths = patterns.to_vec();
        self
    }

    /// Show a progress spinner while scanning.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Scan the corpus. Unreadable or malformed files are skipped.
    pub fn run(&self) -> anyhow::Result<BuildOutcome> {
        info!("Scanning corpus {}", self.root.display());

        let finder = FileFinder::new(&self.root)
            .extensions(&self.extensions)
            .exclude_dirs(&self.excluded_dirs)
            .exclude_paths(&self.excluded_paths)?;

        let progress = if self.show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} files {wide_msg}")?,
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut outcome = BuildOutcome::default();
        for path in finder.files() {
            let rel = files::relative_path(&self.root, &path);
            progress.set_message(rel.clone());
            progress.inc(1);
            self.scan_file(&path, &rel, &mut outcome);
        }
        progress.finish_and_clear();

        let stats = &mut outcome.stats;
        stats.classes = outcome.database.classes().len();
        stats.functions = outcome.database.functions().len();
        info!(
            "Scanned {} files: {} classes, {} functions",
            stats.files_scanned, stats.classes, stats.functions
        );

        Ok(outcome)
    }

    fn scan_file(&self, path: &Path, rel: &str, outcome: &mut BuildOutcome) {
        debug!("{}", rel);

        let stream = match files::read_tokens(path) {
            Ok(stream) => stream,
            Err(SourceError::Malformed(e)) => {
                warn!("Malformed token stream in {}, treating as empty: {}", rel, e);
                outcome.stats.files_scanned += 1;
                outcome.stats.files_malformed += 1;
                return;
            }
            Err(e) => {
                warn!("Skipping {}: {}", rel, e);
                outcome.stats.files_skipped += 1;
                return;
            }
        };
        outcome.stats.files_scanned += 1;

        let declarations = extract_declarations(&stream.tokens, rel);
        if let Some(e) = &stream.unterminated {
            warn!("{} is truncated, kept what was found before it: {}", rel, e);
            outcome.stats.files_truncated += 1;
        } else if declarations.truncated {
            warn!("{} ends inside a declaration; kept what was found before it", rel);
            outcome.stats.files_truncated += 1;
        }
        if declarations.records.is_empty() {
            debug!("No documented declarations in {}", rel);
        }

        for record in declarations.records {
            if record.kind == EntityKind::Class {
                debug!("class {} since {:?}", record.name, record.since);
            }
            outcome.database.merge(record);
        }
    }
}
