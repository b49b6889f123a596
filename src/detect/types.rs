//! Core types for detection results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::build::VersionEntry;

use super::highest_version;

/// Lines on which a function is called.
///
/// A single target file yields a plain list; a directory target groups
/// the lines by file path relative to the target root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UsageLines {
    Single(Vec<usize>),
    ByFile(BTreeMap<String, Vec<usize>>),
}

impl UsageLines {
    /// Total number of recorded call sites.
    pub fn count(&self) -> usize {
        match self {
            UsageLines::Single(lines) => lines.len(),
            UsageLines::ByFile(files) => files.values().map(Vec::len).sum(),
        }
    }

    /// Every line, flattened in file order.
    pub fn into_vec(self) -> Vec<usize> {
        match self {
            UsageLines::Single(lines) => lines,
            UsageLines::ByFile(files) => files.into_values().flatten().collect(),
        }
    }
}

/// One versioned function used by the client code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub function: String,
    /// Declaring file within the corpus
    #[serde(rename = "wp_core_file")]
    pub core_file: String,
    #[serde(rename = "wp_core_line")]
    pub core_line: usize,
    pub since: String,
    pub deprecated: String,
    #[serde(rename = "line")]
    pub lines: UsageLines,
}

impl UsageRecord {
    /// Seed a record from the function's database entry.
    pub fn new(function: &str, entry: &VersionEntry, lines: UsageLines) -> Self {
        Self {
            function: function.to_string(),
            core_file: entry.file.clone(),
            core_line: entry.line,
            since: entry.since.clone(),
            deprecated: entry.deprecated.clone(),
            lines,
        }
    }

    pub fn call_count(&self) -> usize {
        self.lines.count()
    }

    pub fn is_deprecated(&self) -> bool {
        !self.deprecated.is_empty()
    }
}

/// Counters collected while scanning client files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectStats {
    pub files_scanned: usize,
    /// Files that could not be read
    pub files_skipped: usize,
    /// Files whose token stream could not be produced
    pub files_malformed: usize,
    /// Files that ended inside an unclosed comment or string
    pub files_truncated: usize,
    /// Bare calls found, matched or not
    pub call_sites: usize,
    /// Calls to functions present in the database
    pub matched_calls: usize,
}

/// Collects the per-file matches of a directory scan.
#[derive(Debug, Default)]
pub struct UsageGroups {
    records: BTreeMap<String, UsageRecord>,
    lines: BTreeMap<String, BTreeMap<String, Vec<usize>>>,
}

impl UsageGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file's matches under its relative path.
    pub fn add_file(&mut self, file: &str, matches: BTreeMap<String, UsageRecord>) {
        for (name, record) in matches {
            self.lines
                .entry(name.clone())
                .or_default()
                .entry(file.to_string())
                .or_default()
                .extend(record.lines.clone().into_vec());
            self.records.entry(name).or_insert(record);
        }
    }

    /// One record per function, its lines keyed by file.
    pub fn into_usages(self) -> BTreeMap<String, UsageRecord> {
        let mut lines = self.lines;
        self.records
            .into_iter()
            .map(|(name, mut record)| {
                record.lines = UsageLines::ByFile(lines.remove(&name).unwrap_or_default());
                (name, record)
            })
            .collect()
    }
}

/// Usage of versioned functions across one detection target.
#[derive(Debug, Clone, Default)]
pub struct UsageReport {
    pub usages: BTreeMap<String, UsageRecord>,
    pub stats: DetectStats,
}

impl UsageReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The highest `since` among used functions, or empty when none matched.
    pub fn highest_version(&self) -> String {
        highest_version(self.usages.values())
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    /// Number of distinct functions used.
    pub fn len(&self) -> usize {
        self.usages.len()
    }

    /// Pretty JSON of the usage map, the persisted report format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.usages)
    }
}
