//! The version database: documented classes and functions keyed by name.
//!
//! Persisted as JSON with two sorted tables:
//!
//! ```json
//! {
//!   "class":    { "<Name>": {"file": "...", "line": 1, "since": "...", "deprecated": "..."} },
//!   "function": { "<name>": {"file": "...", "line": 1, "since": "...", "deprecated": "..."} }
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{DeclarationRecord, EntityKind};

/// Errors loading or saving a database. All of them are fatal for detection.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("{} not found", .0.display())]
    Missing(PathBuf),
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is an invalid JSON database: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} holds no class or function table", .0.display())]
    Empty(PathBuf),
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where and when a name was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub file: String,
    pub line: usize,
    #[serde(default)]
    pub since: String,
    #[serde(default)]
    pub deprecated: String,
}

impl From<DeclarationRecord> for VersionEntry {
    fn from(record: DeclarationRecord) -> Self {
        Self {
            file: record.file,
            line: record.line,
            since: record.since,
            deprecated: record.deprecated,
        }
    }
}

/// Name-keyed tables of documented classes and functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDatabase {
    #[serde(rename = "class", default, deserialize_with = "table_or_empty_list")]
    classes: BTreeMap<String, VersionEntry>,
    #[serde(rename = "function", default, deserialize_with = "table_or_empty_list")]
    functions: BTreeMap<String, VersionEntry>,
}

/// An empty table may have been written as `[]` by other tools.
fn table_or_empty_list<'de, D>(deserializer: D) -> Result<BTreeMap<String, VersionEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Table {
        Map(BTreeMap<String, VersionEntry>),
        List(Vec<serde_json::Value>),
    }

    match Table::deserialize(deserializer)? {
        Table::Map(map) => Ok(map),
        Table::List(list) if list.is_empty() => Ok(BTreeMap::new()),
        Table::List(_) => Err(serde::de::Error::custom(
            "expected an object keyed by name",
        )),
    }
}

impl VersionDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any earlier record with the same name.
    pub fn merge(&mut self, record: DeclarationRecord) {
        let table = match record.kind {
            EntityKind::Class => &mut self.classes,
            EntityKind::Function => &mut self.functions,
        };
        table.insert(record.name.clone(), record.into());
    }

    pub fn lookup_function(&self, name: &str) -> Option<&VersionEntry> {
        self.functions.get(name)
    }

    pub fn lookup_class(&self, name: &str) -> Option<&VersionEntry> {
        self.classes.get(name)
    }

    pub fn functions(&self) -> &BTreeMap<String, VersionEntry> {
        &self.functions
    }

    pub fn classes(&self) -> &BTreeMap<String, VersionEntry> {
        &self.classes
    }

    /// Total number of classes and functions.
    pub fn len(&self) -> usize {
        self.classes.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.functions.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a database file.
    ///
    /// A file whose top level is not a JSON object, or is `{}`, is rejected
    /// as empty. Present but empty tables load fine.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DatabaseError::Missing(path.to_path_buf()))
            }
            Err(source) => {
                return Err(DatabaseError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let invalid = |source| DatabaseError::Invalid {
            path: path.to_path_buf(),
            source,
        };
        let value: serde_json::Value = serde_json::from_str(&content).map_err(invalid)?;
        if !value.as_object().is_some_and(|tables| !tables.is_empty()) {
            return Err(DatabaseError::Empty(path.to_path_buf()));
        }
        serde_json::from_value(value).map_err(invalid)
    }

    /// Write the database as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DatabaseError> {
        let path = path.as_ref();
        let json = self.to_json().map_err(|source| DatabaseError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json + "\n").map_err(|source| DatabaseError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
