//! Core types for the build phase.

use serde::{Deserialize, Serialize};

/// What kind of declaration a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Class,
    Function,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Function => "function",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A documented class or function found in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRecord {
    pub name: String,
    pub kind: EntityKind,
    /// Source file, relative to the corpus root
    pub file: String,
    /// Line of the declaration's name (1-indexed)
    pub line: usize,
    pub since: String,
    pub deprecated: String,
}

/// Declarations extracted from one file.
#[derive(Debug, Clone, Default)]
pub struct FileDeclarations {
    pub records: Vec<DeclarationRecord>,
    /// The token stream ended inside a declaration
    pub truncated: bool,
}

/// Counters collected while building a database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub files_scanned: usize,
    /// Files that could not be read
    pub files_skipped: usize,
    /// Files whose token stream could not be produced
    pub files_malformed: usize,
    /// Files that ended inside a declaration or an unclosed comment or string
    pub files_truncated: usize,
    pub classes: usize,
    pub functions: usize,
}
