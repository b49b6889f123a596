//! Sincecheck - minimum required version detection for WordPress code.
//!
//! Sincecheck works in two phases:
//!
//! 1. **Build**: scan a reference corpus (a WordPress checkout) and record,
//!    for every documented class and function, the version given by the
//!    `@since` and `@deprecated` tags of the doc block directly above it.
//! 2. **Detect**: scan client code (a plugin or theme) for bare function
//!    calls, join them with the database and report every use plus the
//!    highest introduced version among them.
//!
//! # Architecture
//!
//! Both phases are lexical scans over a token stream, not full parses:
//!
//! - `lexer`: token model, seekable cursor and the PHP tokenizer
//! - `files`: corpus and client file enumeration
//! - `build`: doc-comment binding, body skipping, tag parsing, the database
//! - `detect`: call-site scanning and the cross-reference with the database
//! - `version`: natural ordering of version strings
//! - `config`: YAML configuration file
//! - `report`: output formatting (pretty, JSON)

pub mod build;
pub mod cli;
pub mod config;
pub mod detect;
pub mod files;
pub mod lexer;
pub mod report;
pub mod version;

pub use build::{BuildOutcome, Builder, DatabaseError, VersionDatabase, VersionEntry};
pub use config::Config;
pub use detect::{CallSite, Detector, UsageLines, UsageRecord, UsageReport};
pub use lexer::{for_extension, Token, TokenKind, TokenStream, Tokenizer};
pub use version::{compare_versions, max_version};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    lexer::init();
}
