//! Build phase: turns a reference corpus into a version database.

mod binder;
mod braces;
mod database;
mod extract;
mod runner;
mod tags;
mod types;

pub use binder::CommentBinder;
pub use braces::{classify as classify_brace, skip_body, BraceClass, SkipOutcome};
pub use database::{DatabaseError, VersionDatabase, VersionEntry};
pub use extract::extract_declarations;
pub use runner::{BuildOutcome, Builder};
pub use tags::{parse_version_tags, VersionTags, DEPRECATED_UNSPECIFIED};
pub use types::{BuildStats, DeclarationRecord, EntityKind, FileDeclarations};
