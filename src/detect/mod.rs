//! Detect phase: finds calls to versioned functions in client code.
//!
//! This module provides:
//! - `scan_call_sites`: bare `name(` calls in one token stream
//! - `match_call_sites` / `highest_version`: the join with the version database
//! - `Detector`: file and directory scanning producing a `UsageReport`

mod calls;
mod matcher;
mod runner;
mod types;

pub use calls::{scan_call_sites, CallSite};
pub use matcher::{highest_version, match_call_sites};
pub use runner::Detector;
pub use types::{DetectStats, UsageGroups, UsageLines, UsageRecord, UsageReport};
