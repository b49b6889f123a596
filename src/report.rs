//! Output formatting for sincecheck results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the usage report itself, for programmatic consumption

use colored::*;
use std::fs;
use std::path::Path;

use crate::build::{BuildOutcome, VersionDatabase};
use crate::detect::{UsageRecord, UsageReport};

// =============================================================================
// Files
// =============================================================================

/// Write the version database as pretty-printed JSON.
pub fn write_database(database: &VersionDatabase, path: &Path) -> anyhow::Result<()> {
    create_parent(path)?;
    database.save(path)?;
    Ok(())
}

/// Write the usage report as pretty-printed JSON.
pub fn write_usage_report(report: &UsageReport, path: &Path) -> anyhow::Result<()> {
    create_parent(path)?;
    let json = report.to_json()?;
    fs::write(path, json + "\n")
        .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path.display(), e))?;
    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// =============================================================================
// JSON Format
// =============================================================================

/// Print the usage report to stdout.
pub fn write_json(report: &UsageReport) -> anyhow::Result<()> {
    println!("{}", report.to_json()?);
    Ok(())
}

/// The closing summary line of a detection run. The version is left blank
/// when no versioned function was called.
pub fn highest_version_line(version: &str) -> String {
    format!("The highest version number is {}.", version)
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header() {
    println!();
    print!("  ");
    print!("{}", "sincecheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
}

/// Summarize a build in pretty format.
pub fn write_build_pretty(corpus: &str, database_path: &str, outcome: &BuildOutcome) {
    let stats = &outcome.stats;

    write_header();
    print!("  {}", "Corpus:   ".dimmed());
    println!("{}", corpus);
    print!("  {}", "Database: ".dimmed());
    println!("{}", database_path);
    println!();

    println!(
        "  {} {} files  {} classes  {} functions",
        "✓".green(),
        stats.files_scanned,
        stats.classes.to_string().bold(),
        stats.functions.to_string().bold()
    );

    let mut notes = Vec::new();
    if stats.files_skipped > 0 {
        notes.push(format!("{} unreadable", stats.files_skipped));
    }
    if stats.files_malformed > 0 {
        notes.push(format!("{} malformed", stats.files_malformed));
    }
    if stats.files_truncated > 0 {
        notes.push(format!("{} truncated", stats.files_truncated));
    }
    if !notes.is_empty() {
        println!("    {}", format!("({})", notes.join(", ")).yellow());
    }
    println!();
}

/// Summarize a detection run in pretty format.
pub fn write_detect_pretty(target: &str, database_path: &str, report: &UsageReport) {
    write_header();
    print!("  {}", "Scanning: ".dimmed());
    println!("{}", target);
    print!("  {}", "Database: ".dimmed());
    println!("{}", database_path);
    println!();

    if !report.is_empty() {
        write_usages(report);
        println!();
    }

    let stats = &report.stats;
    println!(
        "  {}",
        format!(
            "{} files scanned, {} of {} calls matched",
            stats.files_scanned, stats.matched_calls, stats.call_sites
        )
        .dimmed()
    );
    println!();

    let version = report.highest_version();
    if version.is_empty() {
        println!("  {}", highest_version_line(&version));
        println!("  {}", "(no versioned functions were called)".dimmed());
    } else {
        println!("  {}", highest_version_line(&version).bold());
    }
    println!();
}

fn write_usages(report: &UsageReport) {
    println!("  {} ({}):", "Functions".bold(), report.len());
    println!();

    for usage in report.usages.values() {
        println!("    {}", usage_row(usage));
    }
}

/// One table row: name, since, call count and deprecation.
fn usage_row(usage: &UsageRecord) -> String {
    let since = if usage.since.is_empty() {
        "?".dimmed()
    } else {
        usage.since.as_str().green()
    };
    let calls = usage.call_count();
    let plural = if calls != 1 { "s" } else { "" };

    let mut row = format!(
        "{:<40} {:<10} {}",
        usage.function,
        since,
        format!("{} call{}", calls, plural).dimmed()
    );
    if usage.is_deprecated() {
        row.push_str(&format!("  {}", deprecated_note(&usage.deprecated).yellow()));
    }
    row
}

fn deprecated_note(deprecated: &str) -> String {
    if deprecated == crate::build::DEPRECATED_UNSPECIFIED {
        "deprecated".to_string()
    } else {
        format!("deprecated {}", deprecated)
    }
}
