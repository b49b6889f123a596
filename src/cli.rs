//! Command-line interface for sincecheck.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::build::Builder;
use crate::config::Config;
use crate::detect::Detector;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Find the minimum WordPress version a plugin or theme requires.
///
/// `build` scans a WordPress checkout and records the `@since` and
/// `@deprecated` versions documented on every class and function.
/// `detect` scans client code for calls to those functions and reports the
/// highest version among them.
#[derive(Parser)]
#[command(name = "sincecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every command.
#[derive(Args)]
pub struct GlobalArgs {
    /// Verbose output (per-file progress)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors and the final result
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the version database from a reference corpus
    Build(BuildArgs),
    /// Report versioned function calls in a file or directory
    ///
    /// The closing line names the highest version called, and leaves the
    /// version blank when no versioned function was called.
    Detect(DetectArgs),
}

/// Arguments for the build command.
#[derive(Parser)]
pub struct BuildArgs {
    /// Root of the reference corpus (e.g. a WordPress checkout)
    pub corpus: PathBuf,

    /// Top-level directory to leave out (default: wp-content)
    pub exclude_dir: Option<String>,

    /// Database file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the detect command.
#[derive(Parser)]
pub struct DetectArgs {
    /// Version database written by `build`
    pub database: PathBuf,

    /// File or directory to scan
    pub target: PathBuf,

    /// Usage report file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Set up the tracing subscriber. Logs go to stderr.
pub fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(global: &GlobalArgs) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir()?;
    Config::load(global.config.as_deref(), &cwd)
}

/// Run the build command.
pub fn run_build(args: &BuildArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let config = match load_config(global) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if !args.corpus.is_dir() {
        eprintln!(
            "Error: corpus root {} is not a directory",
            args.corpus.display()
        );
        return Ok(EXIT_ERROR);
    }

    let exclude_dirs = match &args.exclude_dir {
        Some(dir) => vec![dir.clone()],
        None => config.exclude_dirs.clone(),
    };
    let output = args.output.clone().unwrap_or_else(|| config.database.clone());

    let outcome = Builder::new(&args.corpus)
        .extensions(&config.extensions)
        .exclude_dirs(&exclude_dirs)
        .exclude_paths(&config.exclude_paths)
        .show_progress(!global.quiet)
        .run()?;

    if outcome.database.is_empty() {
        warn!(
            "No documented declarations found under {}",
            args.corpus.display()
        );
    }

    report::write_database(&outcome.database, &output)?;
    info!("Wrote {}", output.display());

    if !global.quiet {
        report::write_build_pretty(
            &args.corpus.to_string_lossy(),
            &output.to_string_lossy(),
            &outcome,
        );
    }

    Ok(EXIT_SUCCESS)
}

/// Run the detect command.
pub fn run_detect(args: &DetectArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let config = match load_config(global) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Without a usable database nothing can be detected
    let detector = match Detector::from_file(&args.database) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'sincecheck build <corpus>' to create a database");
            return Ok(EXIT_ERROR);
        }
    };
    let detector = detector
        .extensions(&config.extensions)
        .exclude_paths(&config.exclude_paths);

    let usage = detector.detect(&args.target)?;

    let output = args.output.clone().unwrap_or_else(|| config.report.clone());
    report::write_usage_report(&usage, &output)?;
    info!("Wrote {}", output.display());

    match args.format.as_str() {
        "json" => report::write_json(&usage)?,
        _ if global.quiet => {
            println!("{}", report::highest_version_line(&usage.highest_version()))
        }
        _ => report::write_detect_pretty(
            &display_path(&args.target),
            &display_path(&args.database),
            &usage,
        ),
    }

    Ok(EXIT_SUCCESS)
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
