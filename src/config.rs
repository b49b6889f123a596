//! Configuration file for sincecheck.
//!
//! Every setting is optional; command-line arguments override the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::lexer;

/// Config file names searched for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["sincecheck.yaml", ".sincecheck.yaml"];

/// Database written by `build` and read by `detect`.
pub const DEFAULT_DATABASE: &str = "wp-class-function-version.json";

/// Usage report written by `detect`.
pub const DEFAULT_REPORT: &str = "wp-version-detect.json";

/// Top-level corpus directory holding plugins and themes rather than core code.
pub const DEFAULT_EXCLUDED_DIR: &str = "wp-content";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Source file extensions to scan
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Top-level directories skipped when building the database
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    /// Glob patterns for paths to skip (e.g., "**/vendor/**")
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default = "default_report")]
    pub report: PathBuf,
}

fn default_extensions() -> Vec<String> {
    vec!["php".to_string()]
}

fn default_exclude_dirs() -> Vec<String> {
    vec![DEFAULT_EXCLUDED_DIR.to_string()]
}

fn default_database() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE)
}

fn default_report() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            exclude_paths: Vec::new(),
            database: default_database(),
            report: default_report(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        // An empty file is a valid, all-defaults config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load `explicit` if given, else the first default name found in `dir`,
    /// else the built-in defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(dir),
        };
        let config = match path {
            Some(p) => Self::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("cannot load config {}: {}", p.display(), e))?,
            None => Self::default(),
        };
        validate(&config)?;
        Ok(config)
    }
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Check that a config can be used as-is.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.extensions.is_empty() {
        anyhow::bail!("extensions must not be empty");
    }

    // Every extension needs a tokenizer
    lexer::init();
    for ext in &config.extensions {
        let dotted = format!(".{}", ext.trim_start_matches('.'));
        if lexer::for_extension(&dotted).is_none() {
            anyhow::bail!(
                "no tokenizer for extension {:?} (supported: {})",
                ext,
                lexer::supported_extensions().join(", ")
            );
        }
    }

    for pattern in &config.exclude_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid exclude_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}
