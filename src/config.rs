//! Run configuration for the ROC pipeline
//!
//! Values come from `RocConfig::default()`, optionally overlaid by a TOML
//! file (`--config`), and finally by command-line flags.

use crate::error::{Result, RocError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What to do with a timestamp cell that cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    /// Abort with a parse error (calculator pipeline)
    Reject,
    /// Silently drop the row (aggregate reports)
    Drop,
}

/// Configuration for a calculator run
///
/// # Example
/// ```
/// use procroc::config::{ParseFailurePolicy, RocConfig};
///
/// let config = RocConfig::default();
/// assert_eq!(config.on_parse_failure, ParseFailurePolicy::Reject);
/// assert!(config.log_discards);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocConfig {
    /// Timestamp parse failure handling
    ///
    /// The calculator rejects unparseable timestamps outright; the aggregate
    /// reports drop them. Both are kept as an explicit choice.
    pub on_parse_failure: ParseFailurePolicy,

    /// Append discarded duplicate points to the side log
    ///
    /// When false, duplicates are still removed from the trace but leave no
    /// record behind.
    pub log_discards: bool,

    /// Append-only side log of discarded points
    pub discard_log: PathBuf,

    /// Directory receiving rendered plot pages
    pub plot_dir: PathBuf,

    /// Render plots at all
    pub render_plots: bool,
}

impl Default for RocConfig {
    fn default() -> Self {
        Self {
            on_parse_failure: ParseFailurePolicy::Reject,
            log_discards: true,
            discard_log: PathBuf::from("discarded_events.csv"),
            plot_dir: PathBuf::from("roc_plots"),
            render_plots: true,
        }
    }
}

impl RocConfig {
    /// Configuration used by the aggregate reports
    pub fn lenient() -> Self {
        Self {
            on_parse_failure: ParseFailurePolicy::Drop,
            log_discards: false,
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| RocError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.discard_log.as_os_str().is_empty() {
            return Err(RocError::Config("discard_log must not be empty".to_string()));
        }
        if self.plot_dir.as_os_str().is_empty() {
            return Err(RocError::Config("plot_dir must not be empty".to_string()));
        }
        Ok(())
    }
}
