//! CLI argument parsing for procroc and roc-metrics

use crate::config::{ParseFailurePolicy, RocConfig};
use crate::error::Result;
use crate::metrics::{MetricKind, Period};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for ROC rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "procroc")]
#[command(version)]
#[command(about = "Rate-of-change analysis over process-mining event logs", long_about = None)]
pub struct Cli {
    /// Event log CSV file
    #[arg(long = "log_file", value_name = "FILE")]
    pub log_file: PathBuf,

    /// Column holding the case identifier
    #[arg(long = "case_id_column", value_name = "COLUMN")]
    pub case_id_column: String,

    /// Dependent variable column
    #[arg(long = "delta_y", value_name = "COLUMN")]
    pub delta_y: String,

    /// Independent variable column (numeric, or a timestamp for per-minute ROC)
    #[arg(long = "delta_x", value_name = "COLUMN")]
    pub delta_x: String,

    /// Case ids to analyse: none for all cases, one for a single case, several for a selection
    #[arg(long = "case_ids", value_name = "ID", num_args = 0..)]
    pub case_ids: Option<Vec<String>>,

    /// Output format (text, json or csv)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Handling of unparseable timestamps
    #[arg(long = "on-parse-failure", value_enum, value_name = "POLICY")]
    pub on_parse_failure: Option<ParseFailurePolicy>,

    /// Side log receiving discarded duplicate points
    #[arg(long = "discard-log", value_name = "FILE")]
    pub discard_log: Option<PathBuf>,

    /// Do not record discarded duplicate points
    #[arg(long = "no-discard-log")]
    pub no_discard_log: bool,

    /// Directory receiving plot pages
    #[arg(long = "plot-dir", value_name = "DIR")]
    pub plot_dir: Option<PathBuf>,

    /// Skip plot rendering
    #[arg(long = "no-plot")]
    pub no_plot: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Defaults, overlaid by `--config`, overlaid by explicit flags
    pub fn resolve_config(&self) -> Result<RocConfig> {
        let mut config = match &self.config {
            Some(path) => RocConfig::from_file(path)?,
            None => RocConfig::default(),
        };
        if let Some(policy) = self.on_parse_failure {
            config.on_parse_failure = policy;
        }
        if let Some(path) = &self.discard_log {
            config.discard_log = path.clone();
        }
        if self.no_discard_log {
            config.log_discards = false;
        }
        if let Some(dir) = &self.plot_dir {
            config.plot_dir = dir.clone();
        }
        if self.no_plot {
            config.render_plots = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Parser, Debug)]
#[command(name = "roc-metrics")]
#[command(version)]
#[command(about = "Daily cycle, service and throughput time reports with rate of change", long_about = None)]
pub struct MetricsCli {
    /// Event log CSV file
    #[arg(long = "log_file", value_name = "FILE")]
    pub log_file: PathBuf,

    /// Which per-case duration to report
    #[arg(long = "metric", value_enum)]
    pub metric: MetricKind,

    /// Column holding the case identifier
    #[arg(long = "case_id_column", value_name = "COLUMN", default_value = "case:concept:name")]
    pub case_id_column: String,

    /// Column holding the activity name
    #[arg(long = "activity_column", value_name = "COLUMN", default_value = "concept:name")]
    pub activity_column: String,

    /// Anomalous period as START,END (repeatable)
    #[arg(long = "anomalous", value_name = "START,END")]
    pub anomalous: Vec<Period>,

    /// Normal period as START,END (repeatable)
    #[arg(long = "normal", value_name = "START,END")]
    pub normal: Vec<Period>,

    /// Rows shown from filtered logs and case summaries
    #[arg(long = "head", value_name = "N", default_value = "5")]
    pub head: usize,

    /// Directory receiving the chart page
    #[arg(long = "plot-dir", value_name = "DIR", default_value = "roc_plots")]
    pub plot_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long = "no-plot")]
    pub no_plot: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
