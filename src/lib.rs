//! procroc - rate-of-change analysis over process-mining event logs
//!
//! An event log is prepared (sorted by case and time, enriched with elapsed
//! minutes and daily frequencies), split into per-case traces, deduplicated,
//! and differentiated: the ROC of a dependent column over an independent one.
//! Results go to text, CSV or JSON output and to a pluggable plotter. The
//! [`metrics`] module adds daily cycle, service and throughput time reports.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod dedupe;
pub mod discard_log;
pub mod error;
pub mod event_log;
pub mod html_output;
pub mod json_output;
pub mod metrics;
pub mod plot;
pub mod preparation;
pub mod roc;
pub mod scenario;
pub mod text_output;
pub mod trace;
pub mod value;

pub use error::{Result, RocError};
