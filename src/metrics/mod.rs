//! Aggregate time reports over an event log
//!
//! Three per-case measures, each averaged per calendar day with a
//! day-over-day rate of change:
//!
//! - cycle time: last event minus first event, dated by the first event
//! - service time: sum over the case's activities of (last - first) of that
//!   activity, dated by the first event of the case
//! - throughput time: last event minus first event, dated by the last event
//!
//! Events can also be restricted to literal date windows ("anomalous" or
//! "normal" periods) and summarised per activity and per case.
//!
//! These reports read logs leniently: unparseable timestamps are dropped
//! rather than rejected.

mod case_times;
mod daily;
mod periods;

pub use case_times::{case_spans, CaseSpan};
pub use daily::{daily_plot, daily_series, format_daily, DailyPoint};
pub use periods::{
    activity_summary, case_summary, filter_periods, format_activity_summary,
    format_case_summary, ActivitySummary, CaseSummary, Period,
};

use clap::ValueEnum;

/// Which per-case duration a report measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricKind {
    Cycle,
    Service,
    Throughput,
}

impl MetricKind {
    /// Capitalised name used in titles and labels
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Cycle => "Cycle",
            MetricKind::Service => "Service",
            MetricKind::Throughput => "Throughput",
        }
    }
}

#[cfg(test)]
mod tests;
