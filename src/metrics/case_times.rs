//! Per-case durations

use super::MetricKind;
use crate::error::Result;
use crate::preparation::{PreparedRow, PreparedTable};
use crate::value::{Timestamp, Value};
use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::debug;

/// One case's duration and the day it is reported under
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSpan {
    pub case_id: String,
    pub date: NaiveDate,
    pub hours: f64,
}

/// Measure every case in the table
///
/// `activity_column` is only consulted for service time. Cases come out in
/// the table's case order.
pub fn case_spans(
    table: &PreparedTable,
    kind: MetricKind,
    activity_column: &str,
) -> Result<Vec<CaseSpan>> {
    let activity = match kind {
        MetricKind::Service => Some(table.resolve_column(activity_column)?),
        MetricKind::Cycle | MetricKind::Throughput => None,
    };

    let mut spans = Vec::new();
    for (case_id, indices) in table.partition_by_case() {
        let rows: Vec<&PreparedRow> = indices.iter().map(|&i| &table.rows()[i]).collect();
        // rows are in timestamp order within a case
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            continue;
        };
        let (start, end) = (first.timestamp(), last.timestamp());

        let (date, hours) = match kind {
            MetricKind::Cycle => (start.date(), end.hours_since(start)),
            MetricKind::Throughput => (end.date(), end.hours_since(start)),
            MetricKind::Service => (
                start.date(),
                activity.map_or(0.0, |column| service_hours(&rows, column)),
            ),
        };
        spans.push(CaseSpan {
            case_id: case_id.to_string(),
            date,
            hours,
        });
    }

    debug!(metric = kind.label(), cases = spans.len(), "measured cases");
    Ok(spans)
}

/// Sum of (last - first) per activity; events without an activity are ignored
fn service_hours(rows: &[&PreparedRow], activity: usize) -> f64 {
    let mut windows: IndexMap<&Value, (Timestamp, Timestamp)> = IndexMap::new();
    for row in rows {
        let name = row.get(activity);
        if name.is_null() {
            continue;
        }
        let ts = *row.timestamp();
        windows
            .entry(name)
            .and_modify(|(lo, hi)| {
                *lo = (*lo).min(ts);
                *hi = (*hi).max(ts);
            })
            .or_insert((ts, ts));
    }
    windows.values().map(|(lo, hi)| hi.hours_since(lo)).sum()
}
