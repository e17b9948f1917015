//! Rate-of-change calculator
//!
//! For consecutive points of one trace (ordered by delta_x, deduplicated):
//!
//! ```text
//! ROC[i] = (delta_y[i] - delta_y[i-1]) / (delta_x[i] - delta_x[i-1])
//! ```
//!
//! When delta_x holds timestamps the denominator is converted to minutes.
//! `ROC[0]` is always null, as is any point whose numerator or denominator
//! is missing or whose denominator is zero.
//!
//! Three access modes share the single-trace primitive: all traces (case
//! blocks in first-appearance order), selected traces (caller order, absent
//! ids skipped), and a single trace (absent id is an error).

use crate::dedupe::dedupe_into;
use crate::discard_log::DiscardSink;
use crate::error::{Result, RocError};
use crate::preparation::PreparedTable;
use crate::trace::Trace;
use crate::value::{ColumnKind, Value};
use serde::Serialize;
use tracing::{debug, warn};

/// One output point: (case id, delta_x, delta_y, ROC)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocRow {
    pub case_id: String,
    pub delta_x: Value,
    pub delta_y: Value,
    pub roc: Option<f64>,
}

/// Compute the discrete derivative of delta_y over delta_x for one trace
///
/// The trace must already be ordered by delta_x and deduplicated. With
/// `time_aware` set, delta_x values are expected to be timestamps and their
/// differences are measured in minutes.
pub fn compute_roc(trace: &Trace<'_>, delta_y: usize, delta_x: usize, time_aware: bool) -> Vec<RocRow> {
    let mut out = Vec::with_capacity(trace.len());
    let mut previous: Option<(&Value, &Value)> = None;

    for row in trace.rows() {
        let (x, y) = (row.get(delta_x), row.get(delta_y));
        let roc = previous.and_then(|(px, py)| {
            let dy = y.as_f64()? - py.as_f64()?;
            let dx = step(px, x, time_aware)?;
            ratio(dy, dx)
        });

        out.push(RocRow {
            case_id: trace.case_id().to_string(),
            delta_x: x.clone(),
            delta_y: y.clone(),
            roc,
        });
        previous = Some((x, y));
    }

    out
}

/// Difference between consecutive delta_x values
fn step(previous: &Value, current: &Value, time_aware: bool) -> Option<f64> {
    if time_aware {
        Some(current.as_time()?.minutes_since(previous.as_time()?))
    } else {
        Some(current.as_f64()? - previous.as_f64()?)
    }
}

/// Quotient, or null for a zero or non-finite result
fn ratio(dy: f64, dx: f64) -> Option<f64> {
    if dx == 0.0 {
        return None;
    }
    let roc = dy / dx;
    roc.is_finite().then_some(roc)
}

/// Drives ROC computation over a prepared table
///
/// Discarded duplicates go to the injected sink when `log_discards` is set.
pub struct RocCalculator<'a> {
    table: &'a PreparedTable,
    delta_y: usize,
    delta_x: usize,
    time_aware: bool,
    sink: &'a mut dyn DiscardSink,
    log_discards: bool,
}

impl<'a> RocCalculator<'a> {
    /// Resolve the delta columns and check their types
    ///
    /// delta_y must be numeric; delta_x may be numeric or a timestamp, the
    /// latter selecting the time-aware branch.
    pub fn new(
        table: &'a PreparedTable,
        delta_y: &str,
        delta_x: &str,
        sink: &'a mut dyn DiscardSink,
        log_discards: bool,
    ) -> Result<Self> {
        let y = table.resolve_column(delta_y)?;
        let x = table.resolve_column(delta_x)?;

        if table.columns()[y].kind != ColumnKind::Number {
            return Err(RocError::NonNumericColumn(delta_y.to_string()));
        }
        let time_aware = match table.columns()[x].kind {
            ColumnKind::Time => true,
            ColumnKind::Number => false,
            ColumnKind::Text => return Err(RocError::NonNumericColumn(delta_x.to_string())),
        };

        Ok(Self {
            table,
            delta_y: y,
            delta_x: x,
            time_aware,
            sink,
            log_discards,
        })
    }

    /// Whether delta_x differences are measured in minutes
    pub fn is_time_aware(&self) -> bool {
        self.time_aware
    }

    pub fn delta_x_name(&self) -> &str {
        &self.table.columns()[self.delta_x].name
    }

    pub fn delta_y_name(&self) -> &str {
        &self.table.columns()[self.delta_y].name
    }

    /// ROC for exactly one case; fails if the case is absent
    pub fn single_trace(&mut self, case_id: &str) -> Result<Vec<RocRow>> {
        if !self.table.contains_case(case_id) {
            return Err(RocError::CaseNotFound(case_id.to_string()));
        }
        let trace = Trace::from_table(self.table, case_id, self.delta_x);
        self.trace_roc(trace)
    }

    /// ROC for every case, case blocks in first-appearance order
    pub fn all_traces(&mut self) -> Result<Vec<RocRow>> {
        let table = self.table;
        let mut out = Vec::with_capacity(table.len());
        for (case_id, indices) in table.partition_by_case() {
            let rows = indices.iter().map(|&i| &table.rows()[i]).collect();
            let trace = Trace::new(case_id, rows, self.delta_x);
            out.extend(self.trace_roc(trace)?);
        }
        Ok(out)
    }

    /// ROC for the given cases in the given order
    ///
    /// Ids absent from the table contribute nothing and are reported as a
    /// warning; the batch carries on.
    pub fn selected_traces(&mut self, case_ids: &[String]) -> Result<Vec<RocRow>> {
        let table = self.table;
        let groups = table.partition_by_case();
        let mut out = Vec::new();
        for case_id in case_ids {
            let Some(indices) = groups.get(case_id.as_str()) else {
                warn!(case_id = %case_id, "case not present in the log, skipping");
                continue;
            };
            let rows = indices.iter().map(|&i| &table.rows()[i]).collect();
            let trace = Trace::new(case_id.as_str(), rows, self.delta_x);
            out.extend(self.trace_roc(trace)?);
        }
        Ok(out)
    }

    fn trace_roc(&mut self, trace: Trace<'a>) -> Result<Vec<RocRow>> {
        let trace = dedupe_into(
            trace,
            self.delta_y,
            self.delta_x,
            self.table.columns(),
            &mut *self.sink,
            self.log_discards,
        )?;
        debug!(case_id = trace.case_id(), points = trace.len(), "computing ROC");
        Ok(compute_roc(&trace, self.delta_y, self.delta_x, self.time_aware))
    }
}
