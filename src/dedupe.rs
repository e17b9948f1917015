//! Per-trace removal of repeated measurement points
//!
//! Within one trace (already ordered by delta_x), a row whose
//! (delta_y, delta_x) pair equals that of an earlier row is dropped; the
//! first occurrence wins. Nulls compare equal to nulls.

use crate::discard_log::{DiscardSink, DiscardedEvent};
use crate::error::Result;
use crate::preparation::Column;
use crate::trace::Trace;
use crate::value::Value;
use std::collections::HashSet;
use tracing::debug;

/// A trace with duplicates removed, plus what was removed
#[derive(Debug, Clone)]
pub struct Deduplicated<'t> {
    pub trace: Trace<'t>,
    pub discarded: Vec<DiscardedEvent>,
}

/// Remove repeated (delta_y, delta_x) pairs from a trace
pub fn dedupe<'t>(trace: Trace<'t>, delta_y: usize, delta_x: usize) -> Deduplicated<'t> {
    let mut seen: HashSet<(&Value, &Value)> = HashSet::with_capacity(trace.len());
    let mut kept = Vec::with_capacity(trace.len());
    let mut discarded = Vec::new();

    for &row in trace.rows() {
        if seen.insert((row.get(delta_y), row.get(delta_x))) {
            kept.push(row);
        } else {
            discarded.push(DiscardedEvent::duplicate(trace.case_id(), row));
        }
    }

    if !discarded.is_empty() {
        debug!(
            case_id = trace.case_id(),
            kept = kept.len(),
            discarded = discarded.len(),
            "removed duplicated points"
        );
    }

    Deduplicated {
        trace: Trace::from_sorted(trace.case_id().to_string(), kept),
        discarded,
    }
}

/// Deduplicate a trace and, when `log_discards` is set, hand the removed
/// rows to `sink`
///
/// With `log_discards` unset the duplicates are dropped without a record.
pub fn dedupe_into<'t>(
    trace: Trace<'t>,
    delta_y: usize,
    delta_x: usize,
    columns: &[Column],
    sink: &mut dyn DiscardSink,
    log_discards: bool,
) -> Result<Trace<'t>> {
    let Deduplicated { trace, discarded } = dedupe(trace, delta_y, delta_x);
    if log_discards && !discarded.is_empty() {
        sink.append(columns, &discarded)?;
    }
    Ok(trace)
}
