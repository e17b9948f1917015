//! Per-case traces
//!
//! A trace borrows the prepared rows of one case, ordered ascending by the
//! chosen independent variable (delta_x). The sort is stable, so rows with
//! equal delta_x keep their (case, timestamp) order.

use crate::preparation::{PreparedRow, PreparedTable};
use crate::value::Value;

/// Ordered rows of a single case
#[derive(Debug, Clone, PartialEq)]
pub struct Trace<'t> {
    case_id: String,
    rows: Vec<&'t PreparedRow>,
}

impl<'t> Trace<'t> {
    /// Build a trace from rows of one case, sorting by the delta_x column
    pub fn new(case_id: impl Into<String>, mut rows: Vec<&'t PreparedRow>, delta_x: usize) -> Self {
        rows.sort_by(|a, b| a.get(delta_x).cmp(b.get(delta_x)));
        Self {
            case_id: case_id.into(),
            rows,
        }
    }

    /// Collect the trace of `case_id` from a prepared table
    ///
    /// An absent case yields an empty trace.
    pub fn from_table(table: &'t PreparedTable, case_id: &str, delta_x: usize) -> Self {
        let rows = table
            .rows()
            .iter()
            .filter(|r| r.case_id() == case_id)
            .collect();
        Self::new(case_id, rows, delta_x)
    }

    /// Wrap rows that are already ordered
    pub(crate) fn from_sorted(case_id: String, rows: Vec<&'t PreparedRow>) -> Self {
        Self { case_id, rows }
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn rows(&self) -> &[&'t PreparedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in trace order
    pub fn values(&self, column: usize) -> impl Iterator<Item = &'t Value> + '_ {
        self.rows.iter().map(move |r| {
            let row: &'t PreparedRow = *r;
            row.get(column)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseFailurePolicy;
    use crate::event_log::EventLog;
    use crate::preparation::prepare;
    use crate::value::Value;

    #[test]
    fn test_trace_sorted_by_delta_x_stably() {
        let log = EventLog::from_csv_str(
            "case,time,x\n\
             C1,2023-05-01 10:00:00,3\n\
             C1,2023-05-01 11:00:00,1\n\
             C1,2023-05-01 12:00:00,3\n\
             C2,2023-05-01 12:00:00,0\n",
        )
        .unwrap();
        let table = prepare(&log, "case", ParseFailurePolicy::Reject).unwrap();
        let x = table.resolve_column("x").unwrap();
        let time = table.resolve_column("time").unwrap();

        let trace = Trace::from_table(&table, "C1", x);
        assert_eq!(trace.len(), 3);
        let xs: Vec<&Value> = trace.values(x).collect();
        assert_eq!(xs, vec![&Value::number(1.0), &Value::number(3.0), &Value::number(3.0)]);

        let times: Vec<String> = trace.values(time).map(|v| v.to_string()).collect();
        assert_eq!(times[1], "2023-05-01 10:00:00");
        assert_eq!(times[2], "2023-05-01 12:00:00");
    }

    #[test]
    fn test_absent_case_is_empty() {
        let log = EventLog::from_csv_str("case,time\nC1,2023-05-01\n").unwrap();
        let table = prepare(&log, "case", ParseFailurePolicy::Reject).unwrap();
        let trace = Trace::from_table(&table, "C9", 1);
        assert!(trace.is_empty());
        assert_eq!(trace.case_id(), "C9");
    }
}
