//! Event log preparation
//!
//! Turns a raw [`EventLog`] into a [`PreparedTable`]: typed cells, rows
//! sorted by (case id, timestamp), and three derived features per row:
//!
//! - `elapsed_minutes`: minutes since the first event of the row's case
//! - `day_bucket`: the timestamp truncated to its calendar day
//! - `day_frequency`: number of rows (across all cases) in the same day bucket

use crate::config::ParseFailurePolicy;
use crate::error::{Result, RocError};
use crate::event_log::EventLog;
use crate::value::{ColumnKind, Timestamp, Value};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const ELAPSED_MINUTES: &str = "elapsed_minutes";
pub const DAY_BUCKET: &str = "day_bucket";
pub const DAY_FREQUENCY: &str = "day_frequency";

/// Older column names still accepted for the derived features
const DERIVED_ALIASES: &[(&str, &str)] = &[
    ("timestamp_minutes", ELAPSED_MINUTES),
    ("rounded_time", DAY_BUCKET),
    ("frequency", DAY_FREQUENCY),
];

/// Name and storage type of a prepared column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// One event with its typed cells
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    case_id: String,
    timestamp: Timestamp,
    cells: Vec<Value>,
}

impl PreparedRow {
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    pub fn get(&self, column: usize) -> &Value {
        &self.cells[column]
    }
}

/// A prepared event log, sorted by (case id, timestamp)
#[derive(Debug, Clone)]
pub struct PreparedTable {
    columns: Vec<Column>,
    rows: Vec<PreparedRow>,
    case_column: usize,
    timestamp_column: usize,
    dropped_rows: usize,
}

impl PreparedTable {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[PreparedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn case_column(&self) -> &Column {
        &self.columns[self.case_column]
    }

    pub fn timestamp_column(&self) -> &Column {
        &self.columns[self.timestamp_column]
    }

    /// Rows dropped for unparseable or missing timestamps
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Resolve a column name, accepting the legacy names of derived columns
    pub fn resolve_column(&self, name: &str) -> Result<usize> {
        if let Some(index) = self.columns.iter().position(|c| c.name == name) {
            return Ok(index);
        }
        DERIVED_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .and_then(|(_, target)| self.columns.iter().position(|c| c.name == *target))
            .ok_or_else(|| RocError::ColumnNotFound(name.to_string()))
    }

    /// Distinct case ids in first-appearance order
    pub fn case_ids(&self) -> Vec<&str> {
        self.partition_by_case().into_keys().collect()
    }

    /// Whether any row belongs to `case_id`
    pub fn contains_case(&self, case_id: &str) -> bool {
        self.rows.iter().any(|r| r.case_id == case_id)
    }

    /// Row indices grouped by case id, groups in first-appearance order
    pub fn partition_by_case(&self) -> IndexMap<&str, Vec<usize>> {
        let mut groups: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            groups.entry(row.case_id.as_str()).or_default().push(i);
        }
        groups
    }
}

/// Prepare a raw event log for ROC analysis
///
/// Fails with a schema error when the log lacks a case-like or time-like
/// column, or when `case_id_column` is absent. Unparseable timestamps are
/// handled according to `policy`; empty timestamps are always dropped.
pub fn prepare(
    log: &EventLog,
    case_id_column: &str,
    policy: ParseFailurePolicy,
) -> Result<PreparedTable> {
    log.validate_schema()?;

    let case_column = log.column_index(case_id_column).ok_or_else(|| {
        RocError::Schema(format!("case id column '{}' not found", case_id_column))
    })?;
    let timestamp_column = log
        .timestamp_column()
        .ok_or_else(|| RocError::Schema("no time-like column".to_string()))?;

    let mut columns: Vec<Column> = log
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| Column {
            name: name.clone(),
            kind: if i == timestamp_column {
                ColumnKind::Time
            } else if i == case_column {
                ColumnKind::Text
            } else {
                ColumnKind::infer(log.column_cells(i))
            },
        })
        .collect();

    let mut rows = Vec::with_capacity(log.len());
    let mut dropped_rows = 0;
    for (i, record) in log.records().iter().enumerate() {
        let raw_ts = record[timestamp_column].trim();
        if raw_ts.is_empty() {
            dropped_rows += 1;
            continue;
        }

        let timestamp = match Timestamp::parse(raw_ts) {
            Some(ts) => ts,
            None => match policy {
                ParseFailurePolicy::Reject => {
                    return Err(RocError::Parse {
                        row: i + 1,
                        column: columns[timestamp_column].name.clone(),
                        value: raw_ts.to_string(),
                    });
                }
                ParseFailurePolicy::Drop => {
                    dropped_rows += 1;
                    continue;
                }
            },
        };

        let cells: Vec<Value> = record
            .iter()
            .zip(&columns)
            .enumerate()
            .map(|(c, (raw, column))| {
                if c == timestamp_column {
                    Value::Time(timestamp)
                } else {
                    Value::from_cell(raw, column.kind)
                }
            })
            .collect();

        rows.push(PreparedRow {
            case_id: cells[case_column].to_string(),
            timestamp,
            cells,
        });
    }

    if dropped_rows > 0 {
        warn!(dropped_rows, "dropped events without a usable timestamp");
    }

    // Stable: events with equal (case, timestamp) keep log order
    rows.sort_by(|a, b| {
        a.cells[case_column]
            .cmp(&b.cells[case_column])
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });

    let mut case_start: HashMap<Value, Timestamp> = HashMap::new();
    let mut day_counts: HashMap<Timestamp, usize> = HashMap::new();
    for row in &rows {
        case_start
            .entry(row.cells[case_column].clone())
            .or_insert(row.timestamp);
        *day_counts.entry(row.timestamp.floor_day()).or_insert(0) += 1;
    }

    let elapsed_col = derived_column(&mut columns, ELAPSED_MINUTES, ColumnKind::Number);
    let bucket_col = derived_column(&mut columns, DAY_BUCKET, ColumnKind::Time);
    let frequency_col = derived_column(&mut columns, DAY_FREQUENCY, ColumnKind::Number);

    for row in &mut rows {
        let start = case_start[&row.cells[case_column]];
        let bucket = row.timestamp.floor_day();
        let frequency = day_counts[&bucket];

        set_cell(&mut row.cells, elapsed_col, Value::number(row.timestamp.minutes_since(&start)));
        set_cell(&mut row.cells, bucket_col, Value::Time(bucket));
        set_cell(&mut row.cells, frequency_col, Value::number(frequency as f64));
    }

    debug!(
        rows = rows.len(),
        days = day_counts.len(),
        cases = case_start.len(),
        "prepared event log"
    );

    Ok(PreparedTable {
        columns,
        rows,
        case_column,
        timestamp_column,
        dropped_rows,
    })
}

/// Index of a derived column, replacing a same-named input column
fn derived_column(columns: &mut Vec<Column>, name: &str, kind: ColumnKind) -> usize {
    match columns.iter().position(|c| c.name == name) {
        Some(index) => {
            columns[index].kind = kind;
            index
        }
        None => {
            columns.push(Column {
                name: name.to_string(),
                kind,
            });
            columns.len() - 1
        }
    }
}

fn set_cell(cells: &mut Vec<Value>, index: usize, value: Value) {
    if index < cells.len() {
        cells[index] = value;
    } else {
        cells.push(value);
    }
}
