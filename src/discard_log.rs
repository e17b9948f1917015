//! Side log of discarded measurement points
//!
//! Duplicated (delta_x, delta_y) points removed from a trace are handed to a
//! [`DiscardSink`]. The file-backed sink appends to `discarded_events.csv`:
//! the prepared row's columns followed by `discard_reason` and
//! `discard_case_id`. The file is never truncated and records are never
//! deduplicated across runs.
//!
//! The file is opened, appended, and closed within each `append` call.
//! Concurrent processes writing the same file must be serialized by the
//! caller.

use crate::csv_output::escape_field;
use crate::error::Result;
use crate::preparation::{Column, PreparedRow};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Reason attached to points removed by the deduplicator
pub const DUPLICATE_REASON: &str = "duplicated delta_x/delta_y pair";

/// A row excluded from its trace
#[derive(Debug, Clone, PartialEq)]
pub struct DiscardedEvent {
    pub case_id: String,
    pub reason: String,
    pub row: PreparedRow,
}

impl DiscardedEvent {
    pub fn duplicate(case_id: &str, row: &PreparedRow) -> Self {
        Self {
            case_id: case_id.to_string(),
            reason: DUPLICATE_REASON.to_string(),
            row: row.clone(),
        }
    }
}

/// Destination for discarded-event records
pub trait DiscardSink {
    /// Append records described by `columns`; order is preserved
    fn append(&mut self, columns: &[Column], records: &[DiscardedEvent]) -> Result<()>;
}

/// Append-only CSV file sink
#[derive(Debug, Clone)]
pub struct CsvDiscardLog {
    path: PathBuf,
}

impl CsvDiscardLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header row: prepared columns plus the two discard annotations
    fn header(columns: &[Column]) -> String {
        let mut fields: Vec<String> = columns.iter().map(|c| escape_field(&c.name)).collect();
        fields.push("discard_reason".to_string());
        fields.push("discard_case_id".to_string());
        fields.join(",")
    }

    fn format_record(record: &DiscardedEvent) -> String {
        let mut fields: Vec<String> = record
            .row
            .cells()
            .iter()
            .map(|v| escape_field(&v.to_string()))
            .collect();
        fields.push(escape_field(&record.reason));
        fields.push(escape_field(&record.case_id));
        fields.join(",")
    }
}

impl DiscardSink for CsvDiscardLog {
    fn append(&mut self, columns: &[Column], records: &[DiscardedEvent]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);

        if needs_header {
            writeln!(writer, "{}", Self::header(columns))?;
        }
        for record in records {
            writeln!(writer, "{}", Self::format_record(record))?;
        }
        writer.flush()?;

        info!(
            path = %self.path.display(),
            records = records.len(),
            "appended discarded events"
        );
        Ok(())
    }
}

/// In-memory sink that keeps every appended record in order
#[derive(Debug, Clone, Default)]
pub struct MemoryDiscardSink {
    records: Vec<DiscardedEvent>,
    appends: usize,
}

impl MemoryDiscardSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[DiscardedEvent] {
        &self.records
    }

    /// Number of non-empty `append` calls received
    pub fn appends(&self) -> usize {
        self.appends
    }
}

impl DiscardSink for MemoryDiscardSink {
    fn append(&mut self, _columns: &[Column], records: &[DiscardedEvent]) -> Result<()> {
        if !records.is_empty() {
            self.appends += 1;
            self.records.extend_from_slice(records);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseFailurePolicy;
    use crate::event_log::EventLog;
    use crate::preparation::{prepare, PreparedTable};
    use std::fs;
    use tempfile::TempDir;

    fn table() -> PreparedTable {
        let log = EventLog::from_csv_str(
            "case,time,note\nC1,2023-05-01 10:00:00,\"a,b\"\nC1,2023-05-01 10:00:00,c\n",
        )
        .unwrap();
        prepare(&log, "case", ParseFailurePolicy::Reject).unwrap()
    }

    #[test]
    fn test_header_written_once_and_records_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("discarded_events.csv");
        let table = table();
        let record = DiscardedEvent::duplicate("C1", &table.rows()[1]);

        let mut sink = CsvDiscardLog::new(&path);
        sink.append(table.columns(), std::slice::from_ref(&record)).unwrap();
        sink.append(table.columns(), std::slice::from_ref(&record)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "case,time,note,elapsed_minutes,day_bucket,day_frequency,discard_reason,discard_case_id"
        );
        assert_eq!(lines[1], lines[2]);
        assert!(lines[1].ends_with(",duplicated delta_x/delta_y pair,C1"));
    }

    #[test]
    fn test_fields_are_escaped() {
        let table = table();
        let record = DiscardedEvent::duplicate("C1", &table.rows()[0]);
        let row = CsvDiscardLog::format_record(&record);
        assert!(row.contains("\"a,b\""));
    }

    #[test]
    fn test_empty_append_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("discarded_events.csv");
        let mut sink = CsvDiscardLog::new(&path);
        sink.append(table().columns(), &[]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let table = table();
        let mut sink = MemoryDiscardSink::new();
        let first = DiscardedEvent::duplicate("C1", &table.rows()[0]);
        let second = DiscardedEvent::duplicate("C2", &table.rows()[1]);
        sink.append(table.columns(), &[first.clone()]).unwrap();
        sink.append(table.columns(), &[]).unwrap();
        sink.append(table.columns(), &[second.clone()]).unwrap();
        assert_eq!(sink.records(), &[first, second]);
        assert_eq!(sink.appends(), 2);
    }
}
