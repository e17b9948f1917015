//! Raw event log input
//!
//! Reads CSV event logs (RFC 4180 quoting, CRLF or LF line endings) into
//! untyped string records and applies the column-name heuristics used to
//! recognise case-identifier and timestamp columns.

use crate::error::{Result, RocError};
use std::fs;
use std::path::Path;

/// An event log as read from disk: a header plus equally sized records
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    columns: Vec<String>,
    records: Vec<Vec<String>>,
}

impl EventLog {
    /// Build a log from already split columns and records
    ///
    /// Short records are padded with empty cells; long records are rejected.
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Result<Self> {
        let width = columns.len();
        let mut padded = Vec::with_capacity(records.len());
        for (i, mut record) in records.into_iter().enumerate() {
            if record.len() > width {
                return Err(RocError::Csv {
                    line: i + 2,
                    message: format!("expected {} fields, saw {}", width, record.len()),
                });
            }
            record.resize(width, String::new());
            padded.push(record);
        }
        Ok(Self {
            columns,
            records: padded,
        })
    }

    /// Read and parse a CSV file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_csv_str(&text)
    }

    /// Parse CSV text; the first non-blank record is the header
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut rows = split_records(text)?.into_iter();

        let columns = match rows.next() {
            Some(header) => header
                .into_iter()
                .map(|c| c.trim().to_string())
                .collect::<Vec<_>>(),
            None => return Err(RocError::Schema("event log is empty".to_string())),
        };

        Self::new(columns, rows.collect())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the raw cells of one column
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &str> {
        self.records.iter().map(move |r| r[index].as_str())
    }

    /// Column names containing "case" (case-insensitive)
    pub fn case_like_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| is_case_like(c))
            .map(String::as_str)
            .collect()
    }

    /// Column names containing "time" or "timestamp" (case-insensitive)
    pub fn time_like_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| is_time_like(c))
            .map(String::as_str)
            .collect()
    }

    /// The timestamp column used downstream: the first time-like column
    pub fn timestamp_column(&self) -> Option<usize> {
        self.columns.iter().position(|c| is_time_like(c))
    }

    /// Fail unless at least one case-like and one time-like column exist
    pub fn validate_schema(&self) -> Result<()> {
        if self.case_like_columns().is_empty() || self.time_like_columns().is_empty() {
            return Err(RocError::Schema(format!(
                "the log needs a case-like and a time-like column, found [{}]",
                self.columns.join(", ")
            )));
        }
        Ok(())
    }
}

fn is_case_like(name: &str) -> bool {
    name.to_lowercase().contains("case")
}

fn is_time_like(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("time") || lower.contains("timestamp")
}

/// Split CSV text into records, honouring quoted fields
///
/// Blank lines outside quotes are skipped.
fn split_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                field_started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                field_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if field_started || !field.is_empty() || !record.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                field_started = false;
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(RocError::Csv {
            line,
            message: "unterminated quoted field".to_string(),
        });
    }

    if field_started || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "case:concept:name,concept:name,time:timestamp,cost\n\
                       C1,Register,2023-05-01 10:00:00+00:00,10\n\
                       C1,Approve,2023-05-01 11:00:00+00:00,20\n";

    #[test]
    fn test_parse_header_and_records() {
        let log = EventLog::from_csv_str(LOG).unwrap();
        assert_eq!(
            log.columns(),
            ["case:concept:name", "concept:name", "time:timestamp", "cost"]
        );
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[1][1], "Approve");
    }

    #[test]
    fn test_quoted_fields() {
        let text = "case,time,note\nC1,2023-05-01,\"a, \"\"quoted\"\"\nnote\"\n";
        let log = EventLog::from_csv_str(text).unwrap();
        assert_eq!(log.records()[0][2], "a, \"quoted\"\nnote");
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let text = "case,time\r\nC1,2023-05-01\r\n\r\nC2,2023-05-02\r\n";
        let log = EventLog::from_csv_str(text).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[1][0], "C2");
    }

    #[test]
    fn test_trailing_empty_field_kept() {
        let log = EventLog::from_csv_str("case,time,cost\nC1,2023-05-01,\n").unwrap();
        assert_eq!(log.records()[0], vec!["C1", "2023-05-01", ""]);
    }

    #[test]
    fn test_short_records_are_padded() {
        let log = EventLog::from_csv_str("case,time,cost\nC1,2023-05-01\n").unwrap();
        assert_eq!(log.records()[0][2], "");
    }

    #[test]
    fn test_long_record_rejected() {
        let err = EventLog::from_csv_str("case,time\nC1,2023-05-01,extra\n").unwrap_err();
        assert!(matches!(err, RocError::Csv { line: 2, .. }));
    }

    #[test]
    fn test_unterminated_quote_rejected() {
        let err = EventLog::from_csv_str("case,time\n\"C1,2023-05-01\n").unwrap_err();
        assert!(matches!(err, RocError::Csv { .. }));
    }

    #[test]
    fn test_empty_input_is_schema_error() {
        assert!(matches!(
            EventLog::from_csv_str("").unwrap_err(),
            RocError::Schema(_)
        ));
    }

    #[test]
    fn test_column_heuristics() {
        let log = EventLog::from_csv_str(LOG).unwrap();
        assert_eq!(log.case_like_columns(), vec!["case:concept:name"]);
        assert_eq!(log.time_like_columns(), vec!["time:timestamp"]);
        assert_eq!(log.timestamp_column(), Some(2));
        assert!(log.validate_schema().is_ok());
    }

    #[test]
    fn test_first_time_like_column_wins() {
        let log = EventLog::from_csv_str("CaseID,StartTime,Timestamp\nC1,a,b\n").unwrap();
        assert_eq!(log.timestamp_column(), Some(1));
    }

    #[test]
    fn test_missing_time_column_is_schema_error() {
        let log = EventLog::from_csv_str("case,activity\nC1,A\n").unwrap();
        assert!(matches!(log.validate_schema(), Err(RocError::Schema(_))));
    }
}
