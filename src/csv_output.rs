//! CSV output format for ROC rows
//!
//! Columns: case id column name, delta_x name, delta_y name, `ROC`. A null
//! ROC is written as an empty field.

use crate::roc::RocRow;

/// Escape CSV field (handle commas, quotes, newlines)
pub fn escape_field(field: &str) -> String {
    // If field contains comma, quote, or newline, wrap in quotes and escape quotes
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput {
    case_column: String,
    delta_x: String,
    delta_y: String,
    rows: Vec<RocRow>,
}

impl CsvOutput {
    /// Create a new CSV output formatter
    pub fn new(case_column: &str, delta_x: &str, delta_y: &str) -> Self {
        Self {
            case_column: case_column.to_string(),
            delta_x: delta_x.to_string(),
            delta_y: delta_y.to_string(),
            rows: Vec::new(),
        }
    }

    /// Add ROC rows to the output
    pub fn extend(&mut self, rows: impl IntoIterator<Item = RocRow>) {
        self.rows.extend(rows);
    }

    fn header(&self) -> String {
        [
            escape_field(&self.case_column),
            escape_field(&self.delta_x),
            escape_field(&self.delta_y),
            "ROC".to_string(),
        ]
        .join(",")
    }

    fn format_row(row: &RocRow) -> String {
        let roc = row.roc.map(|r| r.to_string()).unwrap_or_default();
        [
            escape_field(&row.case_id),
            escape_field(&row.delta_x.to_string()),
            escape_field(&row.delta_y.to_string()),
            roc,
        ]
        .join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.header());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&Self::format_row(row));
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn row(case_id: &str, x: f64, y: f64, roc: Option<f64>) -> RocRow {
        RocRow {
            case_id: case_id.to_string(),
            delta_x: Value::number(x),
            delta_y: Value::number(y),
            roc,
        }
    }

    #[test]
    fn test_csv_escape_field_simple() {
        assert_eq!(escape_field("hello"), "hello");
    }

    #[test]
    fn test_csv_escape_field_with_comma() {
        assert_eq!(escape_field("hello,world"), "\"hello,world\"");
    }

    #[test]
    fn test_csv_escape_field_with_quote() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_header_uses_column_names() {
        let output = CsvOutput::new("case:concept:name", "elapsed_minutes", "cost");
        assert_eq!(output.header(), "case:concept:name,elapsed_minutes,cost,ROC");
    }

    #[test]
    fn test_csv_null_roc_is_empty() {
        let mut output = CsvOutput::new("case", "x", "y");
        output.extend(vec![row("C1", 0.0, 1.0, None), row("C1", 2.0, 2.0, Some(0.5))]);
        let csv = output.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["case,x,y,ROC", "C1,0,1,", "C1,2,2,0.5"]);
    }
}
