//! JSON output format for ROC rows
//!
//! `--format json` writes one document with the rows and a small summary.

use crate::roc::RocRow;
use serde::Serialize;
use std::collections::HashSet;

/// Summary of a ROC run
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Distinct cases in the output
    pub cases: usize,
    /// Output rows
    pub rows: usize,
    /// Rows whose ROC is undefined
    pub null_roc: usize,
}

/// Complete JSON document
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub format: String,
    pub case_id_column: String,
    pub delta_x: String,
    pub delta_y: String,
    pub rows: Vec<RocRow>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    pub fn new(case_id_column: &str, delta_x: &str, delta_y: &str) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "procroc-json-v1".to_string(),
            case_id_column: case_id_column.to_string(),
            delta_x: delta_x.to_string(),
            delta_y: delta_y.to_string(),
            rows: Vec::new(),
            summary: JsonSummary {
                cases: 0,
                rows: 0,
                null_roc: 0,
            },
        }
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = RocRow>) {
        self.rows.extend(rows);
        let cases: HashSet<&str> = self.rows.iter().map(|r| r.case_id.as_str()).collect();
        self.summary = JsonSummary {
            cases: cases.len(),
            rows: self.rows.len(),
            null_roc: self.rows.iter().filter(|r| r.roc.is_none()).count(),
        };
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
