//! Error taxonomy for the ROC pipeline
//!
//! Schema and parse failures abort a whole invocation. Degenerate
//! denominators and duplicated measurement points are not errors: they show
//! up as null ROC values and discarded-event records respectively.

use thiserror::Error;

/// Errors raised while reading, preparing, or analysing an event log
#[derive(Error, Debug)]
pub enum RocError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column '{0}' does not hold numeric values")]
    NonNumericColumn(String),

    #[error("Failed to parse timestamp {value:?} in column '{column}' (row {row})")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Invalid case selection: {0}")]
    InvalidSelection(String),

    #[error("Malformed CSV at line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("Invalid period {0:?}: expected START,END timestamps with START <= END")]
    Period(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the ROC pipeline
pub type Result<T> = std::result::Result<T, RocError>;
