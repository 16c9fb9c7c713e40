use thiserror::Error;

/// Structural shape violations raised by the schema normalizer.
///
/// These indicate a bug in adapter or caller code, not a transient upstream
/// failure, and are never swallowed by the ingestion orchestrator on the
/// caller's side of an adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required columns: {columns:?}")]
    MissingColumns { columns: Vec<String> },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("unparsable timestamp value '{value}'")]
    UnparsableTimestamp { value: String },

    #[error("invalid value '{value}' in column '{column}'")]
    InvalidValue { column: &'static str, value: String },
}

/// Post-normalization invariant failures raised by the validator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing timestamps")]
    MissingTimestamps,

    #[error("duplicate timestamps")]
    DuplicateTimestamps,

    #[error("timestamps not ascending")]
    NotSorted,

    #[error("negative value in column {column}")]
    NegativeValue { column: &'static str },
}

/// Ticker symbol contract violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol cannot be empty")]
    Empty,
    #[error("symbol length {len} exceeds max {max}")]
    TooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    InvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    InvalidChar { ch: char, index: usize },
}

/// Unrecognized provider identifier in configuration or a priority list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid provider '{value}', expected one of yahoo, alpha_vantage")]
pub struct InvalidProvider {
    pub value: String,
}
