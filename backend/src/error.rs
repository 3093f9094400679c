//! Error types for the budget pivot pipeline.
//!
//! One error enum per layer:
//!
//! - [`SourceError`] - Reading the record source (CSV / spreadsheet)
//! - [`ConfigError`] - Loading and checking the report configuration
//! - [`NormalizeError`] - Input shape and currency coercion
//! - [`AggregateError`] - Grouping and rollup
//! - [`SinkError`] - Writing the report artifact
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Record Source Errors
// =============================================================================

/// Errors while reading the record source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed row in the input.
    #[error("Malformed input at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Spreadsheet could not be opened or read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Workbook without any worksheet.
    #[error("Workbook has no worksheet")]
    NoWorksheet,

    /// Empty file.
    #[error("Input file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in input")]
    NoHeaders,

    /// Extension not handled by any source.
    #[error("Unsupported input format: '{0}'")]
    UnsupportedFormat(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading the report configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("Config IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Config JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Schema validation failed.
    #[error("Config does not match schema: {}", errors.join("; "))]
    SchemaError { errors: Vec<String> },

    /// Semantically invalid value.
    #[error("Invalid config value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// =============================================================================
// Normalization Errors
// =============================================================================

/// Fatal input errors found while normalizing the raw table.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    /// A required field is absent from the record source.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A currency-like value could not be reduced to a number.
    #[error("Cannot parse '{value}' as a number in field '{field}' (row {row})")]
    CurrencyParse {
        field: String,
        row: usize,
        value: String,
    },
}

// =============================================================================
// Aggregation Errors
// =============================================================================

/// Errors during grouping and rollup.
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    /// A group or measure field is not part of the table.
    #[error("Unknown field: {0}")]
    MissingField(String),

    /// A real key value equals the reserved total label.
    #[error("Value '{label}' in field '{field}' collides with the reserved total label")]
    ReservedLabel { field: String, label: String },

    /// A measure cell holds text instead of a number.
    #[error("Field '{field}' is not numeric (row {row})")]
    NotNumeric { field: String, row: usize },
}

// =============================================================================
// Report Sink Errors
// =============================================================================

/// Errors while writing the report.
#[derive(Debug, Error)]
pub enum SinkError {
    /// IO error.
    #[error("Report IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Workbook writer error.
    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// CSV writer error.
    #[error("CSV writer error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("Report JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Extension not handled by any sink.
    #[error("Unsupported output format: '{0}'")]
    UnsupportedFormat(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run_report`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Record source error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Normalization error.
    #[error("Input error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Aggregation error.
    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    /// Report sink error.
    #[error("Report error: {0}")]
    Sink(#[from] SinkError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for record source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for normalization.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for aggregation.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Result type for report sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
