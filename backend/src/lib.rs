//! # budget-pivot - Position budget forecast pivot
//!
//! Reads a position budget export (CSV or spreadsheet), forecasts the rest of
//! the budget period from year-to-date actuals, rolls the records up by
//! department and job title, and writes a styled report where each group's
//! forecasted saving is coloured green (saving) or red (overspend).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │ CSV / XLSX  │──▶│  Normalize  │──▶│   Metrics   │──▶│  Aggregate  │──▶│   Report    │
//! │  (source)   │   │ (dedup, $)  │   │ (forecast)  │   │ (+ totals)  │   │ (xlsx/csv)  │
//! └─────────────┘   └─────────────┘   └─────────────┘   └─────────────┘   └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use budget_pivot::{generate_report, ReportConfig};
//! use std::path::Path;
//!
//! let stats = generate_report(
//!     Path::new("budget.csv"),
//!     Path::new("budget_pivot.xlsx"),
//!     &ReportConfig::default(),
//! )?;
//! println!("{} groups, {} overspending", stats.groups, stats.negative);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Opt-in stderr diagnostics
//! - [`models`] - Raw, normalized and aggregate tables
//! - [`config`] - Report configuration
//! - [`validation`] - JSON Schema validation of configuration
//! - [`parser`] - Record sources (CSV with auto-detection, spreadsheets)
//! - [`transform`] - Normalize, derive, aggregate, pipeline
//! - [`report`] - Format, annotate, render and write

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Configuration
pub mod config;
pub mod validation;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod report;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AggregateError, ConfigError, NormalizeError, PipelineError, PipelineResult, SinkError, SourceError,
};

// =============================================================================
// Re-exports - Models & configuration
// =============================================================================

pub use config::{FillStyle, GroupOrder, MetricFields, ReportConfig};
pub use models::{AggregateRow, AggregateTable, FieldValue, RawTable, Record, RowKind, Table};

// =============================================================================
// Re-exports - Sources
// =============================================================================

pub use parser::{open_source, CsvSource, RecordSource, XlsxSource};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_report, default_output_path, generate_report, inspect_records, prepare_records, run_report, Report,
    RunStats,
};
pub use transform::{aggregate, derive_metrics, derive_rollup_metrics, normalize, AggregateOptions};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{
    annotate, format_grid, format_number, open_sink, render, Annotations, Category, Cell, Grid, ReportSink,
    StyledSheet,
};
