//! High-level pipeline: raw records in, styled report out.
//!
//! ```text
//! RecordSource ─▶ normalize ─▶ derive_metrics ─▶ aggregate ─▶ derive_rollup_metrics
//!                                                                   │
//!   ReportSink ◀── render ◀── annotate ◀── format_grid ◀── Grid ◀───┘
//! ```
//!
//! Every stage before the sink is pure. The sink runs last and only once,
//! so a fatal error anywhere leaves no output behind.
//!
//! # Example
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
//! println!("{} groups", stats.groups);
//! ```

use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use super::aggregator::{aggregate, AggregateOptions};
use super::metrics::{derive_metrics, derive_rollup_metrics, ForecastWindow};
use super::normalizer::{normalize, NormalizeStats};
use crate::config::ReportConfig;
use crate::error::PipelineResult;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{AggregateTable, RawTable, RowKind, Table};
use crate::parser::{open_source, RecordSource};
use crate::report::{annotate, format_grid, open_sink, render, Category, Grid, ReportSink, StyledSheet};

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub records_read: usize,
    pub columns_dropped: usize,
    pub rows_dropped: usize,
    pub records_kept: usize,
    pub groups: usize,
    pub subtotals: usize,
    pub positive: usize,
    pub negative: usize,
    /// Rows whose target cell could not be read back as a number.
    pub skipped: usize,
}

/// Everything the pure stages produce.
#[derive(Debug, Clone)]
pub struct Report {
    pub records: Table,
    pub rollup: AggregateTable,
    pub sheet: StyledSheet,
    pub stats: RunStats,
}

/// Normalize and derive the per-record metrics.
pub fn prepare_records(raw: &RawTable, config: &ReportConfig) -> PipelineResult<(Table, NormalizeStats)> {
    let normalized = normalize(raw, config)?;
    let stats = normalized.stats;

    if !stats.columns_dropped.is_empty() {
        log_warning(format!(
            "Dropped {} duplicate column(s): {}",
            stats.columns_dropped.len(),
            stats.columns_dropped.join(", ")
        ));
    }
    if stats.rows_dropped > 0 {
        log_warning(format!("Dropped {} duplicate row(s)", stats.rows_dropped));
    }

    let table = derive_metrics(
        &normalized.table,
        &config.metrics,
        ForecastWindow::from_config(config),
    )?;
    log_success(format!("{} records normalized", table.records.len()));

    Ok((table, stats))
}

/// Run every pure stage on an already read table.
pub fn build_report(raw: &RawTable, config: &ReportConfig) -> PipelineResult<Report> {
    let (records, normalize_stats) = prepare_records(raw, config)?;

    let options = AggregateOptions::from_config(config);
    let summed = aggregate(&records, &config.group_fields, &config.measure_fields(), &options)?;
    let rollup = derive_rollup_metrics(&summed, &config.metrics)?;

    let groups = rollup.rows_of(RowKind::Group).count();
    let subtotals = rollup
        .rows
        .iter()
        .filter(|r| matches!(r.kind, RowKind::Subtotal { .. }))
        .count();
    log_success(format!("{} groups aggregated", groups));
    if subtotals > 0 {
        log_info_indent(format!("{} subtotal rows", subtotals), 1);
    }

    let grid = format_grid(&Grid::from_aggregate(&rollup));
    let target = &config.metrics.forecasted_saving;
    let annotations = annotate(&grid, target);
    let skipped = grid.rows.len() - annotations.len();
    if skipped > 0 {
        log_info(format!("{} row(s) left unstyled in '{}'", skipped, target));
    }

    let sheet = render(&grid, &annotations, &config.style, &config.sheet_name);

    let stats = RunStats {
        records_read: raw.rows.len(),
        columns_dropped: normalize_stats.columns_dropped.len(),
        rows_dropped: normalize_stats.rows_dropped,
        records_kept: records.records.len(),
        groups,
        subtotals,
        positive: annotations.count(Category::Positive),
        negative: annotations.count(Category::Negative),
        skipped,
    };

    Ok(Report {
        records,
        rollup,
        sheet,
        stats,
    })
}

/// Read from `source`, build the report and hand it to `sink`.
pub fn run_report(
    source: &mut dyn RecordSource,
    sink: &mut dyn ReportSink,
    config: &ReportConfig,
) -> PipelineResult<RunStats> {
    let raw = read_source(source)?;
    write_report(&raw, sink, config)
}

fn read_source(source: &mut dyn RecordSource) -> PipelineResult<RawTable> {
    log_info(format!("Reading {}", source.describe()));
    let raw = source.read_table()?;
    log_info_indent(format!("{} columns, {} rows", raw.headers.len(), raw.rows.len()), 1);
    Ok(raw)
}

fn write_report(raw: &RawTable, sink: &mut dyn ReportSink, config: &ReportConfig) -> PipelineResult<RunStats> {
    let report = build_report(raw, config)?;

    log_info(format!("Writing {}", sink.describe()));
    sink.write(&report.sheet)?;
    log_success(format!(
        "{} saving, {} overspend",
        report.stats.positive, report.stats.negative
    ));

    Ok(report.stats)
}

/// File to file, picking source and sink by extension.
///
/// The source is closed before the sink writes.
pub fn generate_report(input: &Path, output: &Path, config: &ReportConfig) -> PipelineResult<RunStats> {
    let mut sink = open_sink(output)?;
    let raw = {
        let mut source = open_source(input)?;
        read_source(source.as_mut())?
    };
    write_report(&raw, sink.as_mut(), config)
}

/// `<stem>_pivot.xlsx` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    input.with_file_name(format!("{}_pivot.xlsx", stem))
}

/// Normalized and derived records as JSON, for debugging inputs.
pub fn inspect_records(input: &Path, config: &ReportConfig) -> PipelineResult<Value> {
    let mut source = open_source(input)?;
    let raw = source.read_table()?;
    let (table, stats) = prepare_records(&raw, config)?;

    Ok(json!({
        "fields": table.fields,
        "records": table.to_json_records(),
        "columnsDropped": stats.columns_dropped,
        "rowsDropped": stats.rows_dropped,
    }))
}
