//! Transformation stages.
//!
//! - Normalizer: dedup and currency coercion
//! - Metrics: per-record forecast and the rollup saving
//! - Aggregator: groups, subtotals and grand total
//! - Pipeline: all stages wired to a source and a sink

pub mod aggregator;
pub mod metrics;
pub mod normalizer;
pub mod pipeline;

pub use aggregator::{aggregate, AggregateOptions};
pub use metrics::{
    derive_metrics, derive_rollup_metrics, derive_row_metrics, rollup_forecasted_saving, ForecastWindow,
    RowMetrics,
};
pub use normalizer::{normalize, parse_currency, NormalizeStats, Normalized};
pub use pipeline::*;
