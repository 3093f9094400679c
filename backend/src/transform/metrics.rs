//! Budget forecast formulas.
//!
//! Per record, in this order (each may use the ones before it):
//!
//! ```text
//! Remainder Forecasted              = (YTD Actuals / elapsed) * period
//! Budget Minus Remainder Forecasted = Position Budget - Remainder Forecasted
//! Forecasted Saving/Underspend      = Position Budget - (YTD Actuals + Remainder Forecasted)
//! ```
//!
//! On rollup rows the saving is recomputed from the summed columns as
//! `Position Budget - Remainder Forecasted`, without the YTD term. The two
//! formulas differ on purpose; the report has always shown the rollup
//! figure this way.

use crate::config::{MetricFields, ReportConfig};
use crate::error::{AggregateError, AggregateResult, NormalizeError, NormalizeResult};
use crate::models::{field_key, AggregateRow, AggregateTable, FieldValue, Record, Table};

/// Length of the YTD window and of the full budget period, in months.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastWindow {
    pub elapsed_months: f64,
    pub period_months: f64,
}

impl Default for ForecastWindow {
    fn default() -> Self {
        Self {
            elapsed_months: 6.0,
            period_months: 12.0,
        }
    }
}

impl ForecastWindow {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            elapsed_months: f64::from(config.elapsed_months),
            period_months: f64::from(config.period_months),
        }
    }
}

/// Derived values of one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub remainder_forecasted: f64,
    pub budget_minus_remainder: f64,
    pub forecasted_saving: f64,
}

/// Per-record formulas. Negative results are kept: they mean overspend.
pub fn derive_row_metrics(position_budget: f64, ytd_actuals: f64, window: ForecastWindow) -> RowMetrics {
    let remainder_forecasted = (ytd_actuals / window.elapsed_months) * window.period_months;
    let budget_minus_remainder = position_budget - remainder_forecasted;
    let forecasted_saving = position_budget - (ytd_actuals + remainder_forecasted);

    RowMetrics {
        remainder_forecasted,
        budget_minus_remainder,
        forecasted_saving,
    }
}

/// Rollup saving, computed on summed columns.
pub fn rollup_forecasted_saving(position_budget: f64, remainder_forecasted: f64) -> f64 {
    position_budget - remainder_forecasted
}

/// Position of column `name`, appending it when absent.
fn column_or_append(fields: &mut Vec<String>, name: &str) -> usize {
    let key = field_key(name);
    match fields.iter().position(|f| field_key(f) == key) {
        Some(i) => i,
        None => {
            fields.push(name.to_string());
            fields.len() - 1
        }
    }
}

fn number_at(record: &Record, index: usize, field: &str) -> NormalizeResult<f64> {
    match &record.values[index] {
        FieldValue::Number(n) => Ok(*n),
        FieldValue::Text(text) => Err(NormalizeError::CurrencyParse {
            field: field.to_string(),
            row: record.row,
            value: text.clone(),
        }),
    }
}

/// Add the three derived columns to every record.
///
/// Columns already present under a derived name are overwritten.
pub fn derive_metrics(table: &Table, metrics: &MetricFields, window: ForecastWindow) -> NormalizeResult<Table> {
    let budget_idx = table
        .column_index(&metrics.position_budget)
        .ok_or_else(|| NormalizeError::MissingField(metrics.position_budget.clone()))?;
    let ytd_idx = table
        .column_index(&metrics.ytd_actuals)
        .ok_or_else(|| NormalizeError::MissingField(metrics.ytd_actuals.clone()))?;

    let mut fields = table.fields.clone();
    let remainder_idx = column_or_append(&mut fields, &metrics.remainder_forecasted);
    let minus_idx = column_or_append(&mut fields, &metrics.budget_minus_remainder);
    let saving_idx = column_or_append(&mut fields, &metrics.forecasted_saving);

    let mut records = Vec::with_capacity(table.records.len());
    for record in &table.records {
        let budget = number_at(record, budget_idx, &metrics.position_budget)?;
        let ytd = number_at(record, ytd_idx, &metrics.ytd_actuals)?;
        let derived = derive_row_metrics(budget, ytd, window);

        let mut values = record.values.clone();
        values.resize(fields.len(), FieldValue::Number(0.0));
        values[remainder_idx] = FieldValue::Number(derived.remainder_forecasted);
        values[minus_idx] = FieldValue::Number(derived.budget_minus_remainder);
        values[saving_idx] = FieldValue::Number(derived.forecasted_saving);

        records.push(Record {
            row: record.row,
            values,
        });
    }

    Ok(Table::new(fields, records))
}

/// Recompute the saving on one rollup row.
pub fn derive_rollup_row(row: &AggregateRow, budget_idx: usize, remainder_idx: usize) -> AggregateRow {
    let mut measures = row.measures.clone();
    measures.push(rollup_forecasted_saving(
        row.measures[budget_idx],
        row.measures[remainder_idx],
    ));
    AggregateRow {
        kind: row.kind,
        key: row.key.clone(),
        measures,
    }
}

/// Append the rollup saving column to every aggregate row.
pub fn derive_rollup_metrics(table: &AggregateTable, metrics: &MetricFields) -> AggregateResult<AggregateTable> {
    let budget_idx = table
        .measure_index(&metrics.position_budget)
        .ok_or_else(|| AggregateError::MissingField(metrics.position_budget.clone()))?;
    let remainder_idx = table
        .measure_index(&metrics.remainder_forecasted)
        .ok_or_else(|| AggregateError::MissingField(metrics.remainder_forecasted.clone()))?;

    let mut measure_fields = table.measure_fields.clone();
    measure_fields.push(metrics.forecasted_saving.clone());

    Ok(AggregateTable {
        group_fields: table.group_fields.clone(),
        measure_fields,
        rows: table
            .rows
            .iter()
            .map(|row| derive_rollup_row(row, budget_idx, remainder_idx))
            .collect(),
    })
}
