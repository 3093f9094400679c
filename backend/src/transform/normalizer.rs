//! Record normalization: column dedup, row dedup, currency coercion.
//!
//! ```text
//! RawTable (text)                          Table (typed)
//! ┌──────────────┬──────────────┐          ┌──────────────┬─────────┐
//! │ Department   │ YTD Actuals  │          │ Department   │ YTD ... │
//! │ Ops          │ "$3,000.00"  │   →      │ Ops          │ 3000.0  │
//! │ Ops          │ "$3,000.00"  │ (dup)    └──────────────┴─────────┘
//! └──────────────┴──────────────┘
//! ```
//!
//! Duplicates are compared on the raw text, before coercion, so `"$1,000"`
//! and `"1000"` are distinct rows.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::config::ReportConfig;
use crate::error::{NormalizeError, NormalizeResult};
use crate::models::{field_key, FieldValue, RawTable, Record, Table};

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.]").expect("currency pattern is valid"));

/// What normalization removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeStats {
    /// Headers of dropped duplicate columns, left to right.
    pub columns_dropped: Vec<String>,
    /// Number of dropped duplicate rows.
    pub rows_dropped: usize,
}

/// A normalized table together with what was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub table: Table,
    pub stats: NormalizeStats,
}

/// Coerce a currency-like string to a number.
///
/// Everything except digits and `.` is stripped before parsing. A `-`
/// ahead of the first digit, or accounting parentheses, make the result
/// negative. Returns `None` when nothing parseable is left.
///
/// ```ignore
/// assert_eq!(parse_currency("$1,234.50"), Some(1234.5));
/// assert_eq!(parse_currency("-$42"), Some(-42.0));
/// assert_eq!(parse_currency("(1,000)"), Some(-1000.0));
/// assert_eq!(parse_currency("n/a"), None);
/// ```
pub fn parse_currency(text: &str) -> Option<f64> {
    let stripped = NON_NUMERIC.replace_all(text, "");
    if stripped.is_empty() {
        return None;
    }
    let magnitude: f64 = stripped.parse().ok()?;
    if !magnitude.is_finite() {
        return None;
    }

    let trimmed = text.trim();
    let lead_end = trimmed
        .find(|c: char| c.is_ascii_digit() || c == '.')
        .unwrap_or(trimmed.len());
    let negative = trimmed[..lead_end].contains('-')
        || (trimmed.starts_with('(') && trimmed.ends_with(')'));

    Some(if negative { -magnitude } else { magnitude })
}

/// Indices of the first occurrence of every column name.
fn dedup_columns(headers: &[String]) -> (Vec<usize>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut dropped = Vec::new();

    for (i, header) in headers.iter().enumerate() {
        if seen.insert(field_key(header)) {
            kept.push(i);
        } else {
            dropped.push(header.clone());
        }
    }
    (kept, dropped)
}

/// Clean a raw table into a typed [`Table`].
///
/// Fails on a missing required field or on a currency value that cannot
/// be reduced to a number; nothing is defaulted.
pub fn normalize(raw: &RawTable, config: &ReportConfig) -> NormalizeResult<Normalized> {
    let (kept, columns_dropped) = dedup_columns(&raw.headers);
    let fields: Vec<String> = kept.iter().map(|&i| raw.headers[i].clone()).collect();

    let position = |name: &str| {
        let key = field_key(name);
        fields.iter().position(|f| field_key(f) == key)
    };

    for required in config.required_fields() {
        if position(&required).is_none() {
            return Err(NormalizeError::MissingField(required));
        }
    }

    let currency_columns: HashSet<usize> = config
        .currency_fields
        .iter()
        .filter_map(|name| position(name))
        .collect();

    let mut seen_rows: HashSet<Vec<&str>> = HashSet::new();
    let mut records = Vec::new();
    let mut rows_dropped = 0;

    for row in &raw.rows {
        let projected: Vec<&str> = kept
            .iter()
            .map(|&i| row.values.get(i).map(String::as_str).unwrap_or(""))
            .collect();

        if !seen_rows.insert(projected.clone()) {
            rows_dropped += 1;
            continue;
        }

        let mut values = Vec::with_capacity(projected.len());
        for (col, text) in projected.iter().enumerate() {
            if currency_columns.contains(&col) {
                let number = parse_currency(text).ok_or_else(|| NormalizeError::CurrencyParse {
                    field: fields[col].clone(),
                    row: row.line,
                    value: text.to_string(),
                })?;
                values.push(FieldValue::Number(number));
            } else {
                values.push(FieldValue::Text(text.trim().to_string()));
            }
        }
        records.push(Record {
            row: row.line,
            values,
        });
    }

    Ok(Normalized {
        table: Table::new(fields, records),
        stats: NormalizeStats {
            columns_dropped,
            rows_dropped,
        },
    })
}
