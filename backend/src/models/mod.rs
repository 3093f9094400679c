//! Domain models for the budget pivot pipeline.
//!
//! This module contains the tabular structures passed between stages:
//!
//! - [`RawTable`] - Header + text rows, straight from the record source
//! - [`Table`] - Normalized records with typed [`FieldValue`]s
//! - [`AggregateTable`] - Grouped rollup made of [`AggregateRow`]s
//!
//! Every stage takes one of these by reference and builds a new one;
//! nothing is mutated in place once handed to the next stage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SourceError, SourceResult};

/// Comparison key for field names: trimmed, inner whitespace collapsed, lowercased.
///
/// Two headers with the same key are the same column.
pub fn field_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// =============================================================================
// Raw Table
// =============================================================================

/// One row as read from the source, with its 1-based position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub values: Vec<String>,
}

/// Untyped table produced by a record source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Append a row, padding short rows to the header width.
    ///
    /// Trailing empty cells past the header are dropped. A non-empty cell
    /// there means the row does not line up with the header (an unquoted
    /// `$5,000` in a comma-separated file) and is rejected.
    pub fn push_row(&mut self, line: usize, mut values: Vec<String>) -> SourceResult<()> {
        let width = self.headers.len();
        if values.iter().skip(width).any(|v| !v.trim().is_empty()) {
            let found = values.iter().rposition(|v| !v.trim().is_empty()).map_or(0, |i| i + 1);
            return Err(SourceError::ParseError {
                line,
                message: format!("expected {} fields, found {}", width, found),
            });
        }
        values.resize(width, String::new());
        self.rows.push(RawRow { line, values });
        Ok(())
    }
}

// =============================================================================
// Normalized Table
// =============================================================================

/// A typed cell of a normalized record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Text used when the value acts as a group key.
    pub fn as_key(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
        }
    }
}

/// One normalized input row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Source row number, kept for error reporting.
    pub row: usize,
    pub values: Vec<FieldValue>,
}

/// Ordered field names plus records sharing that field set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub fields: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(fields: Vec<String>, records: Vec<Record>) -> Self {
        Self { fields, records }
    }

    /// Position of a field, compared with [`field_key`].
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let key = field_key(name);
        self.fields.iter().position(|f| field_key(f) == key)
    }

    /// Records as JSON objects keyed by field name.
    pub fn to_json_records(&self) -> Vec<Value> {
        self.records
            .iter()
            .map(|record| {
                let mut obj = Map::new();
                for (field, value) in self.fields.iter().zip(&record.values) {
                    let json = match value {
                        FieldValue::Text(s) => Value::String(s.clone()),
                        FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                            .map(Value::Number)
                            .unwrap_or(Value::Null),
                    };
                    obj.insert(field.clone(), json);
                }
                Value::Object(obj)
            })
            .collect()
    }
}

// =============================================================================
// Aggregate Table
// =============================================================================

/// What an aggregate row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RowKind {
    /// A full group key.
    Group,
    /// A rollup over every group sharing the first `depth` key values.
    Subtotal { depth: usize },
    /// The rollup over all records.
    GrandTotal,
}

/// One row of the rollup.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub kind: RowKind,
    /// Display labels, one per group field.
    pub key: Vec<String>,
    /// Values aligned with [`AggregateTable::measure_fields`].
    pub measures: Vec<f64>,
}

/// Grouped rollup: key columns followed by measure columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    pub group_fields: Vec<String>,
    pub measure_fields: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn measure_index(&self, name: &str) -> Option<usize> {
        let key = field_key(name);
        self.measure_fields.iter().position(|f| field_key(f) == key)
    }

    /// Rows of a given kind, in emission order.
    pub fn rows_of(&self, kind: RowKind) -> impl Iterator<Item = &AggregateRow> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }

    pub fn grand_total(&self) -> Option<&AggregateRow> {
        self.rows.iter().find(|r| r.kind == RowKind::GrandTotal)
    }
}
