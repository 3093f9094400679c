//! Report building: grid, formatting, annotation, rendering, sinks.
//!
//! ```text
//! AggregateTable ─▶ Grid (numbers) ─▶ format ─▶ Grid (text) ─▶ annotate ─▶ Annotations
//!                                                    │                         │
//!                                                    └────────▶ render ◀───────┘
//!                                                                 │
//!                                                           StyledSheet ─▶ ReportSink
//! ```
//!
//! The annotator only sees the formatted text, so a value that rounds to
//! zero is classified by its rounded form.

pub mod annotate;
pub mod format;
pub mod render;
pub mod sink;

use serde::{Deserialize, Serialize};

use crate::models::{field_key, AggregateTable, RowKind};

pub use annotate::{annotate, parse_display_number, Annotations, Category};
pub use format::{format_grid, format_number};
pub use render::{render, StyledCell, StyledRow, StyledSheet};
pub use sink::{open_sink, CsvSink, JsonSink, ReportSink, XlsxSink};

/// A grid cell: a raw number before formatting, display text after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Number(_) => None,
        }
    }

    /// Plain text form, unformatted numbers included.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// One grid row and the kind of rollup row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

/// Header plus rows of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub header: Vec<String>,
    pub rows: Vec<GridRow>,
}

impl Grid {
    /// Key labels as text, measures as raw numbers.
    pub fn from_aggregate(table: &AggregateTable) -> Self {
        let header = table
            .group_fields
            .iter()
            .chain(&table.measure_fields)
            .cloned()
            .collect();

        let rows = table
            .rows
            .iter()
            .map(|row| GridRow {
                kind: row.kind,
                cells: row
                    .key
                    .iter()
                    .map(|label| Cell::Text(label.clone()))
                    .chain(row.measures.iter().map(|&n| Cell::Number(n)))
                    .collect(),
            })
            .collect();

        Self { header, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        let key = field_key(name);
        self.header.iter().position(|h| field_key(h) == key)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(column))
    }
}
