//! Classify rows as saving or overspend from a formatted column.
//!
//! The annotator reads display text, strips the thousands separators and
//! parses it back. It never sees the unrounded value: what it judges is
//! exactly what the reader of the report sees. Cells it cannot parse
//! (labels, blanks, unformatted numbers) are skipped without error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Grid;

/// Visual category of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Zero or more: saving.
    Positive,
    /// Below zero: overspend.
    Negative,
    /// Not annotated.
    Unset,
}

/// Row index → category, for one target column.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotations {
    target_column: String,
    categories: BTreeMap<usize, Category>,
}

impl Annotations {
    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Category of a data row; rows without annotation are [`Category::Unset`].
    pub fn category(&self, row: usize) -> Category {
        self.categories.get(&row).copied().unwrap_or(Category::Unset)
    }

    /// Number of annotated rows.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn count(&self, category: Category) -> usize {
        self.categories.values().filter(|&&c| c == category).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Category)> + '_ {
        self.categories.iter().map(|(&row, &c)| (row, c))
    }
}

/// Parse display text such as `"-1,000"` back to a number.
pub fn parse_display_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Annotate each data row by the formatted value in `target_column`.
///
/// A missing column yields no annotations.
pub fn annotate(grid: &Grid, target_column: &str) -> Annotations {
    let mut categories = BTreeMap::new();

    if let Some(col) = grid.column_index(target_column) {
        for (i, row) in grid.rows.iter().enumerate() {
            let value = row
                .cells
                .get(col)
                .and_then(|cell| cell.as_text())
                .and_then(parse_display_number);

            if let Some(v) = value {
                let category = if v < 0.0 {
                    Category::Negative
                } else {
                    Category::Positive
                };
                categories.insert(i, category);
            }
        }
    }

    Annotations {
        target_column: target_column.to_string(),
        categories,
    }
}
