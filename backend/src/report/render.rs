//! Merge a formatted grid with its annotations into a styled sheet.

use serde::Serialize;

use super::{Annotations, Category, Grid};
use crate::config::FillStyle;
use crate::models::RowKind;

/// One output cell with an optional `#RRGGBB` background.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledCell {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledRow {
    pub kind: RowKind,
    pub category: Category,
    pub cells: Vec<StyledCell>,
}

/// What a sink writes: a named sheet with header and styled rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledSheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<StyledRow>,
}

impl StyledSheet {
    pub fn filled_cells(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .filter(|c| c.fill.is_some())
            .count()
    }
}

fn fill_for(category: Category, style: &FillStyle) -> Option<String> {
    match category {
        Category::Positive => Some(style.positive_fill.clone()),
        Category::Negative => Some(style.negative_fill.clone()),
        Category::Unset => None,
    }
}

/// Colour the target cell of every annotated row.
pub fn render(grid: &Grid, annotations: &Annotations, style: &FillStyle, sheet_name: &str) -> StyledSheet {
    let target = grid.column_index(annotations.target_column());

    let rows = grid
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let category = annotations.category(i);
            let cells = row
                .cells
                .iter()
                .enumerate()
                .map(|(col, cell)| StyledCell {
                    value: cell.display(),
                    fill: if Some(col) == target {
                        fill_for(category, style)
                    } else {
                        None
                    },
                })
                .collect();

            StyledRow {
                kind: row.kind,
                category,
                cells,
            }
        })
        .collect();

    StyledSheet {
        name: sheet_name.to_string(),
        header: grid.header.clone(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_NEGATIVE_FILL, DEFAULT_POSITIVE_FILL};
    use crate::report::{annotate, Cell, GridRow};

    fn grid() -> Grid {
        let row = |kind, label: &str, saving: &str| GridRow {
            kind,
            cells: vec![
                Cell::Text(label.into()),
                Cell::Text("10,000".into()),
                Cell::Text(saving.into()),
            ],
        };
        Grid {
            header: vec![
                "Department".into(),
                "Position Budget".into(),
                "Forecasted Saving/Underspend".into(),
            ],
            rows: vec![
                row(RowKind::Group, "Ops", "1,000"),
                row(RowKind::Group, "HR", "-1,000"),
                row(RowKind::GrandTotal, "Subtotal", ""),
            ],
        }
    }

    #[test]
    fn test_fills_only_target_column() {
        let g = grid();
        let annotations = annotate(&g, "Forecasted Saving/Underspend");
        let sheet = render(&g, &annotations, &FillStyle::default(), "UpdatedPivotTable");

        assert_eq!(sheet.name, "UpdatedPivotTable");
        assert_eq!(sheet.header, g.header);
        assert_eq!(sheet.rows[0].cells[2].fill.as_deref(), Some(DEFAULT_POSITIVE_FILL));
        assert_eq!(sheet.rows[1].cells[2].fill.as_deref(), Some(DEFAULT_NEGATIVE_FILL));
        assert_eq!(sheet.rows[2].cells[2].fill, None);
        assert_eq!(sheet.rows[0].cells[1].fill, None);
        assert_eq!(sheet.filled_cells(), 2);
    }

    #[test]
    fn test_categories_carried_per_row() {
        let g = grid();
        let sheet = render(&g, &annotate(&g, "Forecasted Saving/Underspend"), &FillStyle::default(), "S");
        let categories: Vec<Category> = sheet.rows.iter().map(|r| r.category).collect();
        assert_eq!(categories, vec![Category::Positive, Category::Negative, Category::Unset]);
    }

    #[test]
    fn test_custom_fill_colors() {
        let style = FillStyle {
            positive_fill: "#00FF00".into(),
            negative_fill: "#FF0000".into(),
        };
        let g = grid();
        let sheet = render(&g, &annotate(&g, "Forecasted Saving/Underspend"), &style, "S");
        assert_eq!(sheet.rows[1].cells[2].fill.as_deref(), Some("#FF0000"));
    }

    #[test]
    fn test_grid_values_unchanged() {
        let g = grid();
        let sheet = render(&g, &annotate(&g, "Forecasted Saving/Underspend"), &FillStyle::default(), "S");
        let values: Vec<&str> = sheet.rows[1].cells.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["HR", "10,000", "-1,000"]);
    }
}
