//! Number rendering: whole units with `,` thousands separators.

use super::{Cell, Grid, GridRow};

/// Insert `,` every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Round half to even to 0 decimals and render with thousands separators.
///
/// ```ignore
/// assert_eq!(format_number(1234567.0), "1,234,567");
/// assert_eq!(format_number(-1000.0), "-1,000");
/// ```
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = value.round_ties_even();
    if rounded == 0.0 {
        return "0".to_string();
    }

    let grouped = group_thousands(&format!("{:.0}", rounded.abs()));
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Render every numeric cell; text cells are kept as they are.
///
/// Formatting a grid that is already formatted returns it unchanged.
pub fn format_grid(grid: &Grid) -> Grid {
    Grid {
        header: grid.header.clone(),
        rows: grid
            .rows
            .iter()
            .map(|row| GridRow {
                kind: row.kind,
                cells: row
                    .cells
                    .iter()
                    .map(|cell| match cell {
                        Cell::Number(n) => Cell::Text(format_number(*n)),
                        Cell::Text(s) => Cell::Text(s.clone()),
                    })
                    .collect(),
            })
            .collect(),
    }
}
