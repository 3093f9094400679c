//! Group normalized records into a rollup with subtotal and grand total rows.
//!
//! # Architecture
//!
//! ```text
//! Records                               Aggregate rows
//! ┌───────────────────────────┐        ┌────────────────────────────────┐
//! │ Ops, Clerk,   5000        │        │ Ops,      Clerk,     10000     │
//! │ Ops, Clerk,   5000        │   →    │ Ops,      Manager,    8000     │
//! │ Ops, Manager, 8000        │        │ Ops,      Subtotal,  18000  (*)│
//! │ HR,  Clerk,   4000        │        │ HR,       Clerk,      4000     │
//! └───────────────────────────┘        │ HR,       Subtotal,   4000  (*)│
//!                                      │ Subtotal, "",        22000     │
//!                                      └────────────────────────────────┘
//!                                      (*) only with `subtotals` enabled
//! ```
//!
//! Every rollup row is accumulated straight from the records it covers,
//! never by adding up other rollup rows.

use indexmap::IndexMap;

use crate::config::{GroupOrder, ReportConfig};
use crate::error::{AggregateError, AggregateResult};
use crate::models::{AggregateRow, AggregateTable, RowKind, Table};

/// How groups are ordered and which rollup rows are added.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    pub order: GroupOrder,
    pub subtotals: bool,
    /// Label of subtotal and grand total rows; must not occur in the data.
    pub total_label: String,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            order: GroupOrder::FirstSeen,
            subtotals: false,
            total_label: "Subtotal".to_string(),
        }
    }
}

impl AggregateOptions {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            order: config.order,
            subtotals: config.subtotals,
            total_label: config.total_label.clone(),
        }
    }
}

fn add_into(sums: &mut [f64], values: &[f64]) {
    for (sum, v) in sums.iter_mut().zip(values) {
        *sum += v;
    }
}

/// Key padded to full width: `prefix`, then the label, then empty cells.
fn rollup_key(prefix: &[String], label: &str, width: usize) -> Vec<String> {
    let mut key = prefix.to_vec();
    key.push(label.to_string());
    key.resize(width, String::new());
    key
}

/// Sum `measure_fields` per distinct `group_fields` key.
///
/// Rows come out as: groups (with subtotals interleaved when enabled),
/// then one grand total.
pub fn aggregate(
    table: &Table,
    group_fields: &[String],
    measure_fields: &[String],
    options: &AggregateOptions,
) -> AggregateResult<AggregateTable> {
    let resolve = |name: &String| {
        table
            .column_index(name)
            .ok_or_else(|| AggregateError::MissingField(name.clone()))
    };
    let group_idx = group_fields.iter().map(resolve).collect::<AggregateResult<Vec<_>>>()?;
    let measure_idx = measure_fields.iter().map(resolve).collect::<AggregateResult<Vec<_>>>()?;

    let width = group_fields.len();
    let zero = vec![0.0; measure_fields.len()];

    let mut groups: IndexMap<Vec<String>, Vec<f64>> = IndexMap::new();
    let mut prefixes: IndexMap<Vec<String>, Vec<f64>> = IndexMap::new();
    let mut grand_total = zero.clone();

    for record in &table.records {
        let mut key = Vec::with_capacity(width);
        for (field, &i) in group_fields.iter().zip(&group_idx) {
            let value = record.values[i].as_key();
            if value == options.total_label {
                return Err(AggregateError::ReservedLabel {
                    field: field.clone(),
                    label: value,
                });
            }
            key.push(value);
        }

        let mut values = Vec::with_capacity(measure_idx.len());
        for (field, &i) in measure_fields.iter().zip(&measure_idx) {
            let n = record.values[i]
                .as_number()
                .ok_or_else(|| AggregateError::NotNumeric {
                    field: field.clone(),
                    row: record.row,
                })?;
            values.push(n);
        }

        if options.subtotals {
            for depth in 1..width {
                let sums = prefixes
                    .entry(key[..depth].to_vec())
                    .or_insert_with(|| zero.clone());
                add_into(sums, &values);
            }
        }
        add_into(&mut grand_total, &values);
        add_into(groups.entry(key).or_insert_with(|| zero.clone()), &values);
    }

    let mut keys: Vec<&Vec<String>> = groups.keys().collect();
    match options.order {
        GroupOrder::Sorted => keys.sort(),
        // Keep each prefix contiguous: order by first appearance at every level.
        GroupOrder::FirstSeen if options.subtotals => keys.sort_by_cached_key(|key| {
            (1..width)
                .map(|depth| prefixes.get_index_of(&key[..depth]).unwrap_or(usize::MAX))
                .collect::<Vec<_>>()
        }),
        GroupOrder::FirstSeen => {}
    }

    let mut rows = Vec::with_capacity(keys.len() + prefixes.len() + 1);
    for (pos, key) in keys.iter().enumerate() {
        rows.push(AggregateRow {
            kind: RowKind::Group,
            key: (*key).clone(),
            measures: groups[*key].clone(),
        });

        if options.subtotals {
            let next = keys.get(pos + 1);
            // Deepest prefix closes first.
            for depth in (1..width).rev() {
                let prefix = &key[..depth];
                let closes = next.map_or(true, |n| &n[..depth] != prefix);
                if closes {
                    rows.push(AggregateRow {
                        kind: RowKind::Subtotal { depth },
                        key: rollup_key(prefix, &options.total_label, width),
                        measures: prefixes.get(prefix).cloned().unwrap_or_else(|| zero.clone()),
                    });
                }
            }
        }
    }

    rows.push(AggregateRow {
        kind: RowKind::GrandTotal,
        key: rollup_key(&[], &options.total_label, width),
        measures: grand_total,
    });

    Ok(AggregateTable {
        group_fields: group_fields.to_vec(),
        measure_fields: measure_fields.to_vec(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, Record};
    use pretty_assertions::assert_eq;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// (Department, Job Title, Position Budget, YTD Actuals)
    fn table(rows: &[(&str, &str, f64, f64)]) -> Table {
        Table::new(
            fields(&["Department", "Job Title", "Position Budget", "YTD Actuals"]),
            rows.iter()
                .enumerate()
                .map(|(i, (dept, title, budget, ytd))| Record {
                    row: i + 2,
                    values: vec![
                        FieldValue::Text(dept.to_string()),
                        FieldValue::Text(title.to_string()),
                        FieldValue::Number(*budget),
                        FieldValue::Number(*ytd),
                    ],
                })
                .collect(),
        )
    }

    fn run(t: &Table, options: &AggregateOptions) -> AggregateTable {
        aggregate(
            t,
            &fields(&["Department", "Job Title"]),
            &fields(&["Position Budget", "YTD Actuals"]),
            options,
        )
        .unwrap()
    }

    fn keys(result: &AggregateTable) -> Vec<Vec<String>> {
        result.rows.iter().map(|r| r.key.clone()).collect()
    }

    const ROWS: [(&str, &str, f64, f64); 5] = [
        ("Ops", "Clerk", 5000.0, 3000.0),
        ("HR", "Clerk", 4000.0, 1000.0),
        ("Ops", "Manager", 8000.0, 2000.0),
        ("Ops", "Clerk", 5000.0, 2400.0),
        ("HR", "Analyst", 7000.0, 3500.0),
    ];

    #[test]
    fn test_group_sums_match_their_records() {
        let t = table(&ROWS);
        let result = run(&t, &AggregateOptions::default());

        for row in result.rows_of(RowKind::Group) {
            let expected: f64 = ROWS
                .iter()
                .filter(|(d, j, _, _)| *d == row.key[0] && *j == row.key[1])
                .map(|(_, _, budget, _)| budget)
                .sum();
            assert_eq!(row.measures[0], expected);
        }
    }

    #[test]
    fn test_first_seen_order_and_grand_total() {
        let result = run(&table(&ROWS), &AggregateOptions::default());

        assert_eq!(
            keys(&result),
            vec![
                fields(&["Ops", "Clerk"]),
                fields(&["HR", "Clerk"]),
                fields(&["Ops", "Manager"]),
                fields(&["HR", "Analyst"]),
                fields(&["Subtotal", ""]),
            ]
        );
        assert_eq!(result.rows[0].measures, vec![10000.0, 5400.0]);

        let total = result.grand_total().unwrap();
        assert_eq!(total.kind, RowKind::GrandTotal);
        assert_eq!(total.measures, vec![29000.0, 11900.0]);
        assert_eq!(result.rows.last(), Some(total));
    }

    #[test]
    fn test_sorted_order() {
        let options = AggregateOptions {
            order: GroupOrder::Sorted,
            ..AggregateOptions::default()
        };
        let result = run(&table(&ROWS), &options);

        assert_eq!(
            keys(&result)[..4].to_vec(),
            vec![
                fields(&["HR", "Analyst"]),
                fields(&["HR", "Clerk"]),
                fields(&["Ops", "Clerk"]),
                fields(&["Ops", "Manager"]),
            ]
        );
    }

    #[test]
    fn test_subtotals_follow_each_department() {
        let options = AggregateOptions {
            subtotals: true,
            ..AggregateOptions::default()
        };
        let result = run(&table(&ROWS), &options);

        assert_eq!(
            keys(&result),
            vec![
                fields(&["Ops", "Clerk"]),
                fields(&["Ops", "Manager"]),
                fields(&["Ops", "Subtotal"]),
                fields(&["HR", "Clerk"]),
                fields(&["HR", "Analyst"]),
                fields(&["HR", "Subtotal"]),
                fields(&["Subtotal", ""]),
            ]
        );
        assert_eq!(result.rows[2].kind, RowKind::Subtotal { depth: 1 });
        assert_eq!(result.rows[2].measures, vec![18000.0, 7400.0]);
        assert_eq!(result.rows[5].measures, vec![11000.0, 4500.0]);
        assert_eq!(result.rows[6].measures, vec![29000.0, 11900.0]);
    }

    #[test]
    fn test_single_field_key_has_no_subtotals() {
        let options = AggregateOptions {
            subtotals: true,
            ..AggregateOptions::default()
        };
        let result = aggregate(
            &table(&ROWS),
            &fields(&["Department"]),
            &fields(&["Position Budget"]),
            &options,
        )
        .unwrap();

        assert_eq!(
            keys(&result),
            vec![fields(&["Ops"]), fields(&["HR"]), fields(&["Subtotal"])]
        );
    }

    #[test]
    fn test_empty_table_yields_zero_grand_total() {
        let result = run(&table(&[]), &AggregateOptions::default());
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].measures, vec![0.0, 0.0]);
    }

    #[test]
    fn test_reserved_label_collision() {
        let t = table(&[("Subtotal", "Clerk", 1.0, 1.0)]);
        let err = aggregate(
            &t,
            &fields(&["Department", "Job Title"]),
            &fields(&["Position Budget"]),
            &AggregateOptions::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            AggregateError::ReservedLabel {
                field: "Department".into(),
                label: "Subtotal".into(),
            }
        );
    }

    #[test]
    fn test_unknown_field() {
        let err = aggregate(
            &table(&ROWS),
            &fields(&["Region"]),
            &fields(&["Position Budget"]),
            &AggregateOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, AggregateError::MissingField("Region".into()));
    }

    #[test]
    fn test_text_measure_rejected() {
        let err = aggregate(
            &table(&ROWS),
            &fields(&["Department"]),
            &fields(&["Job Title"]),
            &AggregateOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AggregateError::NotNumeric {
                field: "Job Title".into(),
                row: 2,
            }
        );
    }
}
