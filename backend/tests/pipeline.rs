//! End-to-end runs: input file in, report file out.

use std::fs;
use std::path::Path;

use budget_pivot::{
    generate_report, inspect_records, AggregateError, NormalizeError, PipelineError, ReportConfig,
};
use calamine::{open_workbook_auto, Reader};
use pretty_assertions::assert_eq;
use serde_json::Value;

const HEADER: &str = "Department,Job Title,Position Budget,YTD Actuals,Actual for Month,EE Annual Salary";

fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut content = String::from(HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    fs::write(&path, content).unwrap();
    path
}

fn read_sheet(path: &Path, name: &str) -> Vec<Vec<String>> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let range = workbook.worksheet_range(name).unwrap();
    range
        .rows()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

#[test]
fn test_csv_to_xlsx_ops_clerk() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "budget.csv",
        &[
            "Ops,Clerk,\"$5,000.00\",\"$3,000.00\",$500.00,\"$40,000.00\"",
            "Ops,Clerk,\"$5,000.00\",\"$2,400.00\",$400.00,\"$40,000.00\"",
        ],
    );
    let output = dir.path().join("budget_pivot.xlsx");

    let stats = generate_report(&input, &output, &ReportConfig::default()).unwrap();

    assert_eq!(stats.groups, 1);
    assert_eq!(stats.negative, 2);
    assert_eq!(
        read_sheet(&output, "UpdatedPivotTable"),
        vec![
            vec![
                "Department",
                "Job Title",
                "Position Budget",
                "YTD Actuals",
                "Remainder Forecasted",
                "Forecasted Saving/Underspend",
            ],
            vec!["Ops", "Clerk", "10,000", "5,400", "10,800", "-800"],
            vec!["Subtotal", "", "10,000", "5,400", "10,800", "-800"],
        ]
    );
}

#[test]
fn test_csv_to_json_categories() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "budget.csv",
        &[
            "Ops,Clerk,$10000,$4500,$750,$40000",
            "HR,Analyst,$10000,$5500,$900,$52000",
        ],
    );
    let output = dir.path().join("report.json");

    generate_report(&input, &output, &ReportConfig::default()).unwrap();

    let doc: Value = serde_json::from_slice(&fs::read(&output).unwrap()).unwrap();
    let rows = doc["sheet"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    // 10000 - 9000
    assert_eq!(rows[0]["cells"][5]["value"], "1,000");
    assert_eq!(rows[0]["category"], "positive");
    // 10000 - 11000
    assert_eq!(rows[1]["cells"][5]["value"], "-1,000");
    assert_eq!(rows[1]["category"], "negative");
    assert_eq!(rows[2]["kind"]["type"], "grandTotal");
    assert_eq!(rows[2]["cells"][2]["value"], "20,000");
}

#[test]
fn test_csv_output_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "budget.csv",
        &[
            "Ops,Manager,$8000,$2000,$0,$0",
            "HR,Clerk,$4000,$1000,$0,$0",
            "Ops,Clerk,$5000,$3000,$0,$0",
        ],
    );
    let config_path = dir.path().join("report.json");
    fs::write(&config_path, r#"{ "order": "sorted", "totalLabel": "Total" }"#).unwrap();
    let config = ReportConfig::load(&config_path).unwrap();
    let output = dir.path().join("out.csv");

    generate_report(&input, &output, &config).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let first_column: Vec<&str> = text
        .lines()
        .map(|l| l.split(',').next().unwrap_or(""))
        .collect();
    assert_eq!(first_column, vec!["Department", "HR", "Ops", "Ops", "Total"]);
}

#[test]
fn test_missing_field_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("budget.csv");
    fs::write(&input, "Department,Job Title,Position Budget\nOps,Clerk,$1\n").unwrap();
    let output = dir.path().join("out.xlsx");

    let err = generate_report(&input, &output, &ReportConfig::default()).unwrap_err();

    assert!(matches!(err, PipelineError::Normalize(NormalizeError::MissingField(_))));
    assert!(!output.exists());
}

#[test]
fn test_currency_error_keeps_previous_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "budget.csv", &["Ops,Clerk,$5000,pending,$0,$0"]);
    let output = dir.path().join("out.csv");
    fs::write(&output, "previous").unwrap();

    let err = generate_report(&input, &output, &ReportConfig::default()).unwrap_err();

    match err {
        PipelineError::Normalize(NormalizeError::CurrencyParse { field, row, value }) => {
            assert_eq!(field, "YTD Actuals");
            assert_eq!(row, 2);
            assert_eq!(value, "pending");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
}

#[test]
fn test_reserved_label_in_data() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "budget.csv", &["Subtotal,Clerk,$1,$1,$1,$1"]);
    let output = dir.path().join("out.xlsx");

    let err = generate_report(&input, &output, &ReportConfig::default()).unwrap_err();

    assert!(matches!(err, PipelineError::Aggregate(AggregateError::ReservedLabel { .. })));
    assert!(!output.exists());
}

#[test]
fn test_xlsx_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("budget.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in HEADER.split(',').enumerate() {
        sheet.write_string(0, col as u16, name).unwrap();
    }
    sheet.write_string(1, 0, "Ops").unwrap();
    sheet.write_string(1, 1, "Clerk").unwrap();
    for (col, n) in [5000.0, 600.0, 100.0, 40000.0].iter().enumerate() {
        sheet.write_number(1, (col + 2) as u16, *n).unwrap();
    }
    workbook.save(&input).unwrap();

    let output = dir.path().join("out.json");
    generate_report(&input, &output, &ReportConfig::default()).unwrap();

    let doc: Value = serde_json::from_slice(&fs::read(&output).unwrap()).unwrap();
    // Remainder Forecasted: 600 / 6 * 12
    assert_eq!(doc["sheet"]["rows"][0]["cells"][4]["value"], "1,200");
    assert_eq!(doc["sheet"]["rows"][0]["cells"][5]["value"], "3,800");
}

#[test]
fn test_inspect_reports_dedup() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "budget.csv",
        &["Ops,Clerk,$5000,$600,$0,$0", "Ops,Clerk,$5000,$600,$0,$0"],
    );

    let doc = inspect_records(&input, &ReportConfig::default()).unwrap();

    assert_eq!(doc["rowsDropped"], 1);
    let records = doc["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["Remainder Forecasted"], 1200.0);
    assert_eq!(records[0]["Forecasted Saving/Underspend"], 3200.0);
}
