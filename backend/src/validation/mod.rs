//! JSON Schema validation for report configuration files.
//!
//! The schema is embedded at compile time from
//! `schemas/report-config.json` and checked with JSON Schema Draft 7
//! before the file is deserialized, so a typo such as `"subtotal": true`
//! is reported instead of silently ignored.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use budget_pivot::validation::validate_report_config;
//!
//! assert!(validate_report_config(&json!({ "subtotals": true })).is_ok());
//! assert!(validate_report_config(&json!({ "elapsedMonths": 0 })).is_err());
//! ```

use serde_json::Value;

const REPORT_CONFIG_SCHEMA: &str = include_str!("../../schemas/report-config.json");

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The embedded report configuration schema.
pub fn report_config_schema() -> Result<Value, Vec<String>> {
    serde_json::from_str(REPORT_CONFIG_SCHEMA)
        .map_err(|e| vec![format!("Invalid embedded schema: {}", e)])
}

/// Validate a configuration document against the report config schema.
pub fn validate_report_config(data: &Value) -> Result<(), Vec<String>> {
    let schema = report_config_schema()?;
    validate(&schema, data)
}
