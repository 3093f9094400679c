//! Report configuration.
//!
//! [`ReportConfig::default`] reproduces the standard budget report: records
//! grouped by `(Department, Job Title)`, four currency columns, a six month
//! YTD window projected over twelve months, and a grand total labeled
//! `Subtotal`. A JSON file can override any subset of keys:
//!
//! ```json
//! { "order": "sorted", "subtotals": true, "elapsedMonths": 9 }
//! ```
//!
//! Loading goes schema check → deserialize → [`ReportConfig::check`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::models::field_key;
use crate::validation::validate_report_config;

/// Pastel green fill for savings.
pub const DEFAULT_POSITIVE_FILL: &str = "#B2FFB2";
/// Pastel red fill for overspend.
pub const DEFAULT_NEGATIVE_FILL: &str = "#FFB2B2";

/// Order in which group rows are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupOrder {
    /// Order in which each key first appears in the input.
    #[default]
    FirstSeen,
    /// Lexicographic order of the key tuple.
    Sorted,
}

/// Column names of the inputs and outputs of the budget formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricFields {
    pub position_budget: String,
    pub ytd_actuals: String,
    pub remainder_forecasted: String,
    pub budget_minus_remainder: String,
    pub forecasted_saving: String,
}

impl Default for MetricFields {
    fn default() -> Self {
        Self {
            position_budget: "Position Budget".to_string(),
            ytd_actuals: "YTD Actuals".to_string(),
            remainder_forecasted: "Remainder Forecasted".to_string(),
            budget_minus_remainder: "Budget Minus Remainder Forecasted".to_string(),
            forecasted_saving: "Forecasted Saving/Underspend".to_string(),
        }
    }
}

/// Fill colors applied to the annotated column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillStyle {
    pub positive_fill: String,
    pub negative_fill: String,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            positive_fill: DEFAULT_POSITIVE_FILL.to_string(),
            negative_fill: DEFAULT_NEGATIVE_FILL.to_string(),
        }
    }
}

/// Everything that shapes a report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    /// Categorical fields forming the group key, outermost first.
    pub group_fields: Vec<String>,

    /// Text fields coerced to numbers during normalization.
    pub currency_fields: Vec<String>,

    /// Names of formula inputs and derived columns.
    pub metrics: MetricFields,

    /// Reserved label for subtotal and grand total rows.
    pub total_label: String,

    /// Months covered by the YTD figures.
    pub elapsed_months: u32,

    /// Months in the full budget period.
    pub period_months: u32,

    /// Group row order.
    pub order: GroupOrder,

    /// Emit a subtotal row for every key prefix.
    pub subtotals: bool,

    /// Name of the report sheet.
    pub sheet_name: String,

    /// Fill colors for the annotated column.
    pub style: FillStyle,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            group_fields: vec!["Department".to_string(), "Job Title".to_string()],
            currency_fields: vec![
                "Position Budget".to_string(),
                "YTD Actuals".to_string(),
                "Actual for Month".to_string(),
                "EE Annual Salary".to_string(),
            ],
            metrics: MetricFields::default(),
            total_label: "Subtotal".to_string(),
            elapsed_months: 6,
            period_months: 12,
            order: GroupOrder::FirstSeen,
            subtotals: false,
            sheet_name: "UpdatedPivotTable".to_string(),
            style: FillStyle::default(),
        }
    }
}

impl ReportConfig {
    /// Parse, schema-check and semantically check a JSON document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        validate_report_config(&value).map_err(|errors| ConfigError::SchemaError { errors })?;
        let config: ReportConfig = serde_json::from_value(value)?;
        config.check()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load from a file when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Measures summed directly by the aggregator, in report column order.
    pub fn measure_fields(&self) -> Vec<String> {
        vec![
            self.metrics.position_budget.clone(),
            self.metrics.ytd_actuals.clone(),
            self.metrics.remainder_forecasted.clone(),
        ]
    }

    /// Fields the record source must provide.
    pub fn required_fields(&self) -> Vec<String> {
        let mut fields = self.group_fields.clone();
        for f in &self.currency_fields {
            if !has_field(&fields, f) {
                fields.push(f.clone());
            }
        }
        fields
    }

    /// Checks the schema cannot express.
    pub fn check(&self) -> ConfigResult<()> {
        if self.group_fields.is_empty() {
            return Err(invalid("groupFields", "at least one group field is required"));
        }
        if self.total_label.trim().is_empty() {
            return Err(invalid("totalLabel", "label must not be blank"));
        }
        if self.elapsed_months == 0 {
            return Err(invalid("elapsedMonths", "must be greater than zero"));
        }
        if self.period_months == 0 {
            return Err(invalid("periodMonths", "must be greater than zero"));
        }
        for input in [&self.metrics.position_budget, &self.metrics.ytd_actuals] {
            if !has_field(&self.currency_fields, input) {
                return Err(invalid(
                    "currencyFields",
                    &format!("'{}' feeds the forecast and must be a currency field", input),
                ));
            }
        }
        check_sheet_name(&self.sheet_name)?;
        check_color("style.positiveFill", &self.style.positive_fill)?;
        check_color("style.negativeFill", &self.style.negative_fill)?;
        Ok(())
    }
}

/// Name lookup under the same case and spacing rules as column matching.
fn has_field(fields: &[String], name: &str) -> bool {
    let key = field_key(name);
    fields.iter().any(|f| field_key(f) == key)
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn check_sheet_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() || name.chars().count() > 31 {
        return Err(invalid("sheetName", "must be 1 to 31 characters"));
    }
    if name.chars().any(|c| matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\')) {
        return Err(invalid("sheetName", "must not contain []:*?/\\"));
    }
    Ok(())
}

fn check_color(field: &str, color: &str) -> ConfigResult<()> {
    let hex = color.strip_prefix('#').unwrap_or("");
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(invalid(field, "expected a #RRGGBB color"))
    }
}
