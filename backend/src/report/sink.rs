//! Report sinks: write a [`StyledSheet`] to a file.
//!
//! Every sink renders the whole artifact in memory first and only then
//! replaces the destination through a temporary file, so a failed run
//! leaves any previous report untouched.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook};
use serde_json::json;

use super::StyledSheet;
use crate::error::{SinkError, SinkResult};
use crate::logs::log_info;

/// Destination for the finished sheet. `write` is called once.
pub trait ReportSink {
    fn describe(&self) -> String;

    fn write(&mut self, sheet: &StyledSheet) -> SinkResult<()>;
}

/// Open the sink matching the file extension.
pub fn open_sink(path: &Path) -> SinkResult<Box<dyn ReportSink>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" => Ok(Box::new(XlsxSink::new(path))),
        "csv" => Ok(Box::new(CsvSink::new(path))),
        "json" => Ok(Box::new(JsonSink::new(path))),
        other => Err(SinkError::UnsupportedFormat(other.to_string())),
    }
}

/// Write `bytes` beside `path`, then rename over it.
fn write_atomic(path: &Path, bytes: &[u8]) -> SinkResult<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(e) = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    log_info(format!("Wrote {} bytes to {}", bytes.len(), path.display()));
    Ok(())
}

// =============================================================================
// XLSX
// =============================================================================

pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build the workbook bytes.
    pub fn to_bytes(sheet: &StyledSheet) -> SinkResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        let bold = Format::new().set_bold();
        for (col, name) in sheet.header.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &bold)?;
        }

        for (i, row) in sheet.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            for (col, cell) in row.cells.iter().enumerate() {
                match &cell.fill {
                    Some(color) => {
                        let fill = Format::new().set_background_color(color.as_str());
                        worksheet.write_string_with_format(r, col as u16, &cell.value, &fill)?;
                    }
                    None => {
                        worksheet.write_string(r, col as u16, &cell.value)?;
                    }
                }
            }
        }
        worksheet.autofit();

        Ok(workbook.save_to_buffer()?)
    }
}

impl ReportSink for XlsxSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn write(&mut self, sheet: &StyledSheet) -> SinkResult<()> {
        let bytes = Self::to_bytes(sheet)?;
        write_atomic(&self.path, &bytes)
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Plain CSV: values only, fills are dropped.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn to_bytes(sheet: &StyledSheet) -> SinkResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&sheet.header)?;
        for row in &sheet.rows {
            writer.write_record(row.cells.iter().map(|c| c.value.as_str()))?;
        }
        writer.into_inner().map_err(|e| SinkError::IoError(e.into_error()))
    }
}

impl ReportSink for CsvSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn write(&mut self, sheet: &StyledSheet) -> SinkResult<()> {
        let bytes = Self::to_bytes(sheet)?;
        write_atomic(&self.path, &bytes)
    }
}

// =============================================================================
// JSON
// =============================================================================

/// The sheet as JSON, with row kinds, categories and fills.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn to_bytes(sheet: &StyledSheet) -> SinkResult<Vec<u8>> {
        let document = json!({
            "generatedAt": Utc::now().to_rfc3339(),
            "sheet": sheet,
        });
        Ok(serde_json::to_vec_pretty(&document)?)
    }
}

impl ReportSink for JsonSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn write(&mut self, sheet: &StyledSheet) -> SinkResult<()> {
        let bytes = Self::to_bytes(sheet)?;
        write_atomic(&self.path, &bytes)
    }
}
