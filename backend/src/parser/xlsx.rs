//! Spreadsheet record source backed by `calamine`.
//!
//! Reads the first worksheet; its first row is the header. Numeric cells
//! are rendered back to text so spreadsheet and CSV input go through the
//! same currency coercion.

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::RecordSource;
use crate::error::{SourceError, SourceResult};
use crate::models::RawTable;

/// An open workbook.
pub struct XlsxSource {
    origin: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl XlsxSource {
    pub fn open(path: &Path) -> SourceResult<Self> {
        let workbook = open_workbook_auto(path)?;
        Ok(Self {
            origin: path.to_path_buf(),
            workbook,
        })
    }
}

impl RecordSource for XlsxSource {
    fn describe(&self) -> String {
        self.origin.display().to_string()
    }

    fn read_table(&mut self) -> SourceResult<RawTable> {
        let range = self
            .workbook
            .worksheet_range_at(0)
            .ok_or(SourceError::NoWorksheet)??;

        // Row numbers reported to the user are 1-based sheet rows.
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

        let mut rows = range
            .rows()
            .enumerate()
            .map(|(i, cells)| (first_row + i + 1, cells.iter().map(cell_text).collect::<Vec<_>>()))
            .filter(|(_, values)| values.iter().any(|v| !v.is_empty()));

        let (_, headers) = rows.next().ok_or(SourceError::EmptyFile)?;
        if headers.iter().all(|h| h.is_empty()) {
            return Err(SourceError::NoHeaders);
        }

        let mut table = RawTable::new(headers);
        for (line, values) in rows {
            table.push_row(line, values)?;
        }
        Ok(table)
    }
}

/// Text form of a cell, as a CSV export would show it.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("  Ops ".into())), "Ops");
        assert_eq!(cell_text(&Data::Float(5000.0)), "5000");
        assert_eq!(cell_text(&Data::Float(-12.5)), "-12.5");
        assert_eq!(cell_text(&Data::Int(42)), "42");
    }

    #[test]
    fn test_read_first_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Department").unwrap();
        sheet.write_string(0, 1, "Position Budget").unwrap();
        sheet.write_string(1, 0, "Ops").unwrap();
        sheet.write_number(1, 1, 5000.0).unwrap();
        sheet.write_string(3, 0, "HR").unwrap();
        sheet.write_string(3, 1, "$1,200").unwrap();
        workbook.save(&path).unwrap();

        let mut source = XlsxSource::open(&path).unwrap();
        let table = source.read_table().unwrap();

        assert_eq!(table.headers, vec!["Department", "Position Budget"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].values, vec!["Ops", "5000"]);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].values, vec!["HR", "$1,200"]);
        assert_eq!(table.rows[1].line, 4);
    }
}
