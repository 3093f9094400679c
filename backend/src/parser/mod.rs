//! Record sources: turn an input file into a [`RawTable`].
//!
//! CSV input gets encoding and delimiter auto-detection; spreadsheet input
//! (`.xlsx`, `.xls`, `.ods`, ...) is read from its first worksheet by
//! [`xlsx::XlsxSource`]. Values stay text here; typing happens in the
//! normalizer.

pub mod xlsx;

use std::path::{Path, PathBuf};

use crate::error::{SourceError, SourceResult};
use crate::models::RawTable;

pub use xlsx::XlsxSource;

/// Something that yields the raw input table once.
pub trait RecordSource {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    /// Read the whole table.
    fn read_table(&mut self) -> SourceResult<RawTable>;
}

/// Open the source matching the file extension.
pub fn open_source(path: &Path) -> SourceResult<Box<dyn RecordSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "tsv" | "txt" => Ok(Box::new(CsvSource::open(path)?)),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(XlsxSource::open(path)?)),
        other => Err(SourceError::UnsupportedFormat(other.to_string())),
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: RawTable,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// CSV file held in memory until read.
pub struct CsvSource {
    origin: PathBuf,
    bytes: Vec<u8>,
}

impl CsvSource {
    pub fn open(path: &Path) -> SourceResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            origin: path.to_path_buf(),
            bytes,
        })
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: PathBuf::from("<memory>"),
            bytes: bytes.into(),
        }
    }
}

impl RecordSource for CsvSource {
    fn describe(&self) -> String {
        self.origin.display().to_string()
    }

    fn read_table(&mut self) -> SourceResult<RawTable> {
        let result = parse_bytes_auto(&self.bytes)?;
        crate::logs::log_success(format!("Detected encoding: {}", result.encoding));
        crate::logs::log_success(format!(
            "Detected separator: '{}'",
            format_delimiter(result.delimiter)
        ));
        Ok(result.table)
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    decoded.trim_start_matches('\u{feff}').to_string()
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// The first non-blank row is the header. Rows made only of empty fields
/// are skipped; short rows are padded with empty strings.
///
/// # Example
/// ```ignore
/// use budget_pivot::parser::parse_csv_str;
///
/// let table = parse_csv_str("Department,Job Title\nOps,Clerk", ',').unwrap();
/// assert_eq!(table.headers, vec!["Department", "Job Title"]);
/// assert_eq!(table.rows[0].values, vec!["Ops", "Clerk"]);
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> SourceResult<RawTable> {
    if !delimiter.is_ascii() {
        return Err(SourceError::ParseError {
            line: 0,
            message: format!("delimiter '{}' is not ASCII", delimiter),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut table: Option<RawTable> = None;

    for result in reader.records() {
        let record = result.map_err(|e| SourceError::ParseError {
            line: e.position().map(|p| p.line() as usize).unwrap_or(0),
            message: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let values: Vec<String> = record.iter().map(str::to_string).collect();
        match table.as_mut() {
            None => table = Some(RawTable::new(values)),
            Some(t) => t.push_row(line, values)?,
        }
    }

    let table = table.ok_or(SourceError::EmptyFile)?;
    if table.headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeaders);
    }
    Ok(table)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> SourceResult<ParseResult> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(SourceError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let table = parse_csv_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}
