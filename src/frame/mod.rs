//! Tabular frame module
//!
//! Uploaded files are parsed into a [`Frame`]: ordered, named columns of equal
//! length. After inference each column holds a single value kind plus nulls.
//!
//! - `delimited`: comma-separated text
//! - `records`: JSON documents and line-delimited JSON
//! - `spreadsheet`: `.xls` / `.xlsx` workbooks
//! - `infer`: NA detection, column naming, and type coercion shared by the parsers

mod delimited;
pub mod infer;
mod records;
mod spreadsheet;

use chrono::NaiveDateTime;
use std::fmt;

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

/// Kind of a non-null cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    DateTime,
}

/// Hashable identity of a cell, used for distinct counts and duplicate rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(&'a str),
    DateTime(NaiveDateTime),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::Int(_) => Some(ValueKind::Int),
            Self::Float(_) => Some(ValueKind::Float),
            Self::Text(_) => Some(ValueKind::Text),
            Self::DateTime(_) => Some(ValueKind::DateTime),
        }
    }

    /// Numeric view: integers, floats, and booleans as 0/1
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    pub fn key(&self) -> ValueKey<'_> {
        match self {
            Self::Null => ValueKey::Null,
            Self::Bool(b) => ValueKey::Bool(*b),
            Self::Int(i) => ValueKey::Int(*i),
            // -0.0 and 0.0 compare equal
            Self::Float(f) => ValueKey::Float(if *f == 0.0 { 0.0_f64.to_bits() } else { f.to_bits() }),
            Self::Text(s) => ValueKey::Text(s),
            Self::DateTime(dt) => ValueKey::DateTime(*dt),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NaN"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Text(s) => f.write_str(s),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Render a float the way a dataframe prints it: integral values keep one decimal
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub const fn new(name: String, values: Vec<Value>) -> Self {
        Self { name, values }
    }

    /// Kind of the first non-null cell; columns are homogeneous after inference
    pub fn kind(&self) -> Option<ValueKind> {
        self.values.iter().find_map(Value::kind)
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }
}

/// Parsed table
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Build a frame, rejecting empty input and ragged columns
    pub fn new(columns: Vec<Column>) -> Result<Self, FrameError> {
        let Some(first) = columns.first() else {
            return Err(FrameError::Empty);
        };
        let n_rows = first.values.len();
        if let Some(bad) = columns.iter().find(|c| c.values.len() != n_rows) {
            return Err(FrameError::ColumnLength {
                column: bad.name.clone(),
                expected: n_rows,
                found: bad.values.len(),
            });
        }
        Ok(Self { columns, n_rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub const fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one row, in column order
    pub fn row(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.columns.iter().map(move |c| &c.values[index])
    }

    pub fn row_key(&self, index: usize) -> Vec<ValueKey<'_>> {
        self.row(index).map(Value::key).collect()
    }
}

/// Parser selected from the uploaded filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Spreadsheet,
}

impl SourceFormat {
    /// Dispatch on the lowercase filename suffix
    ///
    /// # Examples
    /// ```
    /// use eda_report_server::frame::SourceFormat;
    /// assert_eq!(SourceFormat::from_filename("Sales.CSV"), Some(SourceFormat::Csv));
    /// assert_eq!(SourceFormat::from_filename("book.xls"), Some(SourceFormat::Spreadsheet));
    /// assert_eq!(SourceFormat::from_filename("notes.txt"), None);
    /// ```
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") {
            Some(Self::Csv)
        } else if lower.ends_with(".json") {
            Some(Self::Json)
        } else if lower.ends_with(".xls") || lower.ends_with(".xlsx") {
            Some(Self::Spreadsheet)
        } else {
            None
        }
    }

    pub fn parse(self, bytes: &[u8]) -> Result<Frame, FrameError> {
        match self {
            Self::Csv => delimited::parse(bytes),
            Self::Json => records::parse(bytes),
            Self::Spreadsheet => spreadsheet::parse(bytes),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON",
            Self::Spreadsheet => "Excel",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse failures
#[derive(Debug)]
pub enum FrameError {
    /// Input produced no columns
    Empty,

    /// Text input was not valid UTF-8
    Encoding(std::str::Utf8Error),

    /// Malformed CSV (including ragged rows)
    Csv(csv::Error),

    /// Malformed JSON
    Json(serde_json::Error),

    /// Valid JSON that does not describe a table
    JsonShape(String),

    /// Workbook could not be opened or read
    Spreadsheet(calamine::Error),

    /// Workbook has no worksheet
    NoWorksheet,

    /// Column length differs from the first column
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("No columns to parse from file"),
            Self::Encoding(err) => write!(f, "File is not valid UTF-8: {err}"),
            Self::Csv(err) => write!(f, "Error tokenizing data: {err}"),
            Self::Json(err) => write!(f, "Invalid JSON: {err}"),
            Self::JsonShape(msg) => f.write_str(msg),
            Self::Spreadsheet(err) => write!(f, "Failed to read Excel file: {err}"),
            Self::NoWorksheet => f.write_str("Worksheet index 0 is invalid, 0 worksheets found"),
            Self::ColumnLength {
                column,
                expected,
                found,
            } => write!(
                f,
                "Column '{column}' has {found} values, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encoding(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Spreadsheet(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::str::Utf8Error> for FrameError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Encoding(err)
    }
}

impl From<csv::Error> for FrameError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for FrameError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<calamine::Error> for FrameError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet(err)
    }
}

/// Drop a leading UTF-8 byte order mark
pub(crate) fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}
