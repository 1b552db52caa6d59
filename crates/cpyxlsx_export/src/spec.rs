//! Shared export models, options and errors.

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Declarative cell style, resolved into a `rust_xlsxwriter::Format` by the sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,
    /// Text wrap.
    pub text_wrap: Option<bool>,
    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Style that only carries a number format code.
    pub fn from_num_format(num_format: &str) -> SpecCellFormat {
        SpecCellFormat {
            num_format: Some(num_format.to_string()),
            ..Default::default()
        }
    }

    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bold: other.bold.or(self.bold),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }
}

/// Style selected for one written cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCellStyle<'a> {
    /// Bold title row.
    Title,
    /// Bold, wrapping column heading.
    Header,
    /// Fixed date pattern.
    Date,
    /// Fixed time pattern.
    Time,
    /// Fixed timestamp pattern.
    Timestamp,
    /// Text-forcing pattern.
    Text,
    /// Wrapping cell.
    Wrapped,
    /// Column-specific numeric display pattern.
    NumberFormat(&'a str),
    /// No style at all.
    Plain,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FieldMetadata

/// Declared numeric shape of a packed/zoned field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecNumericShape {
    /// Total digit count.
    pub digits: u32,
    /// Digits after the implied decimal point.
    pub decimal_places: u32,
}

/// One field-description record, in definition order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SpecFieldMetadata {
    /// Field name; unique within one file.
    pub name: String,
    /// Field text (free-form, may carry directives).
    pub text: String,
    /// Record-format text, identical for every field of the record.
    pub record_text: String,
    /// Digit count; `None` or `0` for character fields.
    pub digits: Option<u32>,
    /// Decimal places of numeric fields.
    pub decimal_places: u32,
    /// Buffer length in bytes.
    pub byte_length: u32,
    /// Edit code (usually one character, may be blank).
    pub edit_code: String,
    /// Edit word, including its surrounding quotes.
    pub edit_word: String,
    /// Up to three raw heading lines.
    pub headings: Vec<String>,
}

impl SpecFieldMetadata {
    /// Copy with trailing blanks removed from every text attribute.
    ///
    /// Field-description outfiles use fixed-width, blank-padded columns.
    pub fn trim_padding(&self) -> SpecFieldMetadata {
        SpecFieldMetadata {
            name: self.name.trim_end().to_string(),
            text: self.text.trim_end().to_string(),
            record_text: self.record_text.trim_end().to_string(),
            edit_code: self.edit_code.trim_end().to_string(),
            edit_word: self.edit_word.trim_end().to_string(),
            headings: self
                .headings
                .iter()
                .map(|c_line| c_line.trim_end().to_string())
                .collect(),
            ..self.clone()
        }
    }

    /// Numeric shape, or `None` for character fields.
    pub fn numeric_shape(&self) -> Option<SpecNumericShape> {
        match self.digits {
            Some(digits) if digits > 0 => Some(SpecNumericShape {
                digits,
                decimal_places: self.decimal_places,
            }),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnPlan

/// Directives extracted from field text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecFieldAnnotations {
    /// `format="..."` pattern, passed through uninterpreted.
    pub format_override: Option<String>,
    /// `width=N` column width.
    pub width_override: Option<u32>,
    /// `wrap=on` / `wrap=*on`.
    pub if_wrap: bool,
    /// `zero=blank` and its spelling variants.
    pub if_blank_on_zero: bool,
}

/// Disguised temporal meaning of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumTemporalKind {
    /// Plain number.
    #[default]
    None,
    /// `YYYYMMDD` date.
    Date,
    /// `HHMMSS` time.
    Time,
}

/// Break-field resolution state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnumBreakField {
    /// Not looked at yet.
    #[default]
    Unresolved,
    /// Looked at; there is no break field.
    None,
    /// Break on changes of this field.
    Named(String),
}

impl EnumBreakField {
    /// Field name when a break field is configured.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Unresolved | Self::None => None,
        }
    }
}

/// Resolved formatting of one emitted column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecColumnPlan {
    /// Field name.
    pub name: String,
    /// Heading text; may be empty.
    pub heading: String,
    /// Numeric display pattern (`positive;negative;zero`).
    pub number_format: Option<String>,
    /// Whether `number_format` contains a thousands separator.
    pub if_uses_thousands_separator: bool,
    /// Decimal places of numeric fields.
    pub decimal_places: Option<u32>,
    /// Numeric `YYYYMMDD` field.
    pub if_is_numeric_date: bool,
    /// Numeric `HHMMSS` field.
    pub if_is_numeric_time: bool,
    /// Fixed width; disables autofit for the column.
    pub width_explicit: Option<f64>,
    /// Wrap cell contents.
    pub if_wrap: bool,
    /// Leave zero values empty.
    pub if_blank_on_zero: bool,
}

/// Column plans for one sheet plus its break field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetPlan {
    /// Emitted columns, in definition order.
    pub columns: Vec<SpecColumnPlan>,
    /// Break field; never `Unresolved` once built from a non-empty field list.
    pub break_field: EnumBreakField,
    /// Fields left out with `*SKIP`; the row source may carry them.
    pub names_skipped: Vec<String>,
}

impl SpecSheetPlan {
    /// Column names in emission order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of the break field, if any.
    pub fn break_field_index(&self) -> Option<usize> {
        let name = self.break_field.name()?;
        self.columns.iter().position(|c| c.name == name)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Typed cell value delivered by a row source.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// SQL null.
    Null,
    /// Character data, trailing blanks already removed.
    Text(String),
    /// Numeric data without fraction.
    Integer(i64),
    /// Numeric data with fraction.
    Decimal(f64),
    /// Native date.
    NativeDate(NaiveDate),
    /// Native time.
    NativeTime(NaiveTime),
    /// Native timestamp.
    NativeTimestamp(NaiveDateTime),
}

impl EnumCellValue {
    /// Numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(val) => Some(*val as f64),
            Self::Decimal(val) => Some(*val),
            _ => None,
        }
    }

    /// Integer view used by disguised date/time decoding.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(val) => Some(*val),
            Self::Decimal(val) if val.fract() == 0.0 && val.is_finite() => Some(*val as i64),
            _ => None,
        }
    }

    /// Numeric zero.
    pub fn is_zero(&self) -> bool {
        self.as_f64() == Some(0.0)
    }

    /// Text used for width estimation of non-numeric columns.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(val) => val.clone(),
            Self::Integer(val) => val.to_string(),
            Self::Decimal(val) => val.to_string(),
            Self::NativeDate(val) => val.to_string(),
            Self::NativeTime(val) => val.to_string(),
            Self::NativeTimestamp(val) => val.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Options of one export run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecExportOptions {
    /// Bold free-form rows written above the header.
    pub title_rows: Vec<String>,
    /// Worksheet name; defaults to the file part of the qualified name.
    pub sheet_name: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportAndErrors

/// Per-export report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecExportReport {
    /// Final width of each column, in plan order.
    pub widths: Vec<f64>,
    /// Zero-based output row of the header.
    pub n_row_header: u32,
    /// Data rows written.
    pub n_rows_data: u64,
    /// Blank rows inserted at break-field changes.
    pub n_rows_break: u64,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecExportReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} rows={} breaks={} columns={} warnings={}",
            self.n_rows_data,
            self.n_rows_break,
            self.widths.len(),
            self.warnings.len()
        )
    }
}

impl fmt::Display for SpecExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[EXPORT]"))
    }
}

/// Export failures.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Qualified file name could not be parsed.
    #[error("Could not parse file name: {0:?}")]
    InvalidQualifiedName(String),
    /// Too many or too long title rows.
    #[error("Invalid title rows: {0}")]
    InvalidTitleRows(String),
    /// Field metadata could not be obtained or is inconsistent.
    #[error("Field metadata error: {0}")]
    MetadataSource(String),
    /// Rows do not line up with the column plan.
    #[error("Row/column contract violated: {0}")]
    ContractMismatch(String),
    /// Numeric date/time that is not a calendar value.
    #[error("Column {column:?} holds {value}, which is not a valid {kind}")]
    InvalidEncodedTemporal {
        /// Column name.
        column: String,
        /// Raw numeric value.
        value: i64,
        /// `date` or `time`.
        kind: &'static str,
    },
    /// Row source failure.
    #[error("Row source error: {0}")]
    RowSource(String),
    /// Workbook sink failure, passed through unchanged.
    #[error("{0}")]
    Sink(String),
    /// File access failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
