//! Workbook sink seam and its `rust_xlsxwriter` implementation.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Worksheet, XlsxError};

use crate::conf::{EnumFmtKey, derive_default_xlsx_formats};
use crate::spec::{EnumCellStyle, ExportError, SpecCellFormat};

/// Cell-level output target of the sheet writer.
///
/// Rows and columns are zero-based. Implementations own the style handles;
/// callers only name a style.
pub trait SheetSink {
    /// Write a string cell.
    fn write_text(
        &mut self,
        row: u32,
        col: u16,
        value: &str,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError>;

    /// Write a numeric cell.
    fn write_number(
        &mut self,
        row: u32,
        col: u16,
        value: f64,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError>;

    /// Write a styled cell without a value.
    fn write_blank(&mut self, row: u32, col: u16, style: EnumCellStyle<'_>)
    -> Result<(), ExportError>;

    /// Write a date cell.
    fn write_date(
        &mut self,
        row: u32,
        col: u16,
        value: NaiveDate,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError>;

    /// Write a time-of-day cell.
    fn write_time(
        &mut self,
        row: u32,
        col: u16,
        value: NaiveTime,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError>;

    /// Write a date and time cell.
    fn write_timestamp(
        &mut self,
        row: u32,
        col: u16,
        value: NaiveDateTime,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError>;

    /// Set the width of one column, in Excel character units.
    fn set_column_width(&mut self, col: u16, width: f64) -> Result<(), ExportError>;
}

////////////////////////////////////////////////////////////////////////////////
// #region XlsxSink

/// Lazily built `Format` handles keyed by style.
#[derive(Debug)]
struct XlsxFormatCache {
    dict_fmt_preset: BTreeMap<EnumFmtKey, Format>,
    dict_fmt_number: BTreeMap<String, Format>,
}

impl XlsxFormatCache {
    fn new() -> Self {
        let dict_fmt_preset = derive_default_xlsx_formats()
            .iter()
            .map(|(key, spec)| (*key, derive_rust_xlsx_format(spec)))
            .collect();
        Self {
            dict_fmt_preset,
            dict_fmt_number: BTreeMap::new(),
        }
    }

    /// `None` for [`EnumCellStyle::Plain`].
    fn resolve(&mut self, style: EnumCellStyle<'_>) -> Option<&Format> {
        let key = match style {
            EnumCellStyle::Plain => return None,
            EnumCellStyle::NumberFormat(c_pattern) => {
                return Some(
                    self.dict_fmt_number
                        .entry(c_pattern.to_string())
                        .or_insert_with(|| {
                            derive_rust_xlsx_format(&SpecCellFormat::from_num_format(c_pattern))
                        }),
                );
            }
            EnumCellStyle::Title => EnumFmtKey::Title,
            EnumCellStyle::Header => EnumFmtKey::Header,
            EnumCellStyle::Date => EnumFmtKey::Date,
            EnumCellStyle::Time => EnumFmtKey::Time,
            EnumCellStyle::Timestamp => EnumFmtKey::Timestamp,
            EnumCellStyle::Text => EnumFmtKey::Text,
            EnumCellStyle::Wrapped => EnumFmtKey::Wrapped,
        };
        self.dict_fmt_preset.get(&key)
    }

    #[cfg(test)]
    fn n_number_formats(&self) -> usize {
        self.dict_fmt_number.len()
    }
}

/// Sink writing into one in-memory `rust_xlsxwriter` worksheet.
///
/// The worksheet is handed back with [`Self::into_worksheet`] and pushed into
/// a `Workbook` by the caller, who also owns saving.
pub struct XlsxSheetSink {
    worksheet: Worksheet,
    formats: XlsxFormatCache,
}

impl XlsxSheetSink {
    /// Create a sink for a new worksheet named `sheet_name`.
    pub fn new(sheet_name: &str) -> Result<Self, ExportError> {
        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(sheet_name)
            .map_err(derive_xlsx_export_error)?;
        Ok(Self {
            worksheet,
            formats: XlsxFormatCache::new(),
        })
    }

    /// Release the finished worksheet.
    pub fn into_worksheet(self) -> Worksheet {
        self.worksheet
    }
}

impl SheetSink for XlsxSheetSink {
    fn write_text(
        &mut self,
        row: u32,
        col: u16,
        value: &str,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError> {
        match self.formats.resolve(style) {
            Some(format) => self
                .worksheet
                .write_string_with_format(row, col, value, format),
            None => self.worksheet.write_string(row, col, value),
        }
        .map_err(derive_xlsx_export_error)?;
        Ok(())
    }

    fn write_number(
        &mut self,
        row: u32,
        col: u16,
        value: f64,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError> {
        match self.formats.resolve(style) {
            Some(format) => self
                .worksheet
                .write_number_with_format(row, col, value, format),
            None => self.worksheet.write_number(row, col, value),
        }
        .map_err(derive_xlsx_export_error)?;
        Ok(())
    }

    fn write_blank(
        &mut self,
        row: u32,
        col: u16,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError> {
        // an unformatted blank cell is no cell at all
        if let Some(format) = self.formats.resolve(style) {
            self.worksheet
                .write_blank(row, col, format)
                .map_err(derive_xlsx_export_error)?;
        }
        Ok(())
    }

    fn write_date(
        &mut self,
        row: u32,
        col: u16,
        value: NaiveDate,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError> {
        let datetime = derive_excel_date(value)?;
        self.write_excel_datetime(row, col, &datetime, style)
    }

    fn write_time(
        &mut self,
        row: u32,
        col: u16,
        value: NaiveTime,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError> {
        let datetime = ExcelDateTime::from_hms(
            value.hour() as u16,
            value.minute() as u8,
            derive_seconds(value),
        )
        .map_err(derive_xlsx_export_error)?;
        self.write_excel_datetime(row, col, &datetime, style)
    }

    fn write_timestamp(
        &mut self,
        row: u32,
        col: u16,
        value: NaiveDateTime,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError> {
        let time = value.time();
        let datetime = derive_excel_date(value.date())?
            .and_hms(time.hour() as u16, time.minute() as u8, derive_seconds(time))
            .map_err(derive_xlsx_export_error)?;
        self.write_excel_datetime(row, col, &datetime, style)
    }

    fn set_column_width(&mut self, col: u16, width: f64) -> Result<(), ExportError> {
        self.worksheet
            .set_column_width(col, width)
            .map_err(derive_xlsx_export_error)?;
        Ok(())
    }
}

impl XlsxSheetSink {
    fn write_excel_datetime(
        &mut self,
        row: u32,
        col: u16,
        datetime: &ExcelDateTime,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError> {
        match self.formats.resolve(style) {
            Some(format) => self
                .worksheet
                .write_datetime_with_format(row, col, datetime, format),
            None => self.worksheet.write_datetime(row, col, datetime),
        }
        .map_err(derive_xlsx_export_error)?;
        Ok(())
    }
}

fn derive_excel_date(value: NaiveDate) -> Result<ExcelDateTime, ExportError> {
    let n_year = u16::try_from(value.year())
        .map_err(|_| ExportError::Sink(format!("xlsx write error: year out of range: {value}")))?;
    ExcelDateTime::from_ymd(n_year, value.month() as u8, value.day() as u8)
        .map_err(derive_xlsx_export_error)
}

fn derive_seconds(value: NaiveTime) -> f64 {
    f64::from(value.second()) + f64::from(value.nanosecond()) / 1e9
}

/// Map a declarative cell style to a `rust_xlsxwriter` format.
pub fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

pub(crate) fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}

pub(crate) fn derive_xlsx_export_error(err: XlsxError) -> ExportError {
    ExportError::Sink(derive_xlsx_error_text(err))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::Workbook;

    use super::*;

    #[test]
    fn test_format_cache_reuses_number_formats() {
        let mut formats = XlsxFormatCache::new();
        assert!(formats.resolve(EnumCellStyle::Plain).is_none());
        assert!(formats.resolve(EnumCellStyle::Header).is_some());
        assert!(formats.resolve(EnumCellStyle::NumberFormat("#,###.00")).is_some());
        assert!(formats.resolve(EnumCellStyle::NumberFormat("#,###.00")).is_some());
        assert!(formats.resolve(EnumCellStyle::NumberFormat("0")).is_some());
        assert_eq!(formats.n_number_formats(), 2);
    }

    #[test]
    fn test_invalid_sheet_name_is_a_sink_error() {
        assert!(matches!(
            XlsxSheetSink::new("bad[name]"),
            Err(ExportError::Sink(msg)) if msg.starts_with("xlsx write error:")
        ));
    }

    #[test]
    fn test_xlsx_sink_writes_every_cell_kind() {
        let mut sink = XlsxSheetSink::new("ORDERS").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let time = NaiveTime::from_hms_opt(13, 45, 1).unwrap();

        sink.write_text(0, 0, "Order", EnumCellStyle::Header).unwrap();
        sink.write_blank(0, 1, EnumCellStyle::Header).unwrap();
        sink.write_text(1, 0, "00123", EnumCellStyle::Text).unwrap();
        sink.write_number(1, 1, 1234.5, EnumCellStyle::NumberFormat("#,###.00;-#,###.00;"))
            .unwrap();
        sink.write_number(1, 2, -7.0, EnumCellStyle::Plain).unwrap();
        sink.write_date(1, 3, date, EnumCellStyle::Date).unwrap();
        sink.write_time(1, 4, time, EnumCellStyle::Time).unwrap();
        sink.write_timestamp(1, 5, date.and_time(time), EnumCellStyle::Timestamp)
            .unwrap();
        sink.set_column_width(0, 10.5).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sink.xlsx");
        let mut workbook = Workbook::new();
        workbook.push_worksheet(sink.into_worksheet());
        workbook.save(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_derive_seconds_keeps_fraction() {
        let time = NaiveTime::from_hms_milli_opt(1, 2, 3, 500).unwrap();
        assert!((derive_seconds(time) - 3.5).abs() < 1e-9);
    }
}
