//! Sheet writer: title rows, header row, data rows with break rows, widths.

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::sink::SheetSink;
use crate::spec::{
    EnumCellStyle, EnumCellValue, ExportError, SpecColumnPlan, SpecExportReport, SpecSheetPlan,
};
use crate::util::{cast_col_num, cast_row_num, validate_title_rows};
use crate::width::{
    estimate_date_width, estimate_number_width, estimate_text_width, estimate_time_width,
    estimate_timestamp_width,
};

/// First year Excel can store as a serial date.
const N_YEAR_EXCEL_EPOCH: i32 = 1900;

/// Running state of one column.
#[derive(Debug, Clone)]
struct SpecColumnState {
    width: f64,
    if_warned_pre_epoch: bool,
}

/// Streaming writer for one worksheet.
///
/// [`Self::begin`] writes title and header rows, [`Self::write_row`] is called
/// once per data row, and [`Self::finish`] sets column widths and returns the
/// report. Memory use is independent of the row count.
pub struct SheetWriter<'a, S: SheetSink + ?Sized> {
    sink: &'a mut S,
    plan: &'a SpecSheetPlan,
    l_states: Vec<SpecColumnState>,
    n_idx_break: Option<usize>,
    value_break_prev: Option<EnumCellValue>,
    n_row_next: usize,
    report: SpecExportReport,
}

impl<'a, S: SheetSink + ?Sized> SheetWriter<'a, S> {
    /// Write title rows and the header row.
    ///
    /// Title rows are validated before anything reaches the sink.
    pub fn begin(
        sink: &'a mut S,
        plan: &'a SpecSheetPlan,
        title_rows: &[String],
    ) -> Result<Self, ExportError> {
        validate_title_rows(title_rows)?;
        // positional alignment of rows needs a resolvable break column
        let n_idx_break = plan.break_field_index();
        if let (Some(name), None) = (plan.break_field.name(), n_idx_break) {
            return Err(ExportError::ContractMismatch(format!(
                "break field {name:?} is not a column of the plan"
            )));
        }

        let mut writer = Self {
            sink,
            plan,
            l_states: Vec::with_capacity(plan.columns.len()),
            n_idx_break,
            value_break_prev: None,
            n_row_next: 0,
            report: SpecExportReport::default(),
        };

        for c_title in title_rows {
            let n_row = writer.take_row()?;
            writer
                .sink
                .write_text(n_row, 0, c_title, EnumCellStyle::Title)?;
        }
        if !title_rows.is_empty() {
            writer.n_row_next += 1;
        }

        let n_row_header = writer.take_row()?;
        writer.report.n_row_header = n_row_header;
        for (n_idx_col, column) in plan.columns.iter().enumerate() {
            let n_col = cast_col_num(n_idx_col).map_err(ExportError::Sink)?;
            if column.heading.is_empty() {
                writer
                    .sink
                    .write_blank(n_row_header, n_col, EnumCellStyle::Header)?;
            } else {
                writer
                    .sink
                    .write_text(n_row_header, n_col, &column.heading, EnumCellStyle::Header)?;
            }
            writer.l_states.push(SpecColumnState {
                width: estimate_text_width(&column.heading, true),
                if_warned_pre_epoch: false,
            });
        }

        Ok(writer)
    }

    /// Write one data row aligned positionally with the plan.
    pub fn write_row(&mut self, row: &[EnumCellValue]) -> Result<(), ExportError> {
        if row.len() != self.plan.columns.len() {
            return Err(ExportError::ContractMismatch(format!(
                "row {} has {} values but the plan has {} columns",
                self.report.n_rows_data + 1,
                row.len(),
                self.plan.columns.len()
            )));
        }

        if let Some(n_idx_break) = self.n_idx_break {
            let value = &row[n_idx_break];
            if let Some(value_prev) = &self.value_break_prev
                && value_prev != value
            {
                self.n_row_next += 1;
                self.report.n_rows_break += 1;
            }
            self.value_break_prev = Some(value.clone());
        }

        let n_row = self.take_row()?;
        for (n_idx_col, value) in row.iter().enumerate() {
            self.write_cell(n_row, n_idx_col, value)?;
        }
        self.report.n_rows_data += 1;
        Ok(())
    }

    /// Set every column width and return the report.
    pub fn finish(mut self) -> Result<SpecExportReport, ExportError> {
        let plan = self.plan;
        let mut l_widths = Vec::with_capacity(plan.columns.len());
        for (n_idx_col, (column, state)) in plan.columns.iter().zip(&self.l_states).enumerate() {
            let width = column.width_explicit.unwrap_or(state.width);
            self.sink
                .set_column_width(cast_col_num(n_idx_col).map_err(ExportError::Sink)?, width)?;
            l_widths.push(width);
        }
        self.report.widths = l_widths;

        tracing::info!(
            n_rows_data = self.report.n_rows_data,
            n_rows_break = self.report.n_rows_break,
            n_warnings = self.report.warnings.len(),
            "sheet written"
        );
        Ok(self.report)
    }

    fn take_row(&mut self) -> Result<u32, ExportError> {
        let n_row = cast_row_num(self.n_row_next).map_err(ExportError::Sink)?;
        self.n_row_next += 1;
        Ok(n_row)
    }

    fn write_cell(
        &mut self,
        n_row: u32,
        n_idx_col: usize,
        value: &EnumCellValue,
    ) -> Result<(), ExportError> {
        let plan = self.plan;
        let column = &plan.columns[n_idx_col];
        let n_col = cast_col_num(n_idx_col).map_err(ExportError::Sink)?;

        match value {
            EnumCellValue::Null => {}
            EnumCellValue::NativeDate(date) => {
                if self.check_excel_year(n_idx_col, date.year()) {
                    self.sink.write_date(n_row, n_col, *date, EnumCellStyle::Date)?;
                }
            }
            EnumCellValue::NativeTime(time) => {
                self.sink.write_time(n_row, n_col, *time, EnumCellStyle::Time)?;
            }
            EnumCellValue::NativeTimestamp(timestamp) => {
                if self.check_excel_year(n_idx_col, timestamp.year()) {
                    self.sink
                        .write_timestamp(n_row, n_col, *timestamp, EnumCellStyle::Timestamp)?;
                }
            }
            _ if column.if_is_numeric_date => {
                if let Some(date) = decode_numeric_date(column, value)?
                    && self.check_excel_year(n_idx_col, date.year())
                {
                    self.sink.write_date(n_row, n_col, date, EnumCellStyle::Date)?;
                }
            }
            _ if column.if_is_numeric_time => {
                if let Some(time) = decode_numeric_time(column, value)? {
                    self.sink.write_time(n_row, n_col, time, EnumCellStyle::Time)?;
                }
            }
            _ if column.if_blank_on_zero && value.is_zero() => {}
            _ => {
                let style = match (&column.number_format, column.if_wrap, value) {
                    (Some(c_pattern), _, _) => EnumCellStyle::NumberFormat(c_pattern),
                    (None, true, _) => EnumCellStyle::Wrapped,
                    (None, false, EnumCellValue::Text(_)) => EnumCellStyle::Text,
                    (None, false, _) => EnumCellStyle::Plain,
                };
                self.write_raw_value(n_row, n_col, value, style)?;
            }
        }

        if column.width_explicit.is_none()
            && let Some(width) = estimate_cell_width(column, value)
        {
            let state = &mut self.l_states[n_idx_col];
            state.width = state.width.max(width);
        }
        Ok(())
    }

    fn write_raw_value(
        &mut self,
        n_row: u32,
        n_col: u16,
        value: &EnumCellValue,
        style: EnumCellStyle<'_>,
    ) -> Result<(), ExportError> {
        match value {
            EnumCellValue::Text(val) => self.sink.write_text(n_row, n_col, val, style),
            EnumCellValue::Integer(_) | EnumCellValue::Decimal(_) => {
                let val = value.as_f64().unwrap_or_default();
                self.sink.write_number(n_row, n_col, val, style)
            }
            // remaining variants are routed before styling
            _ => Ok(()),
        }
    }

    /// Whether a date in `n_year` can be stored; records a warning once per
    /// column when it cannot.
    fn check_excel_year(&mut self, n_idx_col: usize, n_year: i32) -> bool {
        if n_year >= N_YEAR_EXCEL_EPOCH {
            return true;
        }
        let state = &mut self.l_states[n_idx_col];
        if !state.if_warned_pre_epoch {
            state.if_warned_pre_epoch = true;
            let c_msg = format!(
                "column {}: dates before {N_YEAR_EXCEL_EPOCH} cannot be stored; cells left blank",
                self.plan.columns[n_idx_col].name
            );
            tracing::warn!("{c_msg}");
            self.report.warn(c_msg);
        }
        false
    }
}

/// Write a complete sheet from a row stream.
///
/// Stops at the first failing row; the sink then holds a partial sheet that
/// the caller must discard.
pub fn write_sheet<S, I>(
    sink: &mut S,
    plan: &SpecSheetPlan,
    title_rows: &[String],
    rows: I,
) -> Result<SpecExportReport, ExportError>
where
    S: SheetSink + ?Sized,
    I: IntoIterator<Item = Result<Vec<EnumCellValue>, ExportError>>,
{
    let mut writer = SheetWriter::begin(sink, plan, title_rows)?;
    for row in rows {
        writer.write_row(&row?)?;
    }
    writer.finish()
}

/// Width contribution of one cell, `None` for null cells.
pub fn estimate_cell_width(column: &SpecColumnPlan, value: &EnumCellValue) -> Option<f64> {
    let width_temporal = match value {
        EnumCellValue::Null => return None,
        EnumCellValue::NativeDate(_) => estimate_date_width(),
        _ if column.if_is_numeric_date => estimate_date_width(),
        EnumCellValue::NativeTime(_) => estimate_time_width(),
        _ if column.if_is_numeric_time => estimate_time_width(),
        EnumCellValue::NativeTimestamp(_) => estimate_timestamp_width(),
        _ => 0.0,
    };
    let width_value = match (column.decimal_places, value.as_f64()) {
        (Some(n_dp), Some(val)) => {
            estimate_number_width(val, n_dp, column.if_uses_thousands_separator)
        }
        _ => estimate_text_width(&value.to_display_string(), false),
    };
    Some(width_temporal.max(width_value))
}

fn derive_encoded_integer(
    column: &SpecColumnPlan,
    value: &EnumCellValue,
    kind: &str,
) -> Result<i64, ExportError> {
    value.as_i64().ok_or_else(|| {
        ExportError::ContractMismatch(format!(
            "column {:?} holds a numeric {kind} but received {value:?}",
            column.name
        ))
    })
}

/// Decode `YYYYMMDD`; zero means no value.
fn decode_numeric_date(
    column: &SpecColumnPlan,
    value: &EnumCellValue,
) -> Result<Option<NaiveDate>, ExportError> {
    let n_value = derive_encoded_integer(column, value, "date")?;
    if n_value == 0 {
        return Ok(None);
    }
    let (n_year, n_rest) = (n_value.div_euclid(10_000), n_value.rem_euclid(10_000));
    let (n_month, n_day) = (n_rest / 100, n_rest % 100);
    i32::try_from(n_year)
        .ok()
        .and_then(|n_year| NaiveDate::from_ymd_opt(n_year, n_month as u32, n_day as u32))
        .map(Some)
        .ok_or_else(|| ExportError::InvalidEncodedTemporal {
            column: column.name.clone(),
            value: n_value,
            kind: "date",
        })
}

/// Decode `HHMMSS`; zero means no value.
fn decode_numeric_time(
    column: &SpecColumnPlan,
    value: &EnumCellValue,
) -> Result<Option<NaiveTime>, ExportError> {
    let n_value = derive_encoded_integer(column, value, "time")?;
    if n_value == 0 {
        return Ok(None);
    }
    let (n_hour, n_rest) = (n_value.div_euclid(10_000), n_value.rem_euclid(10_000));
    let (n_minute, n_second) = (n_rest / 100, n_rest % 100);
    u32::try_from(n_hour)
        .ok()
        .and_then(|n_hour| NaiveTime::from_hms_opt(n_hour, n_minute as u32, n_second as u32))
        .map(Some)
        .ok_or_else(|| ExportError::InvalidEncodedTemporal {
            column: column.name.clone(),
            value: n_value,
            kind: "time",
        })
}
