//! Metadata and row sources backed by files and Polars frames.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::{AnyValue, Column, DataFrame, IpcReader, SerReader, TimeUnit};

use crate::spec::{EnumCellValue, ExportError, SpecFieldMetadata, SpecSheetPlan};

const N_SECONDS_PER_DAY: i64 = 86_400;
const N_NANOS_PER_SECOND: i64 = 1_000_000_000;

////////////////////////////////////////////////////////////////////////////////
// #region MetadataSource

/// Read field-description records from a JSON array, in file order.
///
/// Trailing blanks of the text attributes are dropped.
pub fn load_field_metadata_json(path: &Path) -> Result<Vec<SpecFieldMetadata>, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let l_fields: Vec<SpecFieldMetadata> = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| {
            ExportError::MetadataSource(format!("{}: {err}", path.display()))
        })?;
    let l_fields: Vec<SpecFieldMetadata> =
        l_fields.iter().map(SpecFieldMetadata::trim_padding).collect();
    tracing::debug!(n_fields = l_fields.len(), "loaded field metadata");
    Ok(l_fields)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RowSource

/// Read an Arrow IPC file into a `DataFrame`.
pub fn load_dataframe_ipc(path: &Path) -> Result<DataFrame, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    IpcReader::new(file)
        .finish()
        .map_err(|err| ExportError::RowSource(format!("{}: {err}", path.display())))
}

/// Single-pass row iterator over a `DataFrame`, projected onto a plan.
///
/// Columns are taken by name in plan order. Frame columns of skipped fields
/// are not read; any other frame column unknown to the plan is rejected.
#[derive(Debug, Clone)]
pub struct DataFrameRowSource {
    l_columns: Vec<Column>,
    n_height: usize,
    n_idx_row: usize,
}

impl DataFrameRowSource {
    /// Project `df` onto the plan's columns.
    pub fn new(df: &DataFrame, plan: &SpecSheetPlan) -> Result<Self, ExportError> {
        let l_names_plan = plan.column_names();
        let l_names_unknown: Vec<&str> = df
            .get_column_names_str()
            .into_iter()
            .filter(|c_name| {
                !l_names_plan.contains(c_name)
                    && !plan.names_skipped.iter().any(|c_skipped| c_skipped == *c_name)
            })
            .collect();
        if !l_names_unknown.is_empty() {
            return Err(ExportError::ContractMismatch(format!(
                "data columns {l_names_unknown:?} are not fields of the plan"
            )));
        }

        let l_columns = l_names_plan
            .into_iter()
            .map(|c_name| {
                df.column(c_name).cloned().map_err(|_| {
                    ExportError::ContractMismatch(format!(
                        "column {c_name:?} of the plan is missing from the data"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            l_columns,
            n_height: df.height(),
            n_idx_row: 0,
        })
    }

    /// Number of rows not yet produced.
    pub fn n_rows_remaining(&self) -> usize {
        self.n_height - self.n_idx_row
    }

    fn read_row(&self, n_idx_row: usize) -> Result<Vec<EnumCellValue>, ExportError> {
        self.l_columns
            .iter()
            .map(|column| {
                let value = column.get(n_idx_row).map_err(|err| {
                    ExportError::RowSource(format!(
                        "failed to read {:?} at row {n_idx_row}: {err}",
                        column.name()
                    ))
                })?;
                derive_cell_value_from_any_value(value)
            })
            .collect()
    }
}

impl Iterator for DataFrameRowSource {
    type Item = Result<Vec<EnumCellValue>, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.n_idx_row >= self.n_height {
            return None;
        }
        let row = self.read_row(self.n_idx_row);
        self.n_idx_row += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n_remaining = self.n_rows_remaining();
        (n_remaining, Some(n_remaining))
    }
}

/// Map one Polars value onto the cell-value union.
pub fn derive_cell_value_from_any_value(
    value: AnyValue<'_>,
) -> Result<EnumCellValue, ExportError> {
    let cell = match value {
        AnyValue::Null => EnumCellValue::Null,
        AnyValue::String(val) => EnumCellValue::Text(val.trim_end().to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::Text(val.trim_end().to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::Text(if val { "True" } else { "False" }.to_string())
        }
        AnyValue::UInt8(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::UInt16(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::UInt32(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::UInt64(val) => match i64::try_from(val) {
            Ok(val) => EnumCellValue::Integer(val),
            Err(_) => EnumCellValue::Decimal(val as f64),
        },
        AnyValue::Int8(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::Int16(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::Int32(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::Int64(val) => EnumCellValue::Integer(val),
        AnyValue::Float32(val) => EnumCellValue::Decimal(f64::from(val)),
        AnyValue::Float64(val) => EnumCellValue::Decimal(val),
        AnyValue::Date(n_days) => EnumCellValue::NativeDate(derive_date_from_days(n_days)?),
        AnyValue::Datetime(val, unit, _) => {
            EnumCellValue::NativeTimestamp(derive_datetime_from_epoch(val, unit)?)
        }
        AnyValue::DatetimeOwned(val, unit, _) => {
            EnumCellValue::NativeTimestamp(derive_datetime_from_epoch(val, unit)?)
        }
        AnyValue::Time(n_nanos) => EnumCellValue::NativeTime(derive_time_from_nanos(n_nanos)?),
        _ => EnumCellValue::Text(value.to_string()),
    };
    Ok(cell)
}

fn derive_date_from_days(n_days: i32) -> Result<NaiveDate, ExportError> {
    DateTime::from_timestamp(i64::from(n_days) * N_SECONDS_PER_DAY, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| ExportError::RowSource(format!("date out of range: {n_days} days")))
}

fn derive_datetime_from_epoch(value: i64, unit: TimeUnit) -> Result<NaiveDateTime, ExportError> {
    let datetime = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    datetime
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| ExportError::RowSource(format!("timestamp out of range: {value} {unit:?}")))
}

fn derive_time_from_nanos(n_nanos: i64) -> Result<NaiveTime, ExportError> {
    let n_seconds = u32::try_from(n_nanos.div_euclid(N_NANOS_PER_SECOND)).ok();
    let n_fraction = n_nanos.rem_euclid(N_NANOS_PER_SECOND) as u32;
    n_seconds
        .and_then(|n_seconds| NaiveTime::from_num_seconds_from_midnight_opt(n_seconds, n_fraction))
        .ok_or_else(|| ExportError::RowSource(format!("time out of range: {n_nanos} ns")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Write;

    use polars::prelude::{IpcWriter, NamedFrom, SerWriter, Series};

    use super::*;
    use crate::spec::{EnumBreakField, SpecColumnPlan};

    fn plan(names: &[&str]) -> SpecSheetPlan {
        SpecSheetPlan {
            columns: names
                .iter()
                .map(|name| SpecColumnPlan {
                    name: name.to_string(),
                    heading: name.to_string(),
                    ..Default::default()
                })
                .collect(),
            break_field: EnumBreakField::None,
            names_skipped: vec!["SKIPPED".to_string()],
        }
    }

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("A".into(), ["foo  ", "bar"]).into(),
            Series::new("SKIPPED".into(), [1i32, 2]).into(),
            Series::new("B".into(), [1234.5f64, -7.0]).into(),
            Series::new("C".into(), [Some(20240115i64), None]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_row_source_projects_plan_columns() {
        let df = frame();
        let rows: Vec<_> = DataFrameRowSource::new(&df, &plan(&["A", "B", "C"]))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            rows,
            vec![
                vec![
                    EnumCellValue::Text("foo".to_string()),
                    EnumCellValue::Decimal(1234.5),
                    EnumCellValue::Integer(20240115),
                ],
                vec![
                    EnumCellValue::Text("bar".to_string()),
                    EnumCellValue::Decimal(-7.0),
                    EnumCellValue::Null,
                ],
            ]
        );
    }

    #[test]
    fn test_row_source_missing_column_is_contract_mismatch() {
        let df = frame();
        assert!(matches!(
            DataFrameRowSource::new(&df, &plan(&["A", "MISSING"])),
            Err(ExportError::ContractMismatch(_))
        ));
    }

    #[test]
    fn test_row_source_unknown_column_is_contract_mismatch() {
        let mut plan_no_skip = plan(&["A", "B", "C"]);
        plan_no_skip.names_skipped.clear();
        assert!(matches!(
            DataFrameRowSource::new(&frame(), &plan_no_skip),
            Err(ExportError::ContractMismatch(msg)) if msg.contains("SKIPPED")
        ));
    }

    #[test]
    fn test_row_source_size_hint() {
        let df = frame();
        let mut rows = DataFrameRowSource::new(&df, &plan(&["A"])).unwrap();
        assert_eq!(rows.size_hint(), (2, Some(2)));
        rows.next();
        assert_eq!(rows.n_rows_remaining(), 1);
    }

    #[test]
    fn test_temporal_any_values() {
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Date(19_737)).unwrap(),
            EnumCellValue::NativeDate(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Time(49_501_000_000_000)).unwrap(),
            EnumCellValue::NativeTime(NaiveTime::from_hms_opt(13, 45, 1).unwrap())
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Datetime(
                1_705_311_000_000,
                TimeUnit::Milliseconds,
                None
            ))
            .unwrap(),
            EnumCellValue::NativeTimestamp(
                NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Boolean(true)).unwrap(),
            EnumCellValue::Text("True".to_string())
        );
        assert!(derive_cell_value_from_any_value(AnyValue::Time(-1)).is_err());
    }

    #[test]
    fn test_load_dataframe_ipc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.arrow");
        let mut df = frame();
        let mut file = File::create(&path).unwrap();
        IpcWriter::new(&mut file).finish(&mut df).unwrap();

        let df_loaded = load_dataframe_ipc(&path).unwrap();
        assert_eq!(df_loaded.shape(), (2, 4));

        assert!(matches!(
            load_dataframe_ipc(&dir.path().join("missing.arrow")),
            Err(ExportError::Io { .. })
        ));
    }

    #[test]
    fn test_load_field_metadata_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"[
                {{"name": "ORDNO     ", "digits": 7, "decimal_places": 0, "edit_code": "3 ",
                  "record_text": "Orders break on ORDNO", "headings": ["Order", "", ""]}},
                {{"name": "CUSNAM", "text": "width=30", "byte_length": 30}}
            ]"#
        )
        .unwrap();
        drop(file);

        let l_fields = load_field_metadata_json(&path).unwrap();
        assert_eq!(l_fields.len(), 2);
        assert_eq!(l_fields[0].name, "ORDNO");
        assert_eq!(l_fields[0].edit_code, "3");
        assert_eq!(l_fields[0].digits, Some(7));
        assert_eq!(l_fields[1].digits, None);
        assert_eq!(l_fields[1].numeric_shape(), None);
        assert_eq!(l_fields[1].text, "width=30");

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_field_metadata_json(&path),
            Err(ExportError::MetadataSource(_))
        ));
    }
}
