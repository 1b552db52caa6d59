//! End-to-end export of one table into one workbook.

use std::path::Path;

use polars::prelude::DataFrame;
use rust_xlsxwriter::Workbook;

use crate::plan::build_sheet_plan;
use crate::sink::{XlsxSheetSink, derive_xlsx_export_error};
use crate::source::{DataFrameRowSource, load_dataframe_ipc, load_field_metadata_json};
use crate::spec::{ExportError, SpecExportOptions, SpecExportReport, SpecFieldMetadata};
use crate::util::{parse_qualified_name, sanitize_sheet_name, validate_title_rows};
use crate::writer::write_sheet;

/// Export `df` as one worksheet into a new workbook at `path_file_out`.
///
/// Parameters are validated before the output is created. On failure any
/// file already at `path_file_out` is left as it was.
pub fn export_table(
    qualified_name: &str,
    fields: &[SpecFieldMetadata],
    df: &DataFrame,
    path_file_out: &Path,
    options: &SpecExportOptions,
) -> Result<SpecExportReport, ExportError> {
    let spec_name = parse_qualified_name(qualified_name)?;
    validate_title_rows(&options.title_rows)?;
    tracing::info!("Parameters checked.");

    let plan = build_sheet_plan(fields)?;
    let rows = DataFrameRowSource::new(df, &plan)?;
    tracing::info!("Opened {}/{} for reading.", spec_name.library, spec_name.file);

    let c_sheet_name = sanitize_sheet_name(
        options.sheet_name.as_deref().unwrap_or(&spec_name.file),
        "_",
    );
    let mut sink = XlsxSheetSink::new(&c_sheet_name)?;
    let report = write_sheet(&mut sink, &plan, &options.title_rows, rows)?;

    let mut workbook = Workbook::new();
    workbook.push_worksheet(sink.into_worksheet());
    workbook
        .save(path_file_out)
        .map_err(derive_xlsx_export_error)?;
    tracing::info!("File copied to {}.", path_file_out.display());

    Ok(report)
}

/// [`export_table`] with metadata from a JSON file and rows from an IPC file.
pub fn export_table_from_files(
    qualified_name: &str,
    path_metadata: &Path,
    path_data: &Path,
    path_file_out: &Path,
    options: &SpecExportOptions,
) -> Result<SpecExportReport, ExportError> {
    // name errors must surface before any input is opened
    parse_qualified_name(qualified_name)?;
    let l_fields = load_field_metadata_json(path_metadata)?;
    let df = load_dataframe_ipc(path_data)?;
    export_table(qualified_name, &l_fields, &df, path_file_out, options)
}

#[cfg(test)]
mod tests {
    use polars::prelude::{NamedFrom, Series};

    use super::*;

    fn fields() -> Vec<SpecFieldMetadata> {
        vec![
            SpecFieldMetadata {
                name: "CUSNAM".to_string(),
                byte_length: 30,
                record_text: "Orders break on REGION".to_string(),
                headings: vec!["Customer".to_string(), "Name".to_string(), String::new()],
                ..Default::default()
            },
            SpecFieldMetadata {
                name: "REGION".to_string(),
                digits: Some(3),
                edit_code: "4".to_string(),
                ..Default::default()
            },
            SpecFieldMetadata {
                name: "AMOUNT".to_string(),
                digits: Some(11),
                decimal_places: 2,
                edit_code: "N".to_string(),
                ..Default::default()
            },
            SpecFieldMetadata {
                name: "ORDDTE".to_string(),
                digits: Some(8),
                edit_word: "'    /  /  '".to_string(),
                ..Default::default()
            },
            SpecFieldMetadata {
                name: "INTERNAL".to_string(),
                headings: vec!["*SKIP".to_string()],
                ..Default::default()
            },
        ]
    }

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("CUSNAM".into(), ["Acme  ", "Globex", "Initech"]).into(),
            Series::new("REGION".into(), [1i64, 1, 2]).into(),
            Series::new("AMOUNT".into(), [1234.5f64, -7.0, 0.0]).into(),
            Series::new("ORDDTE".into(), [20240115i64, 0, 20231231]).into(),
            Series::new("INTERNAL".into(), ["x", "y", "z"]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_export_table_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path_out = dir.path().join("orders.xlsx");
        let options = SpecExportOptions {
            title_rows: vec!["Open orders".to_string()],
            ..Default::default()
        };

        let report = export_table("sales/orders", &fields(), &frame(), &path_out, &options)
            .unwrap();

        assert!(std::fs::metadata(&path_out).unwrap().len() > 0);
        assert_eq!(report.n_row_header, 2);
        assert_eq!(report.n_rows_data, 3);
        assert_eq!(report.n_rows_break, 1);
        assert_eq!(report.widths.len(), 4);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_parameter_errors_leave_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let path_out = dir.path().join("orders.xlsx");

        assert!(matches!(
            export_table(
                "a/b/c",
                &fields(),
                &frame(),
                &path_out,
                &SpecExportOptions::default()
            ),
            Err(ExportError::InvalidQualifiedName(_))
        ));
        let options = SpecExportOptions {
            title_rows: vec!["t".repeat(201)],
            ..Default::default()
        };
        assert!(matches!(
            export_table("orders", &fields(), &frame(), &path_out, &options),
            Err(ExportError::InvalidTitleRows(_))
        ));
        assert!(!path_out.exists());
    }

    #[test]
    fn test_missing_data_column_is_contract_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path_out = dir.path().join("orders.xlsx");
        let df = frame().drop("AMOUNT").unwrap();
        assert!(matches!(
            export_table(
                "orders",
                &fields(),
                &df,
                &path_out,
                &SpecExportOptions::default()
            ),
            Err(ExportError::ContractMismatch(_))
        ));
        assert!(!path_out.exists());
    }

    #[test]
    fn test_unknown_data_column_is_contract_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path_out = dir.path().join("orders.xlsx");
        let mut df = frame();
        df.with_column(Series::new("NOT_IN_METADATA".into(), [1i32, 2, 3]))
            .unwrap();
        assert!(matches!(
            export_table(
                "orders",
                &fields(),
                &df,
                &path_out,
                &SpecExportOptions::default()
            ),
            Err(ExportError::ContractMismatch(msg)) if msg.contains("NOT_IN_METADATA")
        ));
        assert!(!path_out.exists());
    }

    #[test]
    fn test_export_from_files_reports_missing_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_table_from_files(
            "orders",
            &dir.path().join("fields.json"),
            &dir.path().join("orders.arrow"),
            &dir.path().join("orders.xlsx"),
            &SpecExportOptions::default(),
        );
        assert!(matches!(result, Err(ExportError::Io { .. })));
    }
}
