//! `cpyxlsx_export` v1:
//! Copy a database file into a formatted XLSX worksheet.
//!
//! Module layout:
//! - `conf`       : constants, font metrics and default style presets
//! - `spec`       : specs/models/options/errors
//! - `width`      : autofit width estimation
//! - `numfmt`     : edit code to Excel number-format patterns
//! - `annotation` : directives embedded in field and record text
//! - `classify`   : numeric fields holding dates or times
//! - `plan`       : field metadata to column plan
//! - `sink`       : workbook sink seam and its `rust_xlsxwriter` backend
//! - `writer`     : streaming sheet writer
//! - `source`     : metadata and row sources
//! - `util`       : pure helper functions
//! - `export`     : end-to-end orchestration
pub mod annotation;
pub mod classify;
pub mod conf;
pub mod export;
pub mod numfmt;
pub mod plan;
pub mod sink;
pub mod source;
pub mod spec;
pub mod util;
pub mod width;
pub mod writer;

pub use conf::{
    C_NUM_FORMAT_DATE, C_NUM_FORMAT_TEXT, C_NUM_FORMAT_TIME, C_NUM_FORMAT_TIMESTAMP,
    N_LEN_TITLE_ROW_MAX, N_TITLE_ROWS_MAX, derive_default_export_options,
};
pub use export::{export_table, export_table_from_files};
pub use plan::build_sheet_plan;
pub use sink::{SheetSink, XlsxSheetSink};
pub use source::{DataFrameRowSource, load_dataframe_ipc, load_field_metadata_json};
pub use spec::{
    EnumBreakField, EnumCellStyle, EnumCellValue, ExportError, SpecColumnPlan,
    SpecExportOptions, SpecExportReport, SpecFieldMetadata, SpecSheetPlan,
};
pub use util::{SpecQualifiedName, parse_qualified_name};
pub use writer::{SheetWriter, write_sheet};
