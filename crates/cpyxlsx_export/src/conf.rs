//! Export constants, font metric tables and default style presets.

use std::collections::BTreeMap;

use crate::spec::{SpecCellFormat, SpecExportOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Maximum number of free-form title rows above the header.
pub const N_TITLE_ROWS_MAX: usize = 38;
/// Maximum length (in characters) of one title row.
pub const N_LEN_TITLE_ROW_MAX: usize = 200;

/// Library placeholder used when a qualified name carries no library part.
pub const C_LIBRARY_LIST: &str = "*LIBL";

////////////////////////////////////////////////////////////////////////////////
// #region FontMetrics

// Empirical Calibri 11 glyph widths, in 1/28 pixel units. Characters missing
// from a table are measured as the digit `0`.
const N_GLYPH_UNITS_PER_PIXEL: f64 = 28.0;

/// Regular-weight glyph groups `(characters, width in 1/28 px)`.
pub const TUP_GLYPH_GROUPS_REGULAR: [(&str, f64); 11] = [
    ("0123456789agkvxyEFSTYZ#$*+<=>?^_|~", 203.01),
    ("bdehnopquBCKPRX", 232.01),
    ("cszL\"/\\", 174.01),
    ("frtJ!()-[]{}", 145.01),
    ("ijlI,.:;`", 116.01),
    ("mM", 348.01),
    ("w%", 319.01),
    ("ADGHUV", 261.01),
    ("NOQ&", 290.01),
    ("W@", 377.01),
    ("' ", 87.01),
];

/// Bold glyph groups `(characters, width in 1/28 px)`.
pub const TUP_GLYPH_GROUPS_BOLD: [(&str, f64); 12] = [
    ("0123456789agkvxyEFSTZ\"#$*+<=>?^_|~", 203.01),
    ("bdehnopquBCKPRXY", 232.01),
    ("cszL/\\", 174.01),
    ("frtJ!()-[]`{}", 145.01),
    ("ijlI',.:;", 116.01),
    ("m", 348.01),
    ("w%&", 319.01),
    ("ADHV", 261.01),
    ("GNOQU", 290.01),
    ("M@", 377.01),
    ("W", 406.01),
    (" ", 87.01),
];

/// Cell padding added to every measured value, in pixels.
pub const F_PIXELS_CELL_PADDING: f64 = 7.0;
/// Past this many pixels autofit drops one pixel.
pub const F_PIXELS_FUDGE_FIRST: f64 = 34.0;
/// Past this many pixels (after the first drop) autofit drops another one.
pub const F_PIXELS_FUDGE_SECOND: f64 = 62.0;
/// Pixel span of the first column-width unit.
pub const F_PIXELS_FIRST_UNIT: f64 = 12.0;
/// Pixel span of each further column-width unit.
pub const F_PIXELS_PER_UNIT: f64 = 7.0;
/// Pixel offset subtracted before the 7-pixel regime.
pub const F_PIXELS_UNIT_OFFSET: f64 = 5.0;
/// Smallest width ever reported, i.e. the padding of an empty cell.
pub const F_WIDTH_COLUMN_MIN: f64 = F_PIXELS_CELL_PADDING / F_PIXELS_FIRST_UNIT;

/// Convert a table entry to pixels.
pub(crate) const fn convert_glyph_units_to_pixels(units: f64) -> f64 {
    units / N_GLYPH_UNITS_PER_PIXEL
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StylePresets

/// Display pattern for native and decoded dates.
pub const C_NUM_FORMAT_DATE: &str = "m/d/yyyy";
/// Display pattern for native and decoded times.
pub const C_NUM_FORMAT_TIME: &str = "h:mm:ss AM/PM";
/// Display pattern for native timestamps.
pub const C_NUM_FORMAT_TIMESTAMP: &str = "m/d/yy h:mm:ss AM/PM";
/// Text-forcing display pattern.
pub const C_NUM_FORMAT_TEXT: &str = "@";

/// Canonical fixed style keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumFmtKey {
    /// Free-form title rows above the header.
    Title,
    /// Column heading cells.
    Header,
    /// Date cells.
    Date,
    /// Time cells.
    Time,
    /// Timestamp cells.
    Timestamp,
    /// Character data forced to text.
    Text,
    /// Wrapped cells without a number format.
    Wrapped,
}

/// Build the fixed style presets used by the sheet sink.
pub fn derive_default_xlsx_formats() -> BTreeMap<EnumFmtKey, SpecCellFormat> {
    let cfg_title_fmt_spec = SpecCellFormat {
        bold: Some(true),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        EnumFmtKey::Header,
        cfg_title_fmt_spec.with_(SpecCellFormat {
            text_wrap: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(EnumFmtKey::Title, cfg_title_fmt_spec);
    dict_fmt.insert(
        EnumFmtKey::Date,
        SpecCellFormat::from_num_format(C_NUM_FORMAT_DATE),
    );
    dict_fmt.insert(
        EnumFmtKey::Time,
        SpecCellFormat::from_num_format(C_NUM_FORMAT_TIME),
    );
    dict_fmt.insert(
        EnumFmtKey::Timestamp,
        SpecCellFormat::from_num_format(C_NUM_FORMAT_TIMESTAMP),
    );
    dict_fmt.insert(
        EnumFmtKey::Text,
        SpecCellFormat::from_num_format(C_NUM_FORMAT_TEXT),
    );
    dict_fmt.insert(
        EnumFmtKey::Wrapped,
        SpecCellFormat {
            text_wrap: Some(true),
            ..Default::default()
        },
    );

    dict_fmt
}

/// Build default export options.
pub fn derive_default_export_options() -> SpecExportOptions {
    SpecExportOptions::default()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
