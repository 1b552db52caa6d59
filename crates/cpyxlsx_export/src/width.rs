//! Autofit width model for Calibri 11.
//!
//! Widths are measured in pixels from the glyph tables in [`crate::conf`] and
//! converted to Excel column-width units the way Excel's own autofit does,
//! including its one-pixel corrections on wider columns.

use crate::conf::{
    F_PIXELS_CELL_PADDING, F_PIXELS_FIRST_UNIT, F_PIXELS_FUDGE_FIRST, F_PIXELS_FUDGE_SECOND,
    F_PIXELS_PER_UNIT, F_PIXELS_UNIT_OFFSET, F_WIDTH_COLUMN_MIN, TUP_GLYPH_GROUPS_BOLD,
    TUP_GLYPH_GROUPS_REGULAR, convert_glyph_units_to_pixels,
};

/// Shape of a number as it would be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecNumberAnalysis {
    /// Integer digits plus decimal places.
    pub n_digits: u32,
    /// Thousands separators in the integer part.
    pub n_thousands: u32,
    /// Decimal point shown.
    pub if_has_point: bool,
    /// Minus sign shown.
    pub if_has_sign: bool,
}

/// Pixel width of one character.
pub fn derive_char_pixels(chr: char, if_bold: bool) -> f64 {
    let l_groups: &[(&str, f64)] = if if_bold {
        &TUP_GLYPH_GROUPS_BOLD
    } else {
        &TUP_GLYPH_GROUPS_REGULAR
    };
    let n_units = l_groups
        .iter()
        .find(|(c_group, _)| c_group.contains(chr))
        .or_else(|| l_groups.iter().find(|(c_group, _)| c_group.contains('0')))
        .map_or(0.0, |(_, n_units)| *n_units);
    convert_glyph_units_to_pixels(n_units)
}

/// Convert a pixel width to Excel column-width units.
pub fn convert_pixels_to_width(pixels: f64) -> f64 {
    let mut n_pixels = pixels;
    if n_pixels > F_PIXELS_FUDGE_FIRST {
        n_pixels -= 1.0;
    }
    if n_pixels > F_PIXELS_FUDGE_SECOND {
        n_pixels -= 1.0;
    }
    if n_pixels < F_PIXELS_FIRST_UNIT {
        return n_pixels / F_PIXELS_FIRST_UNIT;
    }
    (n_pixels - F_PIXELS_UNIT_OFFSET) / F_PIXELS_PER_UNIT
}

/// Autofit width of text.
pub fn estimate_text_width(text: &str, if_bold: bool) -> f64 {
    let n_pixels = F_PIXELS_CELL_PADDING
        + text
            .chars()
            .map(|chr| derive_char_pixels(chr, if_bold))
            .sum::<f64>();
    f64::max(F_WIDTH_COLUMN_MIN, convert_pixels_to_width(n_pixels))
}

/// Digits of the integer part of a non-negative integer (`0` has one).
pub fn count_integer_digits(n: u64) -> u32 {
    if n == 0 {
        return 1;
    }
    n.ilog10() + 1
}

/// Break a number into the pieces that drive its displayed width.
///
/// Integer digits are counted from `floor(|n|)`; the decimal point is only
/// reported through `if_has_point`.
pub fn analyze_number(n: f64, decimal_places: u32) -> SpecNumberAnalysis {
    let n_integer_digits = count_integer_digits(n.abs().floor() as u64);
    SpecNumberAnalysis {
        n_digits: n_integer_digits + decimal_places,
        n_thousands: (n_integer_digits - 1) / 3,
        if_has_point: decimal_places > 0,
        if_has_sign: n < 0.0,
    }
}

/// Autofit width of a number displayed with fixed decimals.
///
/// Digits and separators have the same width in bold, so the regular table
/// is used throughout.
pub fn estimate_number_width(n: f64, decimal_places: u32, if_use_separator: bool) -> f64 {
    let analysis = analyze_number(n, decimal_places);
    let mut n_pixels =
        F_PIXELS_CELL_PADDING + f64::from(analysis.n_digits) * derive_char_pixels('0', false);
    if if_use_separator {
        n_pixels += f64::from(analysis.n_thousands) * derive_char_pixels(',', false);
    }
    if analysis.if_has_point {
        n_pixels += derive_char_pixels('.', false);
    }
    if analysis.if_has_sign {
        n_pixels += derive_char_pixels('-', false);
    }
    f64::max(F_WIDTH_COLUMN_MIN, convert_pixels_to_width(n_pixels))
}

fn derive_am_pm_pixels() -> f64 {
    f64::max(derive_char_pixels('A', false), derive_char_pixels('P', false))
        + derive_char_pixels('M', false)
}

/// Width reserved for an 8-digit date with two separators.
pub fn estimate_date_width() -> f64 {
    let n_pixels = F_PIXELS_CELL_PADDING
        + 8.0 * derive_char_pixels('0', false)
        + 2.0 * derive_char_pixels('/', false);
    convert_pixels_to_width(n_pixels)
}

/// Width reserved for an `h:mm:ss AM` time.
pub fn estimate_time_width() -> f64 {
    let n_pixels = F_PIXELS_CELL_PADDING
        + 6.0 * derive_char_pixels('0', false)
        + 2.0 * derive_char_pixels(':', false)
        + derive_char_pixels(' ', false)
        + derive_am_pm_pixels();
    convert_pixels_to_width(n_pixels)
}

/// Width reserved for an `m/d/yy h:mm:ss AM` timestamp.
pub fn estimate_timestamp_width() -> f64 {
    let n_pixels = F_PIXELS_CELL_PADDING
        + 12.0 * derive_char_pixels('0', false)
        + 2.0 * derive_char_pixels('/', false)
        + 2.0 * derive_char_pixels(':', false)
        + 2.0 * derive_char_pixels(' ', false)
        + derive_am_pm_pixels();
    convert_pixels_to_width(n_pixels)
}
