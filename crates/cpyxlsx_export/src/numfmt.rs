//! Excel number-format patterns derived from legacy edit codes.

/// Supported edit codes.
///
/// | code | thousands | minus | literal zero |
/// |------|-----------|-------|--------------|
/// | `1`  | yes       | no    | yes          |
/// | `2`  | yes       | no    | no           |
/// | `3`  | no        | no    | yes          |
/// | `4`  | no        | no    | no           |
/// | `N`  | yes       | yes   | yes          |
/// | `O`  | yes       | yes   | no           |
/// | `P`  | no        | yes   | yes          |
/// | `Q`  | no        | yes   | no           |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumEditCode {
    One,
    Two,
    Three,
    Four,
    N,
    O,
    P,
    Q,
}

impl EnumEditCode {
    /// Parse a one-character edit code, ignoring case.
    pub fn parse(code: &str) -> Option<Self> {
        let mut l_chars = code.chars();
        let (Some(chr), None) = (l_chars.next(), l_chars.next()) else {
            return None;
        };
        match chr.to_ascii_lowercase() {
            '1' => Some(Self::One),
            '2' => Some(Self::Two),
            '3' => Some(Self::Three),
            '4' => Some(Self::Four),
            'n' => Some(Self::N),
            'o' => Some(Self::O),
            'p' => Some(Self::P),
            'q' => Some(Self::Q),
            _ => None,
        }
    }

    /// Negative values carry a leading minus.
    pub fn if_minus_sign(self) -> bool {
        matches!(self, Self::N | Self::O | Self::P | Self::Q)
    }

    /// Integer part is grouped by thousands.
    pub fn if_thousands_separator(self) -> bool {
        matches!(self, Self::One | Self::Two | Self::N | Self::O)
    }

    /// Zero is shown as a literal `0` instead of nothing.
    pub fn if_literal_zero(self) -> bool {
        matches!(self, Self::One | Self::Three | Self::N | Self::P)
    }
}

fn derive_decimals_pattern(decimal_places: u32) -> String {
    if decimal_places == 0 {
        return String::new();
    }
    format!(".{}", "0".repeat(decimal_places as usize))
}

/// Plain fixed-point pattern (`0`, `0.00`, `#,##0.00`, ...).
pub fn derive_default_number_format(decimal_places: u32, if_use_separator: bool) -> String {
    let c_integers = if if_use_separator { "#,##0" } else { "0" };
    format!("{c_integers}{}", derive_decimals_pattern(decimal_places))
}

/// Pattern triple `positive;negative;zero` for an edit code.
///
/// Unknown, blank or multi-character codes fall back to
/// [`derive_default_number_format`] without separators.
pub fn format_for_edit_code(code: &str, decimal_places: u32) -> String {
    let Some(edit_code) = EnumEditCode::parse(code) else {
        return derive_default_number_format(decimal_places, false);
    };

    let c_integers = if edit_code.if_thousands_separator() {
        "#,###"
    } else {
        "#"
    };
    let c_positive = format!("{c_integers}{}", derive_decimals_pattern(decimal_places));
    let c_sign = if edit_code.if_minus_sign() { "-" } else { "" };
    let c_negative = format!("{c_sign}{c_positive}");
    let c_zero = if edit_code.if_literal_zero() {
        // last placeholder becomes a literal zero
        let mut c_zero = c_positive.clone();
        c_zero.pop();
        c_zero.push('0');
        c_zero
    } else {
        String::new()
    };

    [c_positive, c_negative, c_zero].join(";")
}

/// Whether a pattern groups thousands.
pub fn if_uses_thousands_separator(pattern: &str) -> bool {
    pattern.contains(',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_code_parse_is_case_insensitive() {
        assert_eq!(EnumEditCode::parse("n"), Some(EnumEditCode::N));
        assert_eq!(EnumEditCode::parse("Q"), Some(EnumEditCode::Q));
        assert_eq!(EnumEditCode::parse("5"), None);
        assert_eq!(EnumEditCode::parse(""), None);
        assert_eq!(EnumEditCode::parse(" "), None);
        assert_eq!(EnumEditCode::parse("12"), None);
    }

    #[test]
    fn test_edit_code_1_with_decimals() {
        let pattern = format_for_edit_code("1", 2);
        assert_eq!(pattern, "#,###.00;#,###.00;#,###.00");
        assert!(if_uses_thousands_separator(&pattern));
    }

    #[test]
    fn test_edit_code_q_has_minus_and_no_zero_branch() {
        assert_eq!(format_for_edit_code("Q", 0), "#;-#;");
        assert_eq!(format_for_edit_code("q", 1), "#.0;-#.0;");
    }

    #[test]
    fn test_edit_code_literal_zero_replaces_last_placeholder() {
        assert_eq!(format_for_edit_code("3", 0), "#;#;0");
        assert_eq!(format_for_edit_code("N", 0), "#,###;-#,###;#,##0");
        assert_eq!(format_for_edit_code("P", 3), "#.000;-#.000;#.000");
    }

    #[test]
    fn test_edit_codes_without_zero_branch() {
        assert_eq!(format_for_edit_code("2", 0), "#,###;#,###;");
        assert_eq!(format_for_edit_code("4", 2), "#.00;#.00;");
        assert_eq!(format_for_edit_code("o", 2), "#,###.00;-#,###.00;");
    }

    #[test]
    fn test_unknown_edit_code_falls_back_to_fixed_point() {
        assert_eq!(format_for_edit_code("", 0), "0");
        assert_eq!(format_for_edit_code("Z", 2), "0.00");
        assert_eq!(format_for_edit_code("1A", 1), "0.0");
        assert!(!if_uses_thousands_separator(&format_for_edit_code("X", 2)));
    }

    #[test]
    fn test_default_number_format() {
        assert_eq!(derive_default_number_format(0, false), "0");
        assert_eq!(derive_default_number_format(2, true), "#,##0.00");
    }
}
