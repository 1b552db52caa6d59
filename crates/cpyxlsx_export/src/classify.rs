//! Detection of dates and times stored in plain numeric fields.

use crate::spec::{EnumTemporalKind, SpecNumericShape};

/// Edit words of `YYYY-MM-DD` / `YYYY/MM/DD` numeric dates.
pub const TUP_EDIT_WORDS_DATE: [&str; 2] = ["'    -  -  '", "'    /  /  '"];
/// Edit words of `HH.MM.SS` / `HH:MM:SS` numeric times.
pub const TUP_EDIT_WORDS_TIME: [&str; 2] = ["'  .  .  '", "'  :  :  '"];

const SHAPE_DATE: SpecNumericShape = SpecNumericShape {
    digits: 8,
    decimal_places: 0,
};
const SHAPE_TIME: SpecNumericShape = SpecNumericShape {
    digits: 6,
    decimal_places: 0,
};

/// Classify a numeric field as a disguised date, time, or neither.
///
/// Only the shape and the edit word are consulted. Trailing blanks of the
/// edit word are ignored, since fixed-length metadata columns pad with them.
pub fn classify_numeric_temporal(
    shape: Option<SpecNumericShape>,
    edit_word: &str,
) -> EnumTemporalKind {
    let Some(shape) = shape else {
        return EnumTemporalKind::None;
    };
    let c_edit_word = edit_word.trim_end();
    if shape == SHAPE_DATE && TUP_EDIT_WORDS_DATE.contains(&c_edit_word) {
        return EnumTemporalKind::Date;
    }
    if shape == SHAPE_TIME && TUP_EDIT_WORDS_TIME.contains(&c_edit_word) {
        return EnumTemporalKind::Time;
    }
    EnumTemporalKind::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(digits: u32, decimal_places: u32) -> Option<SpecNumericShape> {
        Some(SpecNumericShape {
            digits,
            decimal_places,
        })
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(
            classify_numeric_temporal(shape(8, 0), "'    -  -  '"),
            EnumTemporalKind::Date
        );
        assert_eq!(
            classify_numeric_temporal(shape(8, 0), "'    /  /  '"),
            EnumTemporalKind::Date
        );
        assert_eq!(
            classify_numeric_temporal(shape(8, 0), "'xx-xx-xx'"),
            EnumTemporalKind::None
        );
        assert_eq!(
            classify_numeric_temporal(shape(8, 2), "'    -  -  '"),
            EnumTemporalKind::None
        );
    }

    #[test]
    fn test_numeric_times() {
        assert_eq!(
            classify_numeric_temporal(shape(6, 0), "'  :  :  '"),
            EnumTemporalKind::Time
        );
        assert_eq!(
            classify_numeric_temporal(shape(6, 0), "'  .  .  '   "),
            EnumTemporalKind::Time
        );
        assert_eq!(
            classify_numeric_temporal(shape(7, 0), "'  :  :  '"),
            EnumTemporalKind::None
        );
        assert_eq!(
            classify_numeric_temporal(shape(6, 0), "'    -  -  '"),
            EnumTemporalKind::None
        );
    }

    #[test]
    fn test_character_fields_are_never_temporal() {
        assert_eq!(
            classify_numeric_temporal(None, "'    -  -  '"),
            EnumTemporalKind::None
        );
    }
}
