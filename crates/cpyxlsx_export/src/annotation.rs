//! Formatting directives embedded in field and record text.
//!
//! Field text may contain, anywhere and in any order:
//! - `format="<excel pattern>"`
//! - `width=<n>` with `n >= 1`
//! - `wrap=on` or `wrap=*on`
//! - `zero=blank` (also `zeros`, `zeroes`, `blanks`)
//!
//! Record text may contain `break on <field>`. Matching ignores case.

use std::sync::LazyLock;

use regex::Regex;

use crate::spec::{EnumBreakField, SpecFieldAnnotations};

static RE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)format="(.*)""#).expect("valid format regex"));
static RE_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)width=([1-9][0-9]*)").expect("valid width regex"));
static RE_WRAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wrap=\*?on").expect("valid wrap regex"));
static RE_ZERO_BLANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)zero(?:s|es)?=blanks?").expect("valid zero regex"));
static RE_BREAK_ON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)break on (\S+)").expect("valid break regex"));

/// Extract field-level directives.
pub fn parse_field_text(text: &str) -> SpecFieldAnnotations {
    let format_override = RE_FORMAT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    // out-of-range widths are ignored rather than clamped
    let width_override = RE_WIDTH
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    SpecFieldAnnotations {
        format_override,
        width_override,
        if_wrap: RE_WRAP.is_match(text),
        if_blank_on_zero: RE_ZERO_BLANK.is_match(text),
    }
}

/// Extract the upper-cased `break on` token from record text.
pub fn parse_record_text(text: &str) -> Option<String> {
    RE_BREAK_ON
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

/// Resolve record text to a break field known to the sheet.
pub fn resolve_break_field<S: AsRef<str>>(text: &str, names_known: &[S]) -> EnumBreakField {
    match parse_record_text(text) {
        Some(name) if names_known.iter().any(|known| known.as_ref() == name) => {
            EnumBreakField::Named(name)
        }
        Some(name) => {
            tracing::warn!("break field {name:?} is not a column of this sheet; ignoring it");
            EnumBreakField::None
        }
        None => EnumBreakField::None,
    }
}
