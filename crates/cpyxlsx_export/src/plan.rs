//! Column plan builder.
//!
//! Turns field-description records into one [`SpecColumnPlan`] per emitted
//! column. Each record is processed as follows:
//! 1. On the first record only, resolve the break field from record text.
//! 2. Resolve the heading; `*SKIP` drops the field, `*BLANK(S)` empties it.
//! 3. Record decimal places of numeric fields.
//! 4. Resolve the number format: `format="..."` wins over the edit code.
//! 5. Flag disguised numeric dates and times.
//! 6. Apply width, wrap and zero-suppression directives.

use crate::annotation::{parse_field_text, resolve_break_field};
use crate::classify::classify_numeric_temporal;
use crate::numfmt::{EnumEditCode, format_for_edit_code, if_uses_thousands_separator};
use crate::spec::{
    EnumBreakField, EnumTemporalKind, ExportError, SpecColumnPlan, SpecFieldMetadata,
    SpecSheetPlan,
};
use crate::util::validate_unique_columns;

/// Heading of a field after the special values are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumHeading {
    /// Emit the column with this heading.
    Text(String),
    /// Leave the field out of the sheet.
    Skip,
}

/// Resolve up to three raw heading lines.
///
/// Non-empty lines are trimmed and joined by one space. An empty result falls
/// back to the field name.
pub fn derive_heading<S: AsRef<str>>(heading_lines: &[S], field_name: &str) -> EnumHeading {
    let c_heading = heading_lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    match c_heading.to_uppercase().as_str() {
        "" => EnumHeading::Text(field_name.to_string()),
        "*SKIP" => EnumHeading::Skip,
        "*BLANK" | "*BLANKS" => EnumHeading::Text(String::new()),
        _ => EnumHeading::Text(c_heading),
    }
}

/// Build the sheet plan from field records in definition order.
///
/// Trailing blanks of every text attribute are ignored. The result depends on
/// `fields` only; building twice yields equal plans.
pub fn build_sheet_plan(fields: &[SpecFieldMetadata]) -> Result<SpecSheetPlan, ExportError> {
    let fields: Vec<SpecFieldMetadata> =
        fields.iter().map(SpecFieldMetadata::trim_padding).collect();
    let l_names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    validate_unique_columns(&l_names).map_err(ExportError::MetadataSource)?;

    let l_headings: Vec<EnumHeading> = fields
        .iter()
        .map(|f| derive_heading(&f.headings, &f.name))
        .collect();
    let l_names_emitted: Vec<&str> = fields
        .iter()
        .zip(&l_headings)
        .filter(|(_, heading)| !matches!(heading, EnumHeading::Skip))
        .map(|(f, _)| f.name.as_str())
        .collect();

    let mut break_field = EnumBreakField::Unresolved;
    let mut l_columns = Vec::with_capacity(l_names_emitted.len());
    let mut l_names_skipped = Vec::new();

    for (field, heading) in fields.iter().zip(l_headings) {
        if break_field == EnumBreakField::Unresolved {
            break_field = resolve_break_field(&field.record_text, &l_names_emitted);
        }

        let EnumHeading::Text(c_heading) = heading else {
            tracing::debug!("skipping field {}", field.name);
            l_names_skipped.push(field.name.clone());
            continue;
        };

        let column = build_column_plan(field, c_heading);
        tracing::debug!(?column, "resolved column plan");
        l_columns.push(column);
    }

    if break_field == EnumBreakField::Unresolved {
        break_field = EnumBreakField::None;
    }

    tracing::info!(
        n_fields = fields.len(),
        n_columns = l_columns.len(),
        break_field = break_field.name().unwrap_or("<none>"),
        "built sheet plan"
    );

    Ok(SpecSheetPlan {
        columns: l_columns,
        break_field,
        names_skipped: l_names_skipped,
    })
}

fn build_column_plan(field: &SpecFieldMetadata, heading: String) -> SpecColumnPlan {
    let shape = field.numeric_shape();
    let annotations = parse_field_text(&field.text);

    let number_format = match (&annotations.format_override, shape) {
        (Some(c_pattern), _) => Some(c_pattern.clone()),
        (None, Some(shape)) => {
            if EnumEditCode::parse(&field.edit_code).is_none() && !field.edit_code.trim().is_empty()
            {
                tracing::warn!(
                    "field {}: unsupported edit code {:?}; using plain fixed-point format",
                    field.name,
                    field.edit_code
                );
            }
            Some(format_for_edit_code(&field.edit_code, shape.decimal_places))
        }
        (None, None) => None,
    };
    let temporal = classify_numeric_temporal(shape, &field.edit_word);

    SpecColumnPlan {
        name: field.name.clone(),
        heading,
        if_uses_thousands_separator: number_format
            .as_deref()
            .is_some_and(if_uses_thousands_separator),
        number_format,
        decimal_places: shape.map(|s| s.decimal_places),
        if_is_numeric_date: temporal == EnumTemporalKind::Date,
        if_is_numeric_time: temporal == EnumTemporalKind::Time,
        width_explicit: annotations.width_override.map(f64::from),
        if_wrap: annotations.if_wrap,
        if_blank_on_zero: annotations.if_blank_on_zero,
    }
}
