//! Stateless helper utilities used by the export kernel.

use std::collections::BTreeMap;

use crate::conf::{
    C_LIBRARY_LIST, N_LEN_EXCEL_SHEET_NAME_MAX, N_LEN_TITLE_ROW_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, N_TITLE_ROWS_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::ExportError;

////////////////////////////////////////////////////////////////////////////////
// #region InputValidation

/// `LIBRARY/FILE` pair, both upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecQualifiedName {
    /// Library, or `*LIBL` when none was given.
    pub library: String,
    /// File (table) name.
    pub file: String,
}

/// Parse `FILE` or `LIBRARY/FILE`.
pub fn parse_qualified_name(name: &str) -> Result<SpecQualifiedName, ExportError> {
    let l_parts: Vec<&str> = name.trim().split('/').map(str::trim).collect();
    let (c_library, c_file) = match l_parts.as_slice() {
        [file] => (C_LIBRARY_LIST.to_string(), file.to_uppercase()),
        [library, file] => (library.to_uppercase(), file.to_uppercase()),
        _ => return Err(ExportError::InvalidQualifiedName(name.to_string())),
    };
    if c_library.is_empty() || c_file.is_empty() {
        return Err(ExportError::InvalidQualifiedName(name.to_string()));
    }
    Ok(SpecQualifiedName {
        library: c_library,
        file: c_file,
    })
}

/// Validate free-form title rows against the count and length limits.
pub fn validate_title_rows(title_rows: &[String]) -> Result<(), ExportError> {
    if title_rows.len() > N_TITLE_ROWS_MAX {
        return Err(ExportError::InvalidTitleRows(format!(
            "at most {N_TITLE_ROWS_MAX} title rows are allowed; received {}.",
            title_rows.len()
        )));
    }
    if let Some((n_idx, c_row)) = title_rows
        .iter()
        .enumerate()
        .find(|(_, c_row)| c_row.chars().count() > N_LEN_TITLE_ROW_MAX)
    {
        return Err(ExportError::InvalidTitleRows(format!(
            "title row {} has {} characters; the limit is {N_LEN_TITLE_ROW_MAX}.",
            n_idx + 1,
            c_row.chars().count()
        )));
    }
    Ok(())
}

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(columns: &[&str]) -> Result<(), String> {
    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }
    if dict_pos.len() == columns.len() {
        return Ok(());
    }

    let c_msg = dict_pos
        .iter()
        .filter_map(|(c_name, l_pos)| {
            if l_pos.len() > 1 {
                Some(format!(
                    "{c_name:?} x{} at indices {:?}",
                    l_pos.len(),
                    l_pos
                ))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    Err(format!("Duplicate column names detected: {c_msg}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Cast a zero-based row index, enforcing the Excel row limit.
pub fn cast_row_num(value: usize) -> Result<u32, String> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(format!(
            "row index {value} exceeds the Excel limit of {N_NROWS_EXCEL_MAX} rows"
        ));
    }
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

/// Cast a zero-based column index, enforcing the Excel column limit.
pub fn cast_col_num(value: usize) -> Result<u16, String> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(format!(
            "column index {value} exceeds the Excel limit of {N_NCOLS_EXCEL_MAX} columns"
        ));
    }
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualified_name() {
        assert_eq!(
            parse_qualified_name("mylib/orders").unwrap(),
            SpecQualifiedName {
                library: "MYLIB".to_string(),
                file: "ORDERS".to_string(),
            }
        );
        let spec_name = parse_qualified_name("orders").unwrap();
        assert_eq!(spec_name.library, "*LIBL");
        assert_eq!(spec_name.file, "ORDERS");

        for c_bad in ["a/b/c", "", "lib/", "/file"] {
            assert!(matches!(
                parse_qualified_name(c_bad),
                Err(ExportError::InvalidQualifiedName(_))
            ));
        }
    }

    #[test]
    fn test_validate_title_rows() {
        assert!(validate_title_rows(&[]).is_ok());
        assert!(validate_title_rows(&vec!["x".to_string(); N_TITLE_ROWS_MAX]).is_ok());
        assert!(validate_title_rows(&vec!["x".to_string(); N_TITLE_ROWS_MAX + 1]).is_err());
        assert!(validate_title_rows(&["y".repeat(N_LEN_TITLE_ROW_MAX + 1)]).is_err());
    }

    #[test]
    fn test_validate_unique_columns() {
        assert!(validate_unique_columns(&["A", "B"]).is_ok());
        let c_err = validate_unique_columns(&["A", "B", "A"]).unwrap_err();
        assert!(c_err.contains("\"A\" x2 at indices [0, 2]"));
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("ORD/ERS*", "_"), "ORD_ERS_");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"X".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_cast_indices() {
        assert_eq!(cast_row_num(5), Ok(5));
        assert!(cast_row_num(N_NROWS_EXCEL_MAX).is_err());
        assert_eq!(cast_col_num(3), Ok(3));
        assert!(cast_col_num(N_NCOLS_EXCEL_MAX).is_err());
    }
}
