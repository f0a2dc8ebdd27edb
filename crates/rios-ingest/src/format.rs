//! REDCap data dictionary header checks.

use crate::error::{IngestError, Result};

/// Column every REDCap data dictionary starts with.
pub const REDCAP_FIRST_COLUMN: &str = "variable_field_name";

/// Columns the converter reads on every row.
pub const REDCAP_REQUIRED_COLUMNS: [&str; 4] =
    ["variable_field_name", "form_name", "field_type", "field_label"];

/// Checks that canonical `headers` describe a REDCap data dictionary.
pub fn check_redcap_headers(headers: &[String]) -> Result<()> {
    let first = headers.first().map(String::as_str).unwrap_or("");
    if first != REDCAP_FIRST_COLUMN {
        return Err(IngestError::UnknownFormat {
            expected: REDCAP_FIRST_COLUMN.to_string(),
            found: first.to_string(),
        });
    }
    require_columns(headers, &REDCAP_REQUIRED_COLUMNS)
}

/// Fails with [`IngestError::MissingColumn`] for the first absent column.
pub fn require_columns(headers: &[String], columns: &[&str]) -> Result<()> {
    match columns
        .iter()
        .find(|column| !headers.iter().any(|header| header == *column))
    {
        Some(column) => Err(IngestError::MissingColumn {
            column: (*column).to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_accepts_redcap_headers() {
        let names = headers(&[
            "variable_field_name",
            "form_name",
            "section_header",
            "field_type",
            "field_label",
        ]);
        assert!(check_redcap_headers(&names).is_ok());
    }

    #[test]
    fn test_rejects_wrong_first_column() {
        let names = headers(&["form_name", "variable_field_name"]);
        assert!(matches!(
            check_redcap_headers(&names),
            Err(IngestError::UnknownFormat { found, .. }) if found == "form_name"
        ));
    }

    #[test]
    fn test_reports_missing_column() {
        let names = headers(&["variable_field_name", "form_name", "field_type"]);
        assert!(matches!(
            check_redcap_headers(&names),
            Err(IngestError::MissingColumn { column }) if column == "field_label"
        ));
    }
}
