use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// RIOS document kind named in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    Instrument,
    Form,
    CalculationSet,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Instrument => "Instrument",
            Self::Form => "Form",
            Self::CalculationSet => "CalculationSet",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Location of the offending member, e.g. `record[2].id`.
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Structured validation failure for one document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("The supplied RIOS {document} configuration is invalid: {}", join_issues(.issues))]
pub struct ValidationError {
    pub document: DocumentKind,
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(document: DocumentKind, issues: Vec<Issue>) -> Self {
        Self { document, issues }
    }

    /// `Ok(())` when `issues` is empty.
    pub fn check(document: DocumentKind, issues: Vec<Issue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self::new(document, issues))
        }
    }
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_lists_issues() {
        let err = ValidationError::new(
            DocumentKind::Form,
            vec![Issue::new("pages", "must not be empty"), Issue::new("", "bad")],
        );
        assert_eq!(
            err.to_string(),
            "The supplied RIOS Form configuration is invalid: pages: must not be empty; bad"
        );
    }

    #[test]
    fn test_check_passes_without_issues() {
        assert!(ValidationError::check(DocumentKind::Instrument, Vec::new()).is_ok());
    }
}
