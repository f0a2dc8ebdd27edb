//! Error types for conversion.
//!
//! Errors come in two tiers. [`RowError`] discards one row (or one question
//! on the way back) and the run continues. [`ConversionError`] aborts the
//! whole run and no document is returned.

use thiserror::Error;

use rios_expr::ExpressionError;
use rios_ingest::IngestError;
use rios_model::{InstrumentReference, ModelError};
use rios_validate::{DocumentKind, ValidationError};

/// Failures mapping a row's field type and metadata into a RIOS type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("unknown REDCap field type '{tag}'")]
    UnknownFieldType { tag: String },

    #[error("malformed choices '{choices}': {reason}")]
    MalformedChoices { choices: String, reason: String },

    #[error("'{value}' is not a valid {base} bound")]
    InvalidBound { value: String, base: String },
}

/// Row-level recoverable failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("row has no variable / field name")]
    MissingFieldId,

    #[error("row has no form name and no page is open")]
    NoPage,

    #[error("identifier '{id}' is already defined")]
    DuplicateId { id: String },

    #[error("matrix group '{group}' resumed after its rows ended")]
    MatrixResumed { group: String },

    #[error("calculation has no expression")]
    EmptyCalculation,

    #[error("calculation rows cannot belong to matrix group '{group}'")]
    MatrixCalculation { group: String },

    #[error("{reason}. Question ignored: {field_id}")]
    UnsupportedMatrix { field_id: String, reason: String },
}

/// Fatal conversion failures.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Header or row stream could not be read.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A Form or CalculationSet does not reference the Instrument.
    #[error("{document} and Instrument do not match: {found} is not {expected}")]
    Relationship {
        document: DocumentKind,
        expected: InstrumentReference,
        found: InstrumentReference,
    },

    #[error("calculation '{id}' is defined more than once")]
    DuplicateCalculation { id: String },

    #[error("{context} {source}")]
    Validation {
        context: String,
        #[source]
        source: ValidationError,
    },

    #[error("failed to write REDCap CSV: {source}")]
    Write {
        #[source]
        source: csv::Error,
    },
}

impl ConversionError {
    pub(crate) fn validation(source: ValidationError) -> Self {
        Self::Validation {
            context: "Validation error:".to_string(),
            source,
        }
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rios_validate::Issue;

    #[test]
    fn test_validation_message_keeps_context() {
        let err = ConversionError::validation(ValidationError::new(
            DocumentKind::Instrument,
            vec![Issue::new("record", "must not be empty")],
        ));
        assert_eq!(
            err.to_string(),
            "Validation error: The supplied RIOS Instrument configuration is invalid: record: must not be empty"
        );
    }

    #[test]
    fn test_relationship_message() {
        let err = ConversionError::Relationship {
            document: DocumentKind::Form,
            expected: InstrumentReference::new("urn:a", "1.0"),
            found: InstrumentReference::new("urn:b", "1.0"),
        };
        assert_eq!(
            err.to_string(),
            "Form and Instrument do not match: urn:b@1.0 is not urn:a@1.0"
        );
    }
}
