//! Error types for row stream ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a tabular data dictionary.
///
/// All variants are fatal for the conversion: without a readable header the
/// row stream cannot be interpreted.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input file could not be opened.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header row is missing or holds no names.
    #[error("header row is empty")]
    EmptyHeader,

    /// The header row could not be decoded.
    #[error("header row is unreadable: {source}")]
    UnreadableHeader {
        #[source]
        source: csv::Error,
    },

    /// A data line is not valid CSV.
    #[error("CSV syntax error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// A column the dialect requires is absent.
    #[error("required column '{column}' not found")]
    MissingColumn { column: String },

    /// The header row does not look like the expected dialect.
    #[error("Input has unknown format: expected first column '{expected}', found '{found}'")]
    UnknownFormat { expected: String, found: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
