//! Row stream ingestion for tabular data dictionaries.
//!
//! A [`RecordReader`] reads the header line of a CSV stream, canonicalizes
//! every header, and yields one [`CanonicalRecord`] per data line. Row
//! correlation (pages, matrix groups) is left to the assembler.

mod error;
mod format;
mod reader;
mod record;

pub use error::{IngestError, Result};
pub use format::{
    REDCAP_FIRST_COLUMN, REDCAP_REQUIRED_COLUMNS, check_redcap_headers, require_columns,
};
pub use reader::RecordReader;
pub use record::{CanonicalRecord, RecordSource};
