//! REDCap data dictionary to RIOS conversion and back.
//!
//! The forward direction reads a CSV row stream and assembles an
//! Instrument, a Form and an optional CalculationSet:
//!
//! 1. **Mapping**: each row's field type becomes a RIOS type and widget
//! 2. **Assembly**: rows are grouped into pages and matrices
//! 3. **Checking**: instrument references are compared and a
//!    [`rios_validate::Validator`] runs over every document
//!
//! The reverse direction walks the Form page by page and writes one REDCap
//! row per question (one per matrix row), followed by the calculations.
//!
//! Row-level problems never abort a run; they are collected in the
//! [`ConversionLog`] of the response.

mod api;
mod assembler;
mod context;
mod document;
mod error;
mod log;
mod mapper;
mod options;
mod reverse;

// === Entry Points ===
pub use api::{convert_records, redcap_file_to_rios, redcap_to_rios, rios_to_redcap};

// === Error Types ===
pub use error::{ConversionError, MappingError, Result, RowError};

// === Options and Responses ===
pub use options::{
    ConversionStats, FromRiosOptions, FromRiosResponse, RiosDocuments, ToRiosOptions,
    ToRiosResponse,
};

// === Logging ===
pub use log::{ConversionLog, LogEntry, LogLevel, SUCCESS_MESSAGE};

// === Building Blocks ===
pub use assembler::PageAssembler;
pub use context::{AssemblerState, ConversionContext, MatrixState};
pub use document::{DocumentAssembler, check_documents, check_relationships};
pub use mapper::{FieldMapping, MappedField, map_record, parse_choices, text_base};
pub use reverse::{CALCULATION_FORM, COLUMNS, ReverseAssembler, type_tuple};
