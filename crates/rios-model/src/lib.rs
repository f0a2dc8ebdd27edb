//! RIOS document model.
//!
//! This crate defines the three RIOS documents produced and consumed by the
//! conversion pipeline:
//!
//! - **Instrument**: field definitions (`record`) and named types
//! - **Form**: pages of header, text, and question elements
//! - **CalculationSet**: derived values computed from instrument fields
//!
//! Documents serialize with RIOS member names (`fieldId`,
//! `defaultLocalization`, ...) and omit empty optional members, so the
//! output of `serde_json` / `serde_yaml` is a valid RIOS definition.
//!
//! The [`naming`] module holds the canonicalizer shared by the ingest and
//! expression crates.

mod calculation;
mod error;
mod form;
mod instrument;
mod localization;
mod types;

pub mod naming;

// === Error Types ===
pub use error::{ModelError, Result};

// === Documents ===
pub use calculation::{Calculation, CalculationOptions, CalculationSet};
pub use form::{
    Descriptor, Element, Event, EventAction, Form, Page, Question, TextOptions, Widget,
    WidgetType,
};
pub use instrument::{Field, Instrument, InstrumentReference};

// === Types ===
pub use types::{
    BaseType, Bound, BoundConstraint, Column, Enumeration, EnumerationCollection, FieldType,
    Row, TypeObject,
};

// === Localization ===
pub use localization::{DEFAULT_LOCALIZATION, LocalizedString};

/// Default instrument version used when the caller supplies none.
pub const DEFAULT_VERSION: &str = "1.0";
