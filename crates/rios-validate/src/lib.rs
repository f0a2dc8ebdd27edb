//! Validation of RIOS documents.
//!
//! Conversion delegates document correctness to a [`Validator`]. The
//! [`StructuralValidator`] checks identifiers, type shapes, cross-document
//! references, and form/instrument consistency; a full JSON-schema
//! validator can be plugged in through the same trait.

mod error;
mod structural;
mod validator;

pub use error::{DocumentKind, Issue, ValidationError};
pub use structural::StructuralValidator;
pub use validator::Validator;
