use thiserror::Error;

/// Errors raised while building or querying RIOS documents.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A field or column refers to a type name the instrument does not define.
    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    /// Named types refer to each other in a cycle.
    #[error("type '{name}' is defined in terms of itself")]
    CyclicType { name: String },

    /// A field id was not found in the instrument record.
    #[error("field '{id}' is not part of the instrument record")]
    UnknownField { id: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
