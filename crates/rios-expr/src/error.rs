use thiserror::Error;

/// Expression rewriting failures. Recoverable per row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("invalid expression fragment '{fragment}' in '{expression}': {reason}")]
    ValueExpression {
        fragment: String,
        expression: String,
        reason: String,
    },
}

impl ExpressionError {
    pub(crate) fn value(
        fragment: impl Into<String>,
        expression: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValueExpression {
            fragment: fragment.into(),
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// The offending substring.
    pub fn fragment(&self) -> &str {
        match self {
            Self::ValueExpression { fragment, .. } => fragment,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExpressionError>;
