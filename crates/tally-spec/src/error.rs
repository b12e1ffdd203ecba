//! Error types for building and translating specifications.

use thiserror::Error;

/// Errors raised while constructing conditions or translating specifications.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Input rejected at construction time (empty or unknown field, etc).
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Operator is not valid for the given operand type.
    #[error("operator '{op}' is not valid for {operand_type} operands")]
    InvalidOperatorForType {
        op: &'static str,
        operand_type: &'static str,
    },

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A closure leaf was reached during translation.
    ///
    /// Closure predicates can only be evaluated in memory.
    #[error("predicate '{name}' cannot be translated into an expression")]
    UnsupportedPredicate { name: String },
}

impl SpecError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SpecError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Result type for specification operations.
pub type Result<T> = std::result::Result<T, SpecError>;
