//! Error types for SQL lowering.

use tally_spec::SpecError;
use thiserror::Error;

use crate::options::Dialect;

#[derive(Debug, Error)]
pub enum SqlError {
    /// Strict mode is on and the field has no column mapping.
    #[error("no column mapped for field '{field}'")]
    UnknownField { field: String },

    /// The dialect has no rendering for this operator.
    #[error("operator '{op}' is not supported by {dialect}")]
    UnsupportedOperator { op: &'static str, dialect: Dialect },

    #[error(transparent)]
    Spec(#[from] SpecError),
}

pub type Result<T> = std::result::Result<T, SqlError>;
