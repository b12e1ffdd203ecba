//! Error types for the ledger.

use tally_spec::SpecError;
use tally_sql::SqlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Sql(#[from] SqlError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("transaction {id} already exists")]
    DuplicateId { id: i64 },

    /// A stored row cannot be turned back into a domain value.
    #[error("corrupt row: {reason}")]
    Corrupt { reason: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
