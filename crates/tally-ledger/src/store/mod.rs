//! # Storage Layer
//!
//! The [`TransactionRepository`] trait is the one seam between the ledger
//! and where its transactions live. Callers hand it a [`Query`] built from
//! specifications and get matching transactions back, without knowing
//! whether the filter ran in memory or inside a database.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryLedger`]: evaluates specifications directly. Accepts
//!   closure leaves.
//! - [`sqlite::SqliteLedger`]: translates the query into SQL and lets SQLite
//!   do the filtering, ordering and paging. A closure leaf cannot be
//!   translated, so such queries fail with
//!   [`SpecError::UnsupportedPredicate`](tally_spec::SpecError::UnsupportedPredicate)
//!   instead of silently loading the whole table.
//!
//! ## Ordering
//!
//! Both stores break ties by ascending `id`, so the same query returns the
//! same rows in the same order from either backend.

use tally_spec::{Query, Specification};

use crate::error::Result;
use crate::model::Transaction;

pub mod memory;
pub mod sqlite;

/// Abstract interface for transaction storage.
pub trait TransactionRepository {
    /// Stores a new transaction. Fails with `DuplicateId` if the id is taken.
    fn add(&mut self, transaction: &Transaction) -> Result<()>;

    /// Stores the whole batch or none of it. A repeated id anywhere in the
    /// batch, or one already stored, fails with `DuplicateId`.
    fn add_all(&mut self, transactions: &[Transaction]) -> Result<()>;

    fn get(&self, id: i64) -> Result<Option<Transaction>> {
        let query = Query::new().matching(Transaction::ID.eq(id)).limit(1);
        Ok(self.find(&query)?.into_iter().next())
    }

    /// Matching transactions, ordered and paged as the query asks.
    fn find(&self, query: &Query<Transaction>) -> Result<Vec<Transaction>>;

    /// Number of matching transactions. Paging does not apply.
    fn count(&self, spec: &Specification<Transaction>) -> Result<usize>;
}

/// Appends an ascending `id` ordering unless the query already orders by id.
pub(crate) fn with_id_tiebreak(query: &Query<Transaction>) -> Query<Transaction> {
    let id = Transaction::ID.name();
    if query.orderings().iter().any(|o| o.field == id) {
        query.clone()
    } else {
        query.clone().order_asc(id)
    }
}
