//! # Tally Ledger
//!
//! A small personal-finance ledger built on [`tally_spec`]. Transactions,
//! categories and goals derive `Filterable`; every lookup is expressed as a
//! [`Specification`](tally_spec::Specification) and handed to a
//! [`TransactionRepository`].
//!
//! The same query runs against either store:
//!
//! ```
//! use tally_ledger::{sample, InMemoryLedger, SqliteLedger, Transaction, TransactionRepository};
//! use tally_spec::Query;
//!
//! let query = Query::new()
//!     .matching(Transaction::CATEGORY.eq("Food") & Transaction::AMOUNT.lt(-5_000))
//!     .order_by(Transaction::AMOUNT.asc());
//!
//! let mut memory = InMemoryLedger::new();
//! memory.add_all(&sample::transactions()).unwrap();
//!
//! let mut sqlite = SqliteLedger::in_memory().unwrap();
//! sqlite.add_all(&sample::transactions()).unwrap();
//!
//! let ids: Vec<i64> = sqlite.find(&query).unwrap().iter().map(|t| t.id).collect();
//! assert_eq!(ids, [11, 3, 8]);
//! assert_eq!(memory.find(&query).unwrap(), sqlite.find(&query).unwrap());
//! ```
//!
//! Filters that need a closure, such as [`GoalFilter::reached`], evaluate
//! in memory only. The SQLite store refuses them rather than scanning.

pub mod error;
pub mod filters;
pub mod model;
pub mod sample;
pub mod store;

pub use error::{LedgerError, Result};
pub use filters::{GoalFilter, TransactionFilter};
pub use model::{Category, Goal, GoalStatus, Transaction, TransactionKind, TransactionStatus};
pub use store::memory::InMemoryLedger;
pub use store::sqlite::SqliteLedger;
pub use store::TransactionRepository;
