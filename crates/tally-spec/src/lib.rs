//! Tally Spec - composable, translatable filters for domain entities.
//!
//! A [`Specification`] is an immutable predicate over an entity type. Small
//! specifications combine into larger ones with `and`, `or` and `negate`
//! (or `&`, `|`, `!`), and the same tree serves two consumers:
//!
//! - **In memory**: [`Specification::is_satisfied_by`] and the collection
//!   helpers evaluate it directly against values.
//! - **In a store**: [`Specification::to_expression`] yields a structural
//!   [`Expression`] that a translation layer (for example `tally-sql`)
//!   lowers into a native query.
//!
//! # Quick Start
//!
//! ```rust
//! use tally_spec::{FilterEnum, Filterable, Query, Specification};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Status {
//!     Pending,
//!     Completed,
//!     Cancelled,
//! }
//!
//! impl FilterEnum for Status {
//!     fn discriminant(&self) -> u32 {
//!         match self {
//!             Status::Pending => 0,
//!             Status::Completed => 1,
//!             Status::Cancelled => 2,
//!         }
//!     }
//! }
//!
//! #[derive(Filterable)]
//! struct Transaction {
//!     #[filter(String)]
//!     category: String,
//!     #[filter(Number)]
//!     amount: i64,
//!     #[filter(Enum)]
//!     status: Status,
//! }
//!
//! let rows = vec![
//!     Transaction { category: "Food".into(), amount: 150, status: Status::Completed },
//!     Transaction { category: "Food".into(), amount: 40, status: Status::Completed },
//!     Transaction { category: "Rent".into(), amount: 900, status: Status::Cancelled },
//! ];
//!
//! let spec = Transaction::CATEGORY.eq("Food")
//!     & Transaction::AMOUNT.gt(100)
//!     & !Transaction::STATUS.eq(Status::Cancelled);
//! assert_eq!(spec.count(&rows), 1);
//!
//! // Declarative trees translate; the expression mirrors the tree.
//! let expr = spec.to_expression().unwrap();
//! assert_eq!(expr.fields().len(), 3);
//!
//! // Closures evaluate in memory but refuse to translate.
//! let odd = Specification::predicate("odd_amount", |t: &Transaction| t.amount % 2 == 1);
//! assert!(odd.to_expression().is_err());
//!
//! let top = Query::new()
//!     .matching(Transaction::STATUS.ne(Status::Pending))
//!     .order_by(Transaction::AMOUNT.desc())
//!     .limit(1)
//!     .build();
//! assert_eq!(top.filter(&rows)[0].category, "Rent");
//! ```
//!
//! # Semantics
//!
//! - `and` and `or` short-circuit left to right.
//! - `everything()` is the identity of `and`, `nothing()` the identity of `or`.
//! - A missing field ([`Value::None`]) fails every condition, `Ne` included.
//!   `negate` is plain boolean negation on top of that.
//! - Conditions compare like with like: a string operand never matches a
//!   number field.
//!
//! # Field Types and Operators
//!
//! | Type | Operators |
//! |------|-----------|
//! | String | `Eq`, `Ne`, `StartsWith`, `EndsWith`, `Contains`, `Regex` |
//! | Number | `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte` |
//! | Timestamp | `Eq`, `Ne`, `Before`, `After`, `Gt`, `Gte`, `Lt`, `Lte` |
//! | Enum | `Eq`, `Ne`, `In` |
//! | Bool | `Eq`, `Ne`, `Is` |

mod condition;
mod error;
mod expr;
mod field;
mod op;
mod ordering;
mod query;
mod spec;
mod traits;
mod value;

pub use condition::{Condition, Operand};
pub use error::{Result, SpecError};
pub use expr::{Expr, Expression};
pub use field::{kind, Field};
pub use op::Op;
pub use ordering::{compare_by_orderings, compare_values, Dir, OrderBy};
pub use query::{Query, QueryPlan};
pub use spec::Specification;
pub use traits::{FilterEnum, FilterTimestamp, Filterable};
pub use value::{Number, Timestamp, Value};

#[cfg(feature = "derive")]
pub use tally_macros::Filterable;
