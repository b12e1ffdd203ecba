//! Tally SQL - lowers specifications into parameterised SQL.
//!
//! Takes the structural [`Expression`](tally_spec::Expression) of a
//! specification (or a whole [`QueryPlan`](tally_spec::QueryPlan)) and
//! renders a `WHERE` clause plus bind parameters for SQLite or PostgreSQL.
//! Values never appear in the SQL text.
//!
//! ```rust
//! use tally_spec::{Op, Specification, Filterable, Value};
//! use tally_sql::{lower_specification, SqlOptions, SqlValue};
//!
//! struct Tx;
//! impl Filterable for Tx {
//!     fn field_value(&self, _: &str) -> Value<'_> { Value::None }
//! }
//!
//! let spec = Specification::<Tx>::condition("category", Op::Eq, "Food").unwrap()
//!     & Specification::condition("amount", Op::Gt, 100).unwrap();
//!
//! let options = SqlOptions::sqlite().with_column("amount", "amount_cents");
//! let filter = lower_specification(&spec, &options).unwrap();
//!
//! assert_eq!(filter.clause, r#"("category" = ? AND "amount_cents" > ?)"#);
//! assert_eq!(filter.params, [SqlValue::Text("Food".into()), SqlValue::Integer(100)]);
//! ```
//!
//! With the `rusqlite` feature, [`SqlValue`] implements `rusqlite::ToSql`.

mod error;
mod lower;
mod options;
mod value;

pub use error::{Result, SqlError};
pub use lower::{lower_expression, lower_plan, lower_query, lower_specification, SqlFilter, SqlTail};
pub use options::{quote_ident, Dialect, SqlOptions};
pub use value::SqlValue;
