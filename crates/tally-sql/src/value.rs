//! Bind parameters.

use std::fmt;

use serde::Serialize;

/// A value bound to a placeholder.
///
/// Operands are never missing, so nothing binds as NULL. Missing column
/// values are handled in the SQL text (`COALESCE` and `NULLS LAST`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Integer(n) => write!(f, "{n}"),
            SqlValue::Real(n) => write!(f, "{n}"),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

#[cfg(feature = "rusqlite")]
mod sqlite {
    use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};

    use super::SqlValue;

    impl ToSql for SqlValue {
        fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
            Ok(match self {
                SqlValue::Integer(n) => ToSqlOutput::Owned(Value::Integer(*n)),
                SqlValue::Real(n) => ToSqlOutput::Owned(Value::Real(*n)),
                SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
                SqlValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            })
        }
    }
}
