//! Lowering configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SqlError};

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            other => Err(format!("unknown SQL dialect '{other}'")),
        }
    }
}

/// How expressions are rendered: dialect, column mapping, table alias.
///
/// Deserialises from partial input; missing keys take their defaults.
///
/// ```
/// use tally_sql::{Dialect, SqlOptions};
///
/// let options = SqlOptions::new(Dialect::Postgres)
///     .with_alias("t")
///     .with_column("amount", "amount_cents")
///     .strict(true);
///
/// assert_eq!(options.column_for("amount").unwrap(), r#""t"."amount_cents""#);
/// assert!(options.column_for("payee").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlOptions {
    pub dialect: Dialect,
    /// Qualifies every column, e.g. `"t"."amount"`.
    pub table_alias: Option<String>,
    /// Field name to column name. Unmapped fields use the field name.
    pub columns: BTreeMap<String, String>,
    /// Reject fields that have no entry in `columns`.
    pub strict: bool,
}

impl SqlOptions {
    pub fn new(dialect: Dialect) -> Self {
        SqlOptions {
            dialect,
            ..Default::default()
        }
    }

    pub fn sqlite() -> Self {
        Self::new(Dialect::Sqlite)
    }

    pub fn postgres() -> Self {
        Self::new(Dialect::Postgres)
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.table_alias = Some(alias.into());
        self
    }

    pub fn with_column(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(field.into(), column.into());
        self
    }

    pub fn with_columns<I, F, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = (F, C)>,
        F: Into<String>,
        C: Into<String>,
    {
        self.columns
            .extend(columns.into_iter().map(|(f, c)| (f.into(), c.into())));
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Quoted, alias-qualified column for `field`.
    pub fn column_for(&self, field: &str) -> Result<String> {
        let column = match self.columns.get(field) {
            Some(column) => column.as_str(),
            None if self.strict => {
                return Err(SqlError::UnknownField {
                    field: field.to_string(),
                })
            }
            None => field,
        };
        Ok(match &self.table_alias {
            Some(alias) => format!("{}.{}", quote_ident(alias), quote_ident(column)),
            None => quote_ident(column),
        })
    }
}

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
