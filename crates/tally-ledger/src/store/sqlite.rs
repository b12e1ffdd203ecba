//! SQLite-backed repository.
//!
//! Queries are planned, lowered with [`tally_sql`] and run as a single
//! statement; nothing is filtered after the fact. Enum columns hold
//! discriminants and `occurred_at` holds Unix milliseconds, which is what
//! the lowered conditions compare against.

use std::path::Path;

use chrono::DateTime;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use tally_spec::{FilterEnum, Filterable, Query, Specification};
use tally_sql::{lower_expression, lower_plan, SqlOptions, SqlValue};

use super::{with_id_tiebreak, TransactionRepository};
use crate::error::{LedgerError, Result};
use crate::model::{Transaction, TransactionKind, TransactionStatus};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    category TEXT NOT NULL,
    amount_cents INTEGER NOT NULL,
    kind INTEGER NOT NULL,
    status INTEGER NOT NULL,
    occurred_at INTEGER NOT NULL,
    note TEXT
);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category);
CREATE INDEX IF NOT EXISTS idx_transactions_occurred_at ON transactions(occurred_at);
";

const COLUMNS: &str = "id, description, category, amount_cents, kind, status, occurred_at, note";

pub struct SqliteLedger {
    conn: Connection,
    options: SqlOptions,
}

impl SqliteLedger {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening ledger");
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let ledger = SqliteLedger {
            conn,
            options: transaction_columns(),
        };
        ledger.init_schema()?;
        Ok(ledger)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Removes every transaction.
    pub fn clear(&mut self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM transactions", [])?)
    }

    /// The statement and parameters [`find`](TransactionRepository::find)
    /// would run for `query`.
    pub fn explain(&self, query: &Query<Transaction>) -> Result<(String, Vec<SqlValue>)> {
        let plan = with_id_tiebreak(query).plan()?;
        let tail = lower_plan(&plan, &self.options)?;
        Ok((format!("SELECT {COLUMNS} FROM transactions{}", tail.sql), tail.params))
    }
}

/// Strict column mapping: every filterable field has a column, anything
/// else is rejected before it reaches SQLite.
pub fn transaction_columns() -> SqlOptions {
    let columns = Transaction::filter_fields().iter().map(|&field| {
        let column = if field == Transaction::AMOUNT.name() {
            "amount_cents"
        } else {
            field
        };
        (field, column)
    });
    SqlOptions::sqlite().with_columns(columns).strict(true)
}

fn insert(conn: &Connection, t: &Transaction) -> Result<()> {
    let inserted = conn.execute(
        "INSERT INTO transactions (id, description, category, amount_cents, kind, status, occurred_at, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            t.id,
            t.description,
            t.category,
            t.amount_cents,
            t.kind.discriminant(),
            t.status.discriminant(),
            t.occurred_at.timestamp_millis(),
            t.note,
        ],
    );
    match inserted {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(LedgerError::DuplicateId { id: t.id })
        }
        Err(e) => Err(e.into()),
    }
}

impl TransactionRepository for SqliteLedger {
    fn add(&mut self, transaction: &Transaction) -> Result<()> {
        insert(&self.conn, transaction)
    }

    /// All or nothing.
    fn add_all(&mut self, transactions: &[Transaction]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for t in transactions {
            insert(&tx, t)?;
        }
        tx.commit()?;
        tracing::debug!(count = transactions.len(), "inserted transactions");
        Ok(())
    }

    fn find(&self, query: &Query<Transaction>) -> Result<Vec<Transaction>> {
        let (sql, params) = self.explain(query)?;
        tracing::debug!(%sql, params = params.len(), "sqlite find");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), RawRow::read)?;
        let transactions = rows
            .map(|row| row?.into_transaction())
            .collect::<Result<Vec<_>>>()?;
        Ok(transactions)
    }

    fn count(&self, spec: &Specification<Transaction>) -> Result<usize> {
        let filter = lower_expression(&spec.to_expression()?, &self.options)?;
        let sql = format!("SELECT COUNT(*) FROM transactions WHERE {}", filter.clause);
        tracing::debug!(%sql, "sqlite count");

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(filter.params.iter()), |r| r.get(0))?;
        usize::try_from(count).map_err(|_| LedgerError::Corrupt {
            reason: format!("negative count {count}"),
        })
    }
}

/// A row as stored, before enum and timestamp decoding.
struct RawRow {
    id: i64,
    description: String,
    category: String,
    amount_cents: i64,
    kind: u32,
    status: u32,
    occurred_at: i64,
    note: Option<String>,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawRow {
            id: row.get(0)?,
            description: row.get(1)?,
            category: row.get(2)?,
            amount_cents: row.get(3)?,
            kind: row.get(4)?,
            status: row.get(5)?,
            occurred_at: row.get(6)?,
            note: row.get(7)?,
        })
    }

    fn into_transaction(self) -> Result<Transaction> {
        let corrupt = |what: &str, value: i64| LedgerError::Corrupt {
            reason: format!("transaction {}: invalid {what} {value}", self.id),
        };
        let kind = TransactionKind::from_discriminant(self.kind)
            .ok_or_else(|| corrupt("kind", i64::from(self.kind)))?;
        let status = TransactionStatus::from_discriminant(self.status)
            .ok_or_else(|| corrupt("status", i64::from(self.status)))?;
        let occurred_at = DateTime::from_timestamp_millis(self.occurred_at)
            .ok_or_else(|| corrupt("timestamp", self.occurred_at))?;

        Ok(Transaction {
            id: self.id,
            description: self.description,
            category: self.category,
            amount_cents: self.amount_cents,
            kind,
            status,
            occurred_at,
            note: self.note,
        })
    }
}
