//! In-memory repository. Evaluates queries directly, closure leaves included.

use std::collections::HashSet;

use tally_spec::{Query, Specification};

use super::{with_id_tiebreak, TransactionRepository};
use crate::error::{LedgerError, Result};
use crate::model::Transaction;

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    transactions: Vec<Transaction>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }
}

impl TransactionRepository for InMemoryLedger {
    fn add(&mut self, transaction: &Transaction) -> Result<()> {
        if self.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(LedgerError::DuplicateId { id: transaction.id });
        }
        self.transactions.push(transaction.clone());
        Ok(())
    }

    fn add_all(&mut self, transactions: &[Transaction]) -> Result<()> {
        let mut taken: HashSet<i64> = self.transactions.iter().map(|t| t.id).collect();
        if let Some(dup) = transactions.iter().find(|t| !taken.insert(t.id)) {
            return Err(LedgerError::DuplicateId { id: dup.id });
        }
        self.transactions.extend_from_slice(transactions);
        Ok(())
    }

    fn find(&self, query: &Query<Transaction>) -> Result<Vec<Transaction>> {
        let query = with_id_tiebreak(query);
        let found = query.filter_cloned(&self.transactions);
        tracing::debug!(filter = %query.specification(), found = found.len(), "memory find");
        Ok(found)
    }

    fn count(&self, spec: &Specification<Transaction>) -> Result<usize> {
        Ok(spec.count(&self.transactions))
    }
}
