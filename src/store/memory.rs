use std::collections::BTreeSet;

use super::{InsertSummary, TransactionStore};
use crate::{error::StoreError, models::Transaction};

/// In-memory store with the same uniqueness and atomicity rules as the table.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    rows: BTreeSet<Transaction>,
    fail_at: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch fails when it reaches the record at `index`.
    pub fn failing_at(index: usize) -> Self {
        Self {
            rows: BTreeSet::new(),
            fail_at: Some(index),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &Transaction> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TransactionStore for MemoryStore {
    async fn insert_batch(&mut self, records: &[Transaction]) -> Result<InsertSummary, StoreError> {
        let mut staged = self.rows.clone();
        let mut summary = InsertSummary::default();

        for (i, record) in records.iter().enumerate() {
            if self.fail_at == Some(i) {
                return Err(format!("injected fault at record {}", i).into());
            }
            if staged.insert(record.clone()) {
                summary.inserted += 1;
            } else {
                summary.ignored += 1;
            }
        }

        self.rows = staged;
        Ok(summary)
    }
}
