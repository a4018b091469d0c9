mod memory;
mod postgres;

use std::future::Future;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::{error::StoreError, models::Transaction};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: u64,
    /// Rows identical to one already stored; skipped without error.
    pub ignored: u64,
}

/// Insert-or-ignore every record, committing all of them or none.
pub trait TransactionStore {
    fn insert_batch(
        &mut self,
        records: &[Transaction],
    ) -> impl Future<Output = Result<InsertSummary, StoreError>> + Send;
}
