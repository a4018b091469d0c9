use log::{debug, warn};
use sqlx::{Pool, Postgres};

use super::{InsertSummary, TransactionStore};
use crate::{error::StoreError, models::Transaction};

const INSERT_TRANSACTION: &str = r#"
    INSERT INTO transactions
        (account_id, txn_date, post_date, description, amount, category, txn_type)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT DO NOTHING
"#;

#[derive(Clone)]
pub struct PgStore {
    p: Pool<Postgres>,
}

impl PgStore {
    pub fn new(p: Pool<Postgres>) -> Self {
        Self { p }
    }
}

impl TransactionStore for PgStore {
    async fn insert_batch(&mut self, records: &[Transaction]) -> Result<InsertSummary, StoreError> {
        let mut tx = self.p.begin().await?;
        let mut summary = InsertSummary::default();

        for record in records {
            let res = sqlx::query(INSERT_TRANSACTION)
                .bind(record.account_id())
                .bind(record.txn_date())
                .bind(record.post_date())
                .bind(record.description())
                .bind(record.amount())
                .bind(record.category())
                .bind(record.txn_type().as_str())
                .execute(&mut *tx)
                .await;

            match res {
                Ok(done) if done.rows_affected() == 0 => {
                    debug!("duplicate row ignored: {:?}", record);
                    summary.ignored += 1;
                }
                Ok(_) => summary.inserted += 1,
                Err(err) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!("rollback failed: {}", rollback_err);
                    }
                    return Err(Box::new(err));
                }
            }
        }

        tx.commit().await?;
        Ok(summary)
    }
}
