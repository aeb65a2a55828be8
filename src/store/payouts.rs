//! Payout Repository - PostgreSQL operations for payout batches.

use sqlx::PgPool;
use tracing::debug;

use crate::payout::batch::{BatchStatus, PayoutBatch};

pub struct PayoutRepository {
    pool: PgPool,
}

impl PayoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_tables(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payouts.batches (
                id TEXT PRIMARY KEY,
                period_id TEXT NOT NULL UNIQUE,
                period_start TIMESTAMPTZ NOT NULL,
                period_end TIMESTAMPTZ NOT NULL,
                status TEXT NOT NULL,
                total_cents BIGINT NOT NULL,
                csv_sha256 TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create batches table: {}", e))?;

        Ok(())
    }

    fn status_name(status: BatchStatus) -> &'static str {
        match status {
            BatchStatus::Open => "OPEN",
            BatchStatus::Closed => "CLOSED",
            BatchStatus::Exported => "EXPORTED",
        }
    }

    /// Upsert a batch by period. The unique period key guarantees one batch
    /// per period at the durable layer too.
    pub async fn upsert(&self, batch: &PayoutBatch) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO payouts.batches
            (id, period_id, period_start, period_end, status, total_cents, csv_sha256)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (period_id) DO UPDATE
            SET status = EXCLUDED.status, csv_sha256 = EXCLUDED.csv_sha256
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.period_id)
        .bind(batch.period_start)
        .bind(batch.period_end)
        .bind(Self::status_name(batch.status))
        .bind(batch.total_cents)
        .bind(&batch.csv_sha256)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to upsert batch: {}", e))?;

        debug!(batch_id = %batch.id, period_id = %batch.period_id, "Payout batch persisted");
        Ok(())
    }
}
