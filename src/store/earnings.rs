//! Earnings Repository - PostgreSQL operations for the earnings ledger.

use sqlx::{PgPool, Row};
use tracing::debug;

use crate::earnings::entry::{EarningsLedgerEntry, RateRule};

pub struct EarningsRepository {
    pool: PgPool,
}

impl EarningsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_tables(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS earnings.entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                content_id TEXT NOT NULL,
                period_id TEXT NOT NULL,
                amount_cents BIGINT NOT NULL,
                rule TEXT NOT NULL,
                threshold_index BIGINT NOT NULL,
                computed_at TIMESTAMPTZ NOT NULL,
                payout_batch_id TEXT,
                UNIQUE (content_id, rule, threshold_index)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create entries table: {}", e))?;

        Ok(())
    }

    fn rule_name(rule: RateRule) -> &'static str {
        match rule {
            RateRule::Likes => "likes",
            RateRule::Replies => "replies",
        }
    }

    /// Insert a realized entry. The unique threshold key makes re-inserts
    /// from recompute retries no-ops.
    pub async fn insert(&self, entry: &EarningsLedgerEntry) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO earnings.entries
            (id, user_id, content_id, period_id, amount_cents, rule, threshold_index, computed_at, payout_batch_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (content_id, rule, threshold_index) DO NOTHING
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.content_id)
        .bind(&entry.period_id)
        .bind(entry.amount_cents)
        .bind(Self::rule_name(entry.rule))
        .bind(entry.threshold_index as i64)
        .bind(entry.computed_at)
        .bind(&entry.payout_batch_id)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to insert earnings entry: {}", e))?;

        debug!(entry_id = %entry.id, user_id = %entry.user_id, "Earnings entry persisted");
        Ok(())
    }

    /// Conditionally assign entries to a batch. The `payout_batch_id IS
    /// NULL` predicate means a racing assignment changes zero rows rather
    /// than overwriting; the caller compares the affected count.
    pub async fn assign_batch(&self, entry_ids: &[String], batch_id: &str) -> Result<u64, String> {
        let result = sqlx::query(
            r#"
            UPDATE earnings.entries
            SET payout_batch_id = $1
            WHERE id = ANY($2) AND payout_batch_id IS NULL
            "#,
        )
        .bind(batch_id)
        .bind(entry_ids)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to assign entries to batch: {}", e))?;

        Ok(result.rows_affected())
    }

    pub async fn sum_for_batch(&self, batch_id: &str) -> Result<i64, String> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount_cents), 0) AS total FROM earnings.entries WHERE payout_batch_id = $1",
        )
        .bind(batch_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| format!("Failed to sum batch entries: {}", e))?;

        Ok(row.get("total"))
    }
}
