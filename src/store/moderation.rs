//! Moderation Repository - PostgreSQL operations for status and actions.

use sqlx::PgPool;
use tracing::debug;

use crate::content::ContentStatus;
use crate::moderation::machine::ModerationAction;

pub struct ModerationRepository {
    pool: PgPool,
}

impl ModerationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_tables(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS moderation.content_status (
                content_id TEXT PRIMARY KEY,
                status TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create content_status table: {}", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS moderation.actions (
                id TEXT PRIMARY KEY,
                content_id TEXT NOT NULL,
                actor_id TEXT,
                from_status TEXT NOT NULL,
                to_status TEXT NOT NULL,
                reason TEXT NOT NULL,
                occurred_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create actions table: {}", e))?;

        Ok(())
    }

    fn status_name(status: ContentStatus) -> &'static str {
        match status {
            ContentStatus::Visible => "VISIBLE",
            ContentStatus::HiddenByAi => "HIDDEN_BY_AI",
            ContentStatus::HiddenByMod => "HIDDEN_BY_MOD",
            ContentStatus::Quarantined => "QUARANTINED",
        }
    }

    /// Persist a committed transition: the status update and the action row
    /// land in one transaction, so the durable history can never diverge
    /// from the durable status.
    pub async fn record_transition(&self, action: &ModerationAction) -> Result<(), String> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| format!("Failed to begin transaction: {}", e))?;

        sqlx::query(
            r#"
            INSERT INTO moderation.content_status (content_id, status)
            VALUES ($1, $2)
            ON CONFLICT (content_id) DO UPDATE SET status = EXCLUDED.status
            "#,
        )
        .bind(&action.content_id)
        .bind(Self::status_name(action.to_status))
        .execute(&mut *tx)
        .await
        .map_err(|e| format!("Failed to update content status: {}", e))?;

        sqlx::query(
            r#"
            INSERT INTO moderation.actions
            (id, content_id, actor_id, from_status, to_status, reason, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&action.id)
        .bind(&action.content_id)
        .bind(&action.actor_id)
        .bind(Self::status_name(action.from_status))
        .bind(Self::status_name(action.to_status))
        .bind(&action.reason)
        .bind(action.occurred_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| format!("Failed to insert moderation action: {}", e))?;

        tx.commit()
            .await
            .map_err(|e| format!("Failed to commit transition: {}", e))?;

        debug!(content_id = %action.content_id, to = ?action.to_status, "Moderation transition persisted");
        Ok(())
    }
}
