//! Event Repository - PostgreSQL operations for accepted engagement events.

use sqlx::{PgPool, Row};
use tracing::debug;

use crate::ledger::event::{EngagementEvent, EventKind};

pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_tables(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS engagement.events (
                id TEXT PRIMARY KEY,
                content_id TEXT NOT NULL,
                actor_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                occurred_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create events table: {}", e))?;

        Ok(())
    }

    /// Insert an accepted event. The primary key makes the insert
    /// idempotent under retries.
    pub async fn insert(&self, event: &EngagementEvent) -> Result<(), String> {
        let kind = match event.kind {
            EventKind::Like => "LIKE",
            EventKind::Unlike => "UNLIKE",
            EventKind::Reply => "REPLY",
            EventKind::View => "VIEW",
        };

        sqlx::query(
            r#"
            INSERT INTO engagement.events (id, content_id, actor_id, kind, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&event.id)
        .bind(&event.content_id)
        .bind(&event.actor_id)
        .bind(kind)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to insert event: {}", e))?;

        debug!(event_id = %event.id, content_id = %event.content_id, "Event persisted");
        Ok(())
    }

    pub async fn count_for_content(&self, content_id: &str) -> Result<i64, String> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM engagement.events WHERE content_id = $1")
            .bind(content_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| format!("Failed to count events: {}", e))?;

        Ok(row.get("n"))
    }
}
