//! Database connection pool and schema bootstrap.

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::store::earnings::EarningsRepository;
use crate::store::events::EventRepository;
use crate::store::moderation::ModerationRepository;
use crate::store::payouts::PayoutRepository;

pub struct DatabasePool {
    pool: PgPool,
    events: EventRepository,
    earnings: EarningsRepository,
    moderation: ModerationRepository,
    payouts: PayoutRepository,
}

impl DatabasePool {
    pub async fn new(connection_string: &str) -> Result<Self, String> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(connection_string)
            .await
            .map_err(|e| format!("Failed to connect to PostgreSQL: {}", e))?;

        info!("Connected to PostgreSQL");

        let events = EventRepository::new(pool.clone());
        let earnings = EarningsRepository::new(pool.clone());
        let moderation = ModerationRepository::new(pool.clone());
        let payouts = PayoutRepository::new(pool.clone());

        Ok(Self {
            pool,
            events,
            earnings,
            moderation,
            payouts,
        })
    }

    pub async fn init_schema(&self) -> Result<(), String> {
        info!("Initializing database schema...");

        sqlx::query("CREATE SCHEMA IF NOT EXISTS engagement")
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to create engagement schema: {}", e))?;

        sqlx::query("CREATE SCHEMA IF NOT EXISTS earnings")
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to create earnings schema: {}", e))?;

        sqlx::query("CREATE SCHEMA IF NOT EXISTS moderation")
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to create moderation schema: {}", e))?;

        sqlx::query("CREATE SCHEMA IF NOT EXISTS payouts")
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to create payouts schema: {}", e))?;

        self.events.init_tables().await?;
        self.earnings.init_tables().await?;
        self.moderation.init_tables().await?;
        self.payouts.init_tables().await?;

        info!("Database schema initialized");
        Ok(())
    }

    pub fn events(&self) -> &EventRepository {
        &self.events
    }

    pub fn earnings(&self) -> &EarningsRepository {
        &self.earnings
    }

    pub fn moderation(&self) -> &ModerationRepository {
        &self.moderation
    }

    pub fn payouts(&self) -> &PayoutRepository {
        &self.payouts
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
