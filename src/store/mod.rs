//! PostgreSQL persistence using sqlx.
//!
//! Durable mirrors for accepted events, earnings entries, moderation
//! actions, and payout batches. Attached optionally; with
//! `postgres_enabled = false` the engine runs fully in memory.

pub mod earnings;
pub mod events;
pub mod moderation;
pub mod payouts;
pub mod pool;

pub use pool::DatabasePool;
