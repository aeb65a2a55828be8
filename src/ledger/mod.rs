//! Engagement Event Ledger
//!
//! Append-only, idempotent ingestion of engagement events. The ledger is the
//! source of truth for content counters; a counter always equals the signed
//! sum of accepted events of the matching kind, floored at zero.

pub mod event;
pub mod ingest;

pub use event::{EngagementEvent, EventKind};
pub use ingest::{EngagementLedger, IngestOutcome};
