//! Forum Engagement Monetization & Moderation Engine
//!
//! Converts raw user engagement (likes, replies, views) into creator
//! earnings under deterministic, auditable rules; gates earnings behind KYC
//! and a fraud-risk score; governs content visibility through an explicit
//! moderation state machine; and periodically batches eligible earnings into
//! payouts with a hashed CSV export.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs        - Crate root with re-exports
//! ├── config.rs     - Rate tables, thresholds, weights (env-overridable)
//! ├── error.rs      - Error taxonomy (caller / transient / invariant)
//! ├── identity.rs   - External identity seam (roles, KYC flag)
//! ├── content.rs    - Content registry and per-content serialization
//! ├── ledger/       - Engagement event ledger
//! │   ├── event.rs     - Event types and wire parsing
//! │   └── ingest.rs    - Idempotent ingestion, counter maintenance
//! ├── fraud/        - Fraud scoring engine
//! │   ├── signal.rs    - Behavioral signals
//! │   └── scorer.rs    - Windowed weighted aggregation, [0,100] clamp
//! ├── earnings/     - Earnings calculator
//! │   ├── entry.rs     - Ledger entries, threshold dedup, batch assignment
//! │   └── calculator.rs - Threshold-crossing recomputation
//! ├── moderation/   - Content moderation state machine
//! │   ├── transition.rs - Legal-transition table
//! │   └── machine.rs    - Transition execution, action history
//! ├── payout/       - Payout batch processor
//! │   ├── batch.rs     - Batch types
//! │   ├── export.rs    - Deterministic CSV + SHA-256, export sink seam
//! │   └── processor.rs - Eligibility, minimums, atomic commit, export
//! ├── audit.rs      - Append-only audit log
//! ├── notify.rs     - Moderation notification sink seam
//! ├── engine.rs     - Facade wiring all components
//! └── store/        - PostgreSQL persistence (optional)
//! ```

pub mod audit;
pub mod config;
pub mod content;
pub mod earnings;
pub mod engine;
pub mod error;
pub mod fraud;
pub mod identity;
pub mod ledger;
pub mod moderation;
pub mod notify;
pub mod payout;
pub mod store;

// Re-export main types for convenience
pub use audit::{AuditEvent, AuditLog, AuditRecord, AuditSeverity};
pub use config::{
    DatabaseConfig, EarningsRates, EngineConfig, FraudConfig, LoggingConfig, ModerationConfig,
    PayoutConfig, SignalWeights,
};
pub use content::{ContentItem, ContentKind, ContentRegistry, ContentStatus, Counters};
pub use earnings::{EarningsCalculator, EarningsLedgerEntry, EarningsStore, RateRule};
pub use engine::ForumEngine;
pub use error::EngineError;
pub use fraud::{FraudScorer, FraudSignal, SignalKind};
pub use identity::{IdentityProvider, InMemoryIdentityProvider, Role, User};
pub use ledger::{EngagementEvent, EngagementLedger, EventKind, IngestOutcome};
pub use moderation::{required_actor, ActorRequirement, ModerationAction, ModerationMachine};
pub use notify::{
    ModerationNotice, NotificationSink, NullNotificationSink, RecordingNotificationSink,
};
pub use payout::{
    build_csv, csv_sha256, BatchStatus, ExportSink, NullExportSink, PayoutBatch, PayoutProcessor,
    RecordingExportSink,
};
pub use store::DatabasePool;
