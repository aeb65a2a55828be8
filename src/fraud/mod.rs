//! Fraud Scoring Engine
//!
//! Derives a bounded [0, 100] risk score per user from append-only
//! behavioral signals. The score is a pure function of the signal set and
//! the configured weight table, so it can be cached and invalidated lazily
//! on new-signal arrival. Consumed by moderation (high-risk flagging) and by
//! payout eligibility.

pub mod scorer;
pub mod signal;

pub use scorer::FraudScorer;
pub use signal::{FraudSignal, SignalKind};
