//! Payout batch types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Open,
    /// Entries assigned and totals fixed; export not yet delivered.
    Closed,
    /// Export delivered to the external sink.
    Exported,
}

/// A closed, immutable group of earnings entries assigned for one payment
/// run. `total_cents` always equals the sum of its assigned entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutBatch {
    pub id: String,
    pub period_id: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub status: BatchStatus,
    pub total_cents: i64,
    /// Digest of the exported CSV, for post-hoc delivery verification.
    pub csv_sha256: Option<String>,
}

impl PayoutBatch {
    pub fn new(period_id: impl Into<String>, period_start: DateTime<Utc>, period_end: DateTime<Utc>) -> Self {
        Self {
            id: format!("batch_{}", Uuid::new_v4()),
            period_id: period_id.into(),
            period_start,
            period_end,
            status: BatchStatus::Open,
            total_cents: 0,
            csv_sha256: None,
        }
    }
}
