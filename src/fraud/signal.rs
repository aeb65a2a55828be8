//! Behavioral fraud signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Behavioral signal categories observed by upstream detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Abnormal burst of likes in a short window.
    VelocitySpike,
    /// Account younger than the trust floor.
    NewAccount,
    /// Device fingerprint shared with another account.
    DuplicateDevice,
    /// IP address overlap with engagement targets.
    IpOverlap,
    /// Burst of user reports against the account's content.
    ReportBurst,
}

/// One observed signal. Append-only; the aggregate score is always
/// re-derivable from the signal history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudSignal {
    pub user_id: String,
    pub kind: SignalKind,
    pub weight: i32,
    pub observed_at: DateTime<Utc>,
}

impl FraudSignal {
    pub fn new(user_id: impl Into<String>, kind: SignalKind, weight: i32) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            weight,
            observed_at: Utc::now(),
        }
    }

    pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = at;
        self
    }
}
