//! Earnings ledger entries and their store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::EngineError;

/// Which rate rule produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateRule {
    Likes,
    Replies,
}

/// One realized earning. Immutable after creation except for the
/// `payout_batch_id` assignment, which happens at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsLedgerEntry {
    pub id: String,
    pub user_id: String,
    pub content_id: String,
    /// Month (`YYYY-MM`) of `computed_at`.
    pub period_id: String,
    pub amount_cents: i64,
    pub rule: RateRule,
    pub threshold_index: u64,
    pub computed_at: DateTime<Utc>,
    pub payout_batch_id: Option<String>,
}

impl EarningsLedgerEntry {
    pub fn new(
        user_id: impl Into<String>,
        content_id: impl Into<String>,
        rule: RateRule,
        threshold_index: u64,
        amount_cents: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("earn_{}", Uuid::new_v4()),
            user_id: user_id.into(),
            content_id: content_id.into(),
            period_id: now.format("%Y-%m").to_string(),
            amount_cents,
            rule,
            threshold_index,
            computed_at: now,
            payout_batch_id: None,
        }
    }
}

struct StoreInner {
    /// Entry id -> entry.
    entries: HashMap<String, EarningsLedgerEntry>,
    /// Threshold crossings already paid. Creation is conditional on this set
    /// so a crossing can never be paid twice.
    paid_thresholds: HashSet<(String, RateRule, u64)>,
}

/// In-memory earnings ledger. All structural mutations happen under one
/// write lock so threshold claims and batch assignments are atomic.
pub struct EarningsStore {
    inner: RwLock<StoreInner>,
}

impl Default for EarningsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EarningsStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                entries: HashMap::new(),
                paid_thresholds: HashSet::new(),
            }),
        }
    }

    /// Insert an entry if its threshold crossing is still unpaid. Returns
    /// false (without inserting) when the crossing was already paid.
    pub async fn insert_if_unpaid(&self, entry: EarningsLedgerEntry) -> bool {
        let key = (entry.content_id.clone(), entry.rule, entry.threshold_index);

        let mut inner = self.inner.write().await;
        if !inner.paid_thresholds.insert(key) {
            return false;
        }
        inner.entries.insert(entry.id.clone(), entry);
        true
    }

    pub async fn get(&self, entry_id: &str) -> Option<EarningsLedgerEntry> {
        self.inner.read().await.entries.get(entry_id).cloned()
    }

    /// Entries not yet assigned to any payout batch.
    pub async fn unassigned(&self) -> Vec<EarningsLedgerEntry> {
        let inner = self.inner.read().await;
        inner
            .entries
            .values()
            .filter(|e| e.payout_batch_id.is_none())
            .cloned()
            .collect()
    }

    pub async fn entries_for_content(&self, content_id: &str) -> Vec<EarningsLedgerEntry> {
        let inner = self.inner.read().await;
        inner
            .entries
            .values()
            .filter(|e| e.content_id == content_id)
            .cloned()
            .collect()
    }

    pub async fn entries_for_user(&self, user_id: &str) -> Vec<EarningsLedgerEntry> {
        let inner = self.inner.read().await;
        inner
            .entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn entries_for_batch(&self, batch_id: &str) -> Vec<EarningsLedgerEntry> {
        let inner = self.inner.read().await;
        inner
            .entries
            .values()
            .filter(|e| e.payout_batch_id.as_deref() == Some(batch_id))
            .cloned()
            .collect()
    }

    /// Assign a set of entries to a batch, all-or-nothing.
    ///
    /// Every assignment is conditional on the entry still being unassigned;
    /// if any entry was claimed by a racing run, nothing is written and the
    /// conflict surfaces as an error instead of corrupted state. Returns the
    /// summed cents of the assigned entries.
    pub async fn assign_batch(
        &self,
        entry_ids: &[String],
        batch_id: &str,
    ) -> Result<i64, EngineError> {
        let mut inner = self.inner.write().await;

        for id in entry_ids {
            match inner.entries.get(id) {
                Some(entry) if entry.payout_batch_id.is_none() => {}
                Some(entry) => {
                    return Err(EngineError::InvariantViolation(format!(
                        "entry {} already assigned to batch {:?}",
                        id, entry.payout_batch_id
                    )));
                }
                None => {
                    return Err(EngineError::InvariantViolation(format!(
                        "entry {} not found during batch assignment",
                        id
                    )));
                }
            }
        }

        let mut total = 0i64;
        for id in entry_ids {
            if let Some(entry) = inner.entries.get_mut(id) {
                entry.payout_batch_id = Some(batch_id.to_string());
                total += entry.amount_cents;
            }
        }

        Ok(total)
    }
}
