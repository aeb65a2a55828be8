//! Threshold-crossing recomputation.

use std::sync::Arc;
use tracing::debug;

use crate::config::EarningsRates;
use crate::content::ContentRegistry;
use crate::earnings::entry::{EarningsLedgerEntry, EarningsStore, RateRule};
use crate::error::EngineError;

/// Recomputes realized earnings for a content item from its current
/// counters. Safe to invoke after every accepted event or batched
/// periodically; both schedules produce identical ledger contents because
/// entry creation is keyed by threshold index.
pub struct EarningsCalculator {
    registry: Arc<ContentRegistry>,
    store: Arc<EarningsStore>,
    rates: EarningsRates,
}

impl EarningsCalculator {
    pub fn new(
        registry: Arc<ContentRegistry>,
        store: Arc<EarningsStore>,
        rates: EarningsRates,
    ) -> Self {
        Self {
            registry,
            store,
            rates,
        }
    }

    /// Create one entry per newly crossed, not-yet-paid threshold and return
    /// the entries created by this call. Re-running with unchanged counters
    /// returns an empty vec.
    ///
    /// A failure here never rolls back ledger counters; callers retry
    /// independently (at-least-once) and idempotence does the rest.
    pub async fn recompute(
        &self,
        content_id: &str,
    ) -> Result<Vec<EarningsLedgerEntry>, EngineError> {
        let item = self.registry.get(content_id).await?;

        let lock = self.registry.lock_for(content_id);
        let _guard = lock.lock().await;

        let mut created = Vec::new();

        for (rule, counter, divisor, cents) in [
            (
                RateRule::Likes,
                item.counters.likes,
                self.rates.like_divisor,
                self.rates.like_cents,
            ),
            (
                RateRule::Replies,
                item.counters.replies,
                self.rates.reply_divisor,
                self.rates.reply_cents,
            ),
        ] {
            let new_index = counter / divisor;

            for index in 1..=new_index {
                let entry = EarningsLedgerEntry::new(
                    // Recipient is the author at entry-creation time.
                    item.author_id.clone(),
                    content_id,
                    rule,
                    index,
                    cents,
                );

                if self.store.insert_if_unpaid(entry.clone()).await {
                    debug!(
                        content_id = %content_id,
                        rule = ?rule,
                        threshold_index = index,
                        amount_cents = cents,
                        user_id = %entry.user_id,
                        "Earnings entry created"
                    );
                    created.push(entry);
                }
            }
        }

        Ok(created)
    }
}
