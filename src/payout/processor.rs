//! Batch runs: eligibility, minimum threshold, atomic commit, export.

use chrono::Utc;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::audit::{AuditEvent, AuditLog, AuditSeverity};
use crate::config::PayoutConfig;
use crate::earnings::{EarningsLedgerEntry, EarningsStore};
use crate::error::EngineError;
use crate::fraud::FraudScorer;
use crate::identity::IdentityProvider;
use crate::payout::batch::{BatchStatus, PayoutBatch};
use crate::payout::export::{build_csv, csv_sha256, ExportSink};

pub struct PayoutProcessor {
    earnings: Arc<EarningsStore>,
    identity: Arc<dyn IdentityProvider>,
    fraud: Arc<FraudScorer>,
    audit: Arc<AuditLog>,
    sink: Arc<dyn ExportSink>,
    config: PayoutConfig,
    batches: RwLock<HashMap<String, PayoutBatch>>,
    /// Serializes batch runs; assignment is additionally guarded by the
    /// store's unassigned-only conditional write.
    run_lock: Mutex<()>,
}

impl PayoutProcessor {
    pub fn new(
        earnings: Arc<EarningsStore>,
        identity: Arc<dyn IdentityProvider>,
        fraud: Arc<FraudScorer>,
        audit: Arc<AuditLog>,
        sink: Arc<dyn ExportSink>,
        config: PayoutConfig,
    ) -> Self {
        Self {
            earnings,
            identity,
            fraud,
            audit,
            sink,
            config,
            batches: RwLock::new(HashMap::new()),
            run_lock: Mutex::new(()),
        }
    }

    /// Run the payout batch for a period. Idempotent on `period_id`: if the
    /// period's batch is already closed or exported, it is returned
    /// unchanged and no entry is touched.
    pub async fn run_batch(&self, period_id: &str) -> Result<PayoutBatch, EngineError> {
        let _run = self.run_lock.lock().await;

        {
            let batches = self.batches.read().await;
            if let Some(existing) = batches.get(period_id) {
                if matches!(existing.status, BatchStatus::Closed | BatchStatus::Exported) {
                    info!(period_id = %period_id, batch_id = %existing.id, "Batch already exists for period");
                    return Ok(existing.clone());
                }
            }
        }

        // Step 1: eligibility filter over unassigned entries.
        let mut by_user: BTreeMap<String, Vec<EarningsLedgerEntry>> = BTreeMap::new();
        for entry in self.earnings.unassigned().await {
            by_user.entry(entry.user_id.clone()).or_default().push(entry);
        }

        let mut included: Vec<EarningsLedgerEntry> = Vec::new();
        let mut per_user: Vec<(String, i64, usize)> = Vec::new();

        for (user_id, entries) in by_user {
            let user = match self.identity.user(&user_id) {
                Some(user) => user,
                None => {
                    warn!(user_id = %user_id, "Earnings entries for unknown user skipped");
                    continue;
                }
            };

            if !user.kyc_verified {
                continue;
            }

            if self.fraud.blocks_payout(&user_id).await {
                info!(
                    user_id = %user_id,
                    score = self.fraud.score(&user_id).await,
                    "User excluded from payout: fraud score above threshold"
                );
                continue;
            }

            // Step 2: minimum threshold per user; below-minimum balances
            // carry forward unassigned.
            let sum: i64 = entries.iter().map(|e| e.amount_cents).sum();
            if sum < self.config.minimum_payout_cents {
                continue;
            }

            per_user.push((user_id, sum, entries.len()));
            included.extend(entries);
        }

        // Step 3: atomic commit. Conditional assignment fails the whole run
        // (without partial writes) if any entry was claimed concurrently.
        let period_start = included
            .iter()
            .map(|e| e.computed_at)
            .min()
            .unwrap_or_else(Utc::now);
        let period_end = included
            .iter()
            .map(|e| e.computed_at)
            .max()
            .unwrap_or_else(Utc::now);

        let mut batch = PayoutBatch::new(period_id, period_start, period_end);

        let entry_ids: Vec<String> = included.iter().map(|e| e.id.clone()).collect();
        let total = if entry_ids.is_empty() {
            0
        } else {
            match self.earnings.assign_batch(&entry_ids, &batch.id).await {
                Ok(total) => total,
                Err(e) => {
                    self.audit
                        .record(
                            AuditEvent::InvariantViolation {
                                detail: format!("batch assignment failed for {}: {}", period_id, e),
                            },
                            AuditSeverity::Critical,
                        )
                        .await;
                    return Err(e);
                }
            }
        };

        batch.total_cents = total;
        batch.status = BatchStatus::Closed;

        for (user_id, amount_cents, entry_count) in &per_user {
            self.audit
                .record(
                    AuditEvent::PayoutAssigned {
                        user_id: user_id.clone(),
                        batch_id: batch.id.clone(),
                        amount_cents: *amount_cents,
                        entry_count: *entry_count,
                    },
                    AuditSeverity::Info,
                )
                .await;
        }

        self.audit
            .record(
                AuditEvent::BatchClosed {
                    batch_id: batch.id.clone(),
                    period_id: period_id.to_string(),
                    total_cents: total,
                },
                AuditSeverity::Info,
            )
            .await;

        info!(
            period_id = %period_id,
            batch_id = %batch.id,
            total_cents = total,
            users = per_user.len(),
            "Payout batch closed"
        );

        // Step 4: export. A delivery failure leaves the batch Closed; the
        // export is retried independently via retry_export.
        let csv = build_csv(&batch.id, period_id, &included);
        let digest = csv_sha256(&csv);
        batch.csv_sha256 = Some(digest.clone());

        match self.sink.deliver(period_id, &csv) {
            Ok(()) => {
                batch.status = BatchStatus::Exported;
                self.audit
                    .record(
                        AuditEvent::BatchExported {
                            batch_id: batch.id.clone(),
                            csv_sha256: digest,
                        },
                        AuditSeverity::Info,
                    )
                    .await;
            }
            Err(e) => {
                warn!(period_id = %period_id, error = %e, "Payout export delivery failed; batch stays closed");
            }
        }

        let mut batches = self.batches.write().await;
        batches.insert(period_id.to_string(), batch.clone());

        Ok(batch)
    }

    /// Retry step 4 alone for a closed batch. No-op for exported batches.
    pub async fn retry_export(&self, period_id: &str) -> Result<PayoutBatch, EngineError> {
        let _run = self.run_lock.lock().await;

        let batch = {
            let batches = self.batches.read().await;
            batches
                .get(period_id)
                .cloned()
                .ok_or_else(|| EngineError::Storage(format!("no batch for period {}", period_id)))?
        };

        if batch.status == BatchStatus::Exported {
            return Ok(batch);
        }

        let entries = self.earnings.entries_for_batch(&batch.id).await;
        let csv = build_csv(&batch.id, period_id, &entries);
        let digest = csv_sha256(&csv);

        if let Some(stored) = &batch.csv_sha256 {
            if *stored != digest {
                let detail = format!(
                    "export digest mismatch for batch {}: stored {}, rebuilt {}",
                    batch.id, stored, digest
                );
                self.audit
                    .record(
                        AuditEvent::InvariantViolation {
                            detail: detail.clone(),
                        },
                        AuditSeverity::Critical,
                    )
                    .await;
                return Err(EngineError::InvariantViolation(detail));
            }
        }

        self.sink
            .deliver(period_id, &csv)
            .map_err(|e| EngineError::Storage(format!("export delivery failed: {}", e)))?;

        let mut updated = batch;
        updated.status = BatchStatus::Exported;
        updated.csv_sha256 = Some(digest.clone());

        self.audit
            .record(
                AuditEvent::BatchExported {
                    batch_id: updated.id.clone(),
                    csv_sha256: digest,
                },
                AuditSeverity::Info,
            )
            .await;

        let mut batches = self.batches.write().await;
        batches.insert(period_id.to_string(), updated.clone());

        Ok(updated)
    }

    pub async fn batch_for_period(&self, period_id: &str) -> Option<PayoutBatch> {
        self.batches.read().await.get(period_id).cloned()
    }
}
