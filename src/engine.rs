//! Engine facade.
//!
//! Wires the ledger, fraud scorer, earnings calculator, moderation machine,
//! payout processor, and audit log from one `EngineConfig`, and mirrors
//! committed writes to PostgreSQL when a database is attached. The
//! in-memory state stays authoritative; durable mirroring is best-effort
//! and logged on failure, since every write path is idempotent and can be
//! replayed.

use std::sync::Arc;
use tracing::warn;

use crate::audit::AuditLog;
use crate::config::EngineConfig;
use crate::content::{ContentItem, ContentRegistry, ContentStatus};
use crate::earnings::{EarningsCalculator, EarningsLedgerEntry, EarningsStore};
use crate::error::EngineError;
use crate::fraud::{FraudScorer, FraudSignal, SignalKind};
use crate::identity::IdentityProvider;
use crate::ledger::{EngagementEvent, EngagementLedger, IngestOutcome};
use crate::moderation::{ModerationAction, ModerationMachine};
use crate::notify::{NotificationSink, NullNotificationSink};
use crate::payout::{ExportSink, NullExportSink, PayoutBatch, PayoutProcessor};
use crate::store::DatabasePool;

pub struct ForumEngine {
    registry: Arc<ContentRegistry>,
    ledger: EngagementLedger,
    fraud: Arc<FraudScorer>,
    earnings: Arc<EarningsStore>,
    calculator: EarningsCalculator,
    moderation: ModerationMachine,
    payouts: PayoutProcessor,
    audit: Arc<AuditLog>,
    db: Option<Arc<DatabasePool>>,
}

impl ForumEngine {
    /// Build an engine with no external sinks attached.
    pub fn new(config: EngineConfig, identity: Arc<dyn IdentityProvider>) -> Self {
        Self::with_sinks(
            config,
            identity,
            Arc::new(NullNotificationSink),
            Arc::new(NullExportSink),
        )
    }

    pub fn with_sinks(
        config: EngineConfig,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn NotificationSink>,
        export_sink: Arc<dyn ExportSink>,
    ) -> Self {
        let registry = Arc::new(ContentRegistry::new());
        let audit = Arc::new(AuditLog::new());
        let earnings = Arc::new(EarningsStore::new());
        let fraud = Arc::new(FraudScorer::new(config.fraud.clone()));

        let ledger = EngagementLedger::new(registry.clone());
        let calculator = EarningsCalculator::new(
            registry.clone(),
            earnings.clone(),
            config.earnings.clone(),
        );
        let moderation = ModerationMachine::new(
            registry.clone(),
            identity.clone(),
            audit.clone(),
            notifier,
            config.moderation.clone(),
        );
        let payouts = PayoutProcessor::new(
            earnings.clone(),
            identity,
            fraud.clone(),
            audit.clone(),
            export_sink,
            config.payout.clone(),
        );

        Self {
            registry,
            ledger,
            fraud,
            earnings,
            calculator,
            moderation,
            payouts,
            audit,
            db: None,
        }
    }

    /// Attach a durable store; subsequent writes are mirrored to it.
    pub fn with_database(mut self, db: Arc<DatabasePool>) -> Self {
        self.db = Some(db);
        self
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Register a content item from the external content store.
    pub async fn register_content(&self, item: ContentItem) {
        self.registry.register(item).await;
    }

    pub async fn content(&self, content_id: &str) -> Result<ContentItem, EngineError> {
        self.registry.get(content_id).await
    }

    // ------------------------------------------------------------------
    // Engagement ingestion and earnings
    // ------------------------------------------------------------------

    /// Ingest one engagement event and, when accepted, recompute earnings
    /// for the touched content. A recompute failure is logged and left to
    /// the caller's retry schedule; the counter update is never rolled back.
    pub async fn ingest(&self, event: EngagementEvent) -> Result<IngestOutcome, EngineError> {
        let persisted = event.clone();
        let content_id = event.content_id.clone();

        let outcome = self.ledger.ingest(event).await?;

        if outcome.accepted {
            if let Some(db) = &self.db {
                if let Err(e) = db.events().insert(&persisted).await {
                    warn!(event_id = %persisted.id, error = %e, "Event persistence failed");
                }
            }

            if let Err(e) = self.recompute(&content_id).await {
                warn!(content_id = %content_id, error = %e, "Earnings recompute failed after ingest");
            }
        }

        Ok(outcome)
    }

    /// Recompute earnings for one content item.
    pub async fn recompute(
        &self,
        content_id: &str,
    ) -> Result<Vec<EarningsLedgerEntry>, EngineError> {
        let created = self.calculator.recompute(content_id).await?;

        if let Some(db) = &self.db {
            for entry in &created {
                if let Err(e) = db.earnings().insert(entry).await {
                    warn!(entry_id = %entry.id, error = %e, "Earnings entry persistence failed");
                }
            }
        }

        Ok(created)
    }

    pub async fn earnings_for_user(&self, user_id: &str) -> Vec<EarningsLedgerEntry> {
        self.earnings.entries_for_user(user_id).await
    }

    pub async fn earnings_for_content(&self, content_id: &str) -> Vec<EarningsLedgerEntry> {
        self.earnings.entries_for_content(content_id).await
    }

    // ------------------------------------------------------------------
    // Fraud
    // ------------------------------------------------------------------

    pub async fn observe_signal(&self, user_id: &str, kind: SignalKind) -> FraudSignal {
        self.fraud.observe(user_id, kind).await
    }

    pub async fn fraud_score(&self, user_id: &str) -> u32 {
        self.fraud.score(user_id).await
    }

    pub async fn is_high_risk(&self, user_id: &str) -> bool {
        self.fraud.is_high_risk(user_id).await
    }

    // ------------------------------------------------------------------
    // Moderation
    // ------------------------------------------------------------------

    pub async fn transition(
        &self,
        content_id: &str,
        to: ContentStatus,
        actor_id: &str,
        reason: &str,
    ) -> Result<ContentStatus, EngineError> {
        let action = self
            .moderation
            .transition(content_id, to, actor_id, reason)
            .await?;
        self.persist_action(&action).await;
        Ok(action.to_status)
    }

    pub async fn auto_hide(
        &self,
        content_id: &str,
        confidence: f64,
    ) -> Result<Option<ContentStatus>, EngineError> {
        match self.moderation.auto_hide(content_id, confidence).await? {
            Some(action) => {
                self.persist_action(&action).await;
                Ok(Some(action.to_status))
            }
            None => Ok(None),
        }
    }

    async fn persist_action(&self, action: &ModerationAction) {
        if let Some(db) = &self.db {
            if let Err(e) = db.moderation().record_transition(action).await {
                warn!(content_id = %action.content_id, error = %e, "Moderation persistence failed");
            }
        }
    }

    pub async fn moderation_history(&self, content_id: &str) -> Vec<ModerationAction> {
        self.moderation.history(content_id).await
    }

    // ------------------------------------------------------------------
    // Payouts
    // ------------------------------------------------------------------

    pub async fn run_batch(&self, period_id: &str) -> Result<PayoutBatch, EngineError> {
        let batch = self.payouts.run_batch(period_id).await?;

        if let Some(db) = &self.db {
            if let Err(e) = db.payouts().upsert(&batch).await {
                warn!(batch_id = %batch.id, error = %e, "Batch persistence failed");
            }
            let ids: Vec<String> = self
                .earnings
                .entries_for_batch(&batch.id)
                .await
                .into_iter()
                .map(|e| e.id)
                .collect();
            if !ids.is_empty() {
                if let Err(e) = db.earnings().assign_batch(&ids, &batch.id).await {
                    warn!(batch_id = %batch.id, error = %e, "Batch assignment persistence failed");
                }
            }
        }

        Ok(batch)
    }

    pub async fn retry_export(&self, period_id: &str) -> Result<PayoutBatch, EngineError> {
        let batch = self.payouts.retry_export(period_id).await?;

        if let Some(db) = &self.db {
            if let Err(e) = db.payouts().upsert(&batch).await {
                warn!(batch_id = %batch.id, error = %e, "Batch persistence failed");
            }
        }

        Ok(batch)
    }

    pub async fn batch_for_period(&self, period_id: &str) -> Option<PayoutBatch> {
        self.payouts.batch_for_period(period_id).await
    }

    // ------------------------------------------------------------------
    // Audit
    // ------------------------------------------------------------------

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }
}
