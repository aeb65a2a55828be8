//! Audit Log
//!
//! Append-only record of every moderation transition and payout action.
//! Nothing reads it for control flow; it exists for compliance export and
//! operator visibility. Entries are mirrored into `tracing` as they land and
//! retained in a bounded in-memory deque, time-ordered, retrievable by
//! content id or user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::content::ContentStatus;

/// Auditable engine events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditEvent {
    ModerationTransition {
        content_id: String,
        /// None for system-initiated (AI) transitions.
        actor_id: Option<String>,
        from: ContentStatus,
        to: ContentStatus,
        reason: String,
    },
    PayoutAssigned {
        user_id: String,
        batch_id: String,
        amount_cents: i64,
        entry_count: usize,
    },
    BatchClosed {
        batch_id: String,
        period_id: String,
        total_cents: i64,
    },
    BatchExported {
        batch_id: String,
        csv_sha256: String,
    },
    InvariantViolation {
        detail: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuditSeverity {
    Info = 0,
    Warning = 1,
    Critical = 2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    pub severity: AuditSeverity,
}

impl AuditRecord {
    fn new(event: AuditEvent, severity: AuditSeverity) -> Self {
        Self {
            id: format!("audit_{}", Uuid::new_v4()),
            timestamp: Utc::now(),
            event,
            severity,
        }
    }

    fn mentions_content(&self, content_id: &str) -> bool {
        matches!(
            &self.event,
            AuditEvent::ModerationTransition { content_id: c, .. } if c == content_id
        )
    }

    fn mentions_user(&self, user_id: &str) -> bool {
        matches!(
            &self.event,
            AuditEvent::PayoutAssigned { user_id: u, .. } if u == user_id
        ) || matches!(
            &self.event,
            AuditEvent::ModerationTransition { actor_id: Some(a), .. } if a == user_id
        )
    }
}

pub struct AuditLog {
    entries: Arc<RwLock<VecDeque<AuditRecord>>>,
    max_entries: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries: 100_000,
        }
    }

    pub async fn record(&self, event: AuditEvent, severity: AuditSeverity) {
        match severity {
            AuditSeverity::Info => tracing::info!("AUDIT: {:?}", event),
            AuditSeverity::Warning => tracing::warn!("AUDIT: {:?}", event),
            AuditSeverity::Critical => tracing::error!("AUDIT CRITICAL: {:?}", event),
        }

        let mut entries = self.entries.write().await;
        entries.push_back(AuditRecord::new(event, severity));

        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }

    /// Most recent records, newest first.
    pub async fn recent(&self, count: usize) -> Vec<AuditRecord> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(count).cloned().collect()
    }

    /// Time-ordered records touching one content item.
    pub async fn for_content(&self, content_id: &str) -> Vec<AuditRecord> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|r| r.mentions_content(content_id))
            .cloned()
            .collect()
    }

    /// Time-ordered records touching one user.
    pub async fn for_user(&self, user_id: &str) -> Vec<AuditRecord> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|r| r.mentions_user(user_id))
            .cloned()
            .collect()
    }

    /// JSON compliance export for one user, consumed by the external
    /// GDPR/export collaborator.
    pub async fn compliance_export(&self, user_id: &str) -> serde_json::Value {
        let records = self.for_user(user_id).await;
        serde_json::json!({
            "user_id": user_id,
            "record_count": records.len(),
            "records": records,
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_query_by_content() {
        let log = AuditLog::new();

        log.record(
            AuditEvent::ModerationTransition {
                content_id: "topic_1".to_string(),
                actor_id: Some("mod_1".to_string()),
                from: ContentStatus::Visible,
                to: ContentStatus::Quarantined,
                reason: "repeated reports".to_string(),
            },
            AuditSeverity::Warning,
        )
        .await;

        log.record(
            AuditEvent::BatchClosed {
                batch_id: "batch_1".to_string(),
                period_id: "2025-02B".to_string(),
                total_cents: 1240,
            },
            AuditSeverity::Info,
        )
        .await;

        assert_eq!(log.len().await, 2);
        assert_eq!(log.for_content("topic_1").await.len(), 1);
        assert_eq!(log.for_user("mod_1").await.len(), 1);
        assert!(log.for_content("topic_2").await.is_empty());
    }

    #[tokio::test]
    async fn test_query_by_payout_user() {
        let log = AuditLog::new();

        log.record(
            AuditEvent::PayoutAssigned {
                user_id: "alice".to_string(),
                batch_id: "batch_1".to_string(),
                amount_cents: 1240,
                entry_count: 3,
            },
            AuditSeverity::Info,
        )
        .await;

        assert_eq!(log.for_user("alice").await.len(), 1);
        assert!(log.for_user("bob").await.is_empty());

        let export = log.compliance_export("alice").await;
        assert_eq!(export["record_count"], 1);
        assert_eq!(export["records"][0]["event"]["PayoutAssigned"]["user_id"], "alice");
    }
}
