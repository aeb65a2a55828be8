//! Idempotent event ingestion.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::content::{ContentRegistry, Counters};
use crate::error::EngineError;
use crate::ledger::event::{EngagementEvent, EventKind};

/// Result of one ingestion attempt. A replayed event id returns
/// `accepted = false` together with the counter snapshot recorded when the
/// event was first applied, so callers may retry blindly without double
/// counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub accepted: bool,
    pub counters: Counters,
}

/// Append-only engagement ledger. Events for the same content id are
/// serialized through the registry's per-content lock; events for different
/// content proceed in parallel.
pub struct EngagementLedger {
    registry: Arc<ContentRegistry>,
    /// Event id -> counter snapshot at first acceptance.
    seen: DashMap<String, Counters>,
    /// Accepted events in arrival order.
    events: RwLock<Vec<EngagementEvent>>,
}

impl EngagementLedger {
    pub fn new(registry: Arc<ContentRegistry>) -> Self {
        Self {
            registry,
            seen: DashMap::new(),
            events: RwLock::new(Vec::new()),
        }
    }

    /// Ingest one engagement event.
    ///
    /// Atomically applies the event's counter delta to the referenced content
    /// item and returns the new counter snapshot. Re-ingesting a previously
    /// seen event id is a no-op returning the original effect.
    pub async fn ingest(&self, event: EngagementEvent) -> Result<IngestOutcome, EngineError> {
        if !self.registry.contains(&event.content_id).await {
            return Err(EngineError::UnknownContent {
                content_id: event.content_id,
            });
        }

        let lock = self.registry.lock_for(&event.content_id);
        let _guard = lock.lock().await;

        if let Some(snapshot) = self.seen.get(&event.id) {
            debug!(event_id = %event.id, "Duplicate engagement event ignored");
            return Ok(IngestOutcome {
                accepted: false,
                counters: *snapshot,
            });
        }

        let updated = self
            .registry
            .update(&event.content_id, |item| {
                let c = &mut item.counters;
                match event.kind {
                    EventKind::Like => c.likes += 1,
                    // Counters floor at zero; an unlike below zero clamps.
                    EventKind::Unlike => c.likes = c.likes.saturating_sub(1),
                    EventKind::Reply => c.replies += 1,
                    EventKind::View => c.views += 1,
                }
            })
            .await?;

        self.seen.insert(event.id.clone(), updated.counters);

        debug!(
            event_id = %event.id,
            content_id = %event.content_id,
            kind = ?event.kind,
            likes = updated.counters.likes,
            replies = updated.counters.replies,
            views = updated.counters.views,
            "Engagement event accepted"
        );

        let mut events = self.events.write().await;
        events.push(event);

        Ok(IngestOutcome {
            accepted: true,
            counters: updated.counters,
        })
    }

    /// Accepted events for one content item, in arrival order.
    pub async fn events_for(&self, content_id: &str) -> Vec<EngagementEvent> {
        let events = self.events.read().await;
        events
            .iter()
            .filter(|e| e.content_id == content_id)
            .cloned()
            .collect()
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentItem, ContentKind};

    async fn setup() -> (Arc<ContentRegistry>, EngagementLedger) {
        let registry = Arc::new(ContentRegistry::new());
        registry
            .register(ContentItem::new("topic_1", ContentKind::Topic, "alice"))
            .await;
        let ledger = EngagementLedger::new(registry.clone());
        (registry, ledger)
    }

    #[tokio::test]
    async fn test_ingest_increments_counters() {
        let (registry, ledger) = setup().await;

        let outcome = ledger
            .ingest(EngagementEvent::new("ev_1", "topic_1", "bob", EventKind::Like))
            .await
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.counters.likes, 1);

        ledger
            .ingest(EngagementEvent::new("ev_2", "topic_1", "carol", EventKind::Reply))
            .await
            .unwrap();
        ledger
            .ingest(EngagementEvent::new("ev_3", "topic_1", "dave", EventKind::View))
            .await
            .unwrap();

        let item = registry.get("topic_1").await.unwrap();
        assert_eq!(item.counters.likes, 1);
        assert_eq!(item.counters.replies, 1);
        assert_eq!(item.counters.views, 1);
    }

    #[tokio::test]
    async fn test_duplicate_event_is_idempotent() {
        let (registry, ledger) = setup().await;

        let first = ledger
            .ingest(EngagementEvent::new("ev_1", "topic_1", "bob", EventKind::Like))
            .await
            .unwrap();
        assert!(first.accepted);

        let replay = ledger
            .ingest(EngagementEvent::new("ev_1", "topic_1", "bob", EventKind::Like))
            .await
            .unwrap();
        assert!(!replay.accepted);
        assert_eq!(replay.counters, first.counters);

        let item = registry.get("topic_1").await.unwrap();
        assert_eq!(item.counters.likes, 1);
    }

    #[tokio::test]
    async fn test_unlike_floors_at_zero() {
        let (registry, ledger) = setup().await;

        let outcome = ledger
            .ingest(EngagementEvent::new("ev_1", "topic_1", "bob", EventKind::Unlike))
            .await
            .unwrap();
        assert_eq!(outcome.counters.likes, 0);

        let item = registry.get("topic_1").await.unwrap();
        assert_eq!(item.counters.likes, 0);
    }

    #[tokio::test]
    async fn test_unknown_content_rejected() {
        let (_registry, ledger) = setup().await;

        let err = ledger
            .ingest(EngagementEvent::new("ev_1", "topic_missing", "bob", EventKind::Like))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownContent { .. }));
        assert_eq!(ledger.event_count().await, 0);
    }
}
