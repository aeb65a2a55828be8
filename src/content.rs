//! Content registry and per-content serialization.
//!
//! The content store owns text and authorship; the engine tracks only the
//! identity, engagement counters, and visibility status of each item.
//! Counters are owned by the engagement ledger and the status field by the
//! moderation state machine; both mutate through this registry under a
//! per-content lock so read-modify-write sequences never interleave for the
//! same item. Different content ids proceed fully in parallel.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Topic,
    Comment,
}

/// Visibility status. `Visible` is initial and reachable from every other
/// state via an approval action; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentStatus {
    Visible,
    HiddenByAi,
    HiddenByMod,
    Quarantined,
}

/// Monotone engagement counter snapshot for one content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub likes: u64,
    pub replies: u64,
    pub views: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub kind: ContentKind,
    pub author_id: String,
    pub status: ContentStatus,
    pub counters: Counters,
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, kind: ContentKind, author_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            author_id: author_id.into(),
            status: ContentStatus::Visible,
            counters: Counters::default(),
            created_at: Utc::now(),
        }
    }
}

/// Shared registry of content items known to the engine.
pub struct ContentRegistry {
    items: RwLock<HashMap<String, ContentItem>>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Default for ContentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            locks: DashMap::new(),
        }
    }

    pub async fn register(&self, item: ContentItem) {
        let mut items = self.items.write().await;
        items.insert(item.id.clone(), item);
    }

    pub async fn get(&self, content_id: &str) -> Result<ContentItem, EngineError> {
        let items = self.items.read().await;
        items
            .get(content_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownContent {
                content_id: content_id.to_string(),
            })
    }

    pub async fn contains(&self, content_id: &str) -> bool {
        self.items.read().await.contains_key(content_id)
    }

    /// Per-content mutex. All counter and status mutations for one item are
    /// serialized through this lock.
    pub fn lock_for(&self, content_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(content_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Apply a mutation to one item. Callers must hold the item's lock when
    /// the mutation is part of a read-modify-write sequence.
    pub async fn update<F>(&self, content_id: &str, f: F) -> Result<ContentItem, EngineError>
    where
        F: FnOnce(&mut ContentItem),
    {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(content_id)
            .ok_or_else(|| EngineError::UnknownContent {
                content_id: content_id.to_string(),
            })?;
        f(item);
        Ok(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = ContentRegistry::new();
        registry
            .register(ContentItem::new("topic_1", ContentKind::Topic, "alice"))
            .await;

        let item = registry.get("topic_1").await.unwrap();
        assert_eq!(item.status, ContentStatus::Visible);
        assert_eq!(item.counters, Counters::default());

        let err = registry.get("topic_missing").await.unwrap_err();
        assert!(matches!(err, EngineError::UnknownContent { .. }));
    }

    #[tokio::test]
    async fn test_update_counters() {
        let registry = ContentRegistry::new();
        registry
            .register(ContentItem::new("topic_1", ContentKind::Topic, "alice"))
            .await;

        let updated = registry
            .update("topic_1", |item| item.counters.likes += 5)
            .await
            .unwrap();
        assert_eq!(updated.counters.likes, 5);
    }

    #[tokio::test]
    async fn test_lock_is_stable_per_content() {
        let registry = ContentRegistry::new();
        let a = registry.lock_for("topic_1");
        let b = registry.lock_for("topic_1");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
