//! Transition execution and action history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{AuditEvent, AuditLog, AuditSeverity};
use crate::config::ModerationConfig;
use crate::content::{ContentRegistry, ContentStatus};
use crate::error::EngineError;
use crate::identity::IdentityProvider;
use crate::moderation::transition::{required_actor, ActorRequirement};
use crate::notify::{ModerationNotice, NotificationSink};

/// One committed status transition. Append-only; replaying an item's actions
/// from the start always reproduces its current status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationAction {
    pub id: String,
    pub content_id: String,
    /// None for system (classifier) transitions.
    pub actor_id: Option<String>,
    pub from_status: ContentStatus,
    pub to_status: ContentStatus,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

pub struct ModerationMachine {
    registry: Arc<ContentRegistry>,
    identity: Arc<dyn IdentityProvider>,
    audit: Arc<AuditLog>,
    notifier: Arc<dyn NotificationSink>,
    actions: RwLock<Vec<ModerationAction>>,
    config: ModerationConfig,
}

impl ModerationMachine {
    pub fn new(
        registry: Arc<ContentRegistry>,
        identity: Arc<dyn IdentityProvider>,
        audit: Arc<AuditLog>,
        notifier: Arc<dyn NotificationSink>,
        config: ModerationConfig,
    ) -> Self {
        Self {
            registry,
            identity,
            audit,
            notifier,
            actions: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Execute a human-initiated transition and return the committed action.
    ///
    /// On success the status update and the action append are committed
    /// together under the content lock. On rejection nothing changes and no
    /// history row is written.
    pub async fn transition(
        &self,
        content_id: &str,
        to: ContentStatus,
        actor_id: &str,
        reason: &str,
    ) -> Result<ModerationAction, EngineError> {
        let actor = self
            .identity
            .user(actor_id)
            .ok_or_else(|| EngineError::UnknownUser {
                user_id: actor_id.to_string(),
            })?;

        let lock = self.registry.lock_for(content_id);
        let _guard = lock.lock().await;

        let from = self.registry.get(content_id).await?.status;

        let requirement =
            required_actor(from, to).ok_or(EngineError::IllegalTransition { from, to })?;

        if !requirement.satisfied_by(actor.role) {
            return Err(EngineError::InsufficientPrivilege {
                role: actor.role,
                from,
                to,
            });
        }

        self.commit(content_id, Some(actor_id.to_string()), from, to, reason)
            .await
    }

    /// System path for `Visible -> HiddenByAi`, driven by an external
    /// classifier confidence score. Below-threshold confidence and
    /// already-hidden content are both quiet no-ops so classifier races
    /// never surface as errors.
    pub async fn auto_hide(
        &self,
        content_id: &str,
        confidence: f64,
    ) -> Result<Option<ModerationAction>, EngineError> {
        if confidence < self.config.auto_hide_confidence {
            return Ok(None);
        }

        let lock = self.registry.lock_for(content_id);
        let _guard = lock.lock().await;

        let from = self.registry.get(content_id).await?.status;
        if !matches!(
            required_actor(from, ContentStatus::HiddenByAi),
            Some(ActorRequirement::System)
        ) {
            return Ok(None);
        }

        let reason = format!("classifier confidence {:.3}", confidence);
        let action = self
            .commit(content_id, None, from, ContentStatus::HiddenByAi, &reason)
            .await?;
        Ok(Some(action))
    }

    async fn commit(
        &self,
        content_id: &str,
        actor_id: Option<String>,
        from: ContentStatus,
        to: ContentStatus,
        reason: &str,
    ) -> Result<ModerationAction, EngineError> {
        self.registry
            .update(content_id, |item| item.status = to)
            .await?;

        let action = ModerationAction {
            id: format!("mod_{}", Uuid::new_v4()),
            content_id: content_id.to_string(),
            actor_id: actor_id.clone(),
            from_status: from,
            to_status: to,
            reason: reason.to_string(),
            occurred_at: Utc::now(),
        };

        {
            let mut actions = self.actions.write().await;
            actions.push(action.clone());
        }

        info!(
            content_id = %content_id,
            actor = ?actor_id,
            from = ?from,
            to = ?to,
            reason = %reason,
            "Moderation transition committed"
        );

        self.audit
            .record(
                AuditEvent::ModerationTransition {
                    content_id: content_id.to_string(),
                    actor_id,
                    from,
                    to,
                    reason: reason.to_string(),
                },
                AuditSeverity::Info,
            )
            .await;

        // Best-effort notification; delivery failure never unwinds the
        // committed transition.
        let notice = ModerationNotice {
            content_id: content_id.to_string(),
            from,
            to,
            reason: reason.to_string(),
        };
        if let Err(e) = self.notifier.notify(notice) {
            warn!(content_id = %content_id, error = %e, "Moderation notification delivery failed");
        }

        Ok(action)
    }

    /// Action history for one content item, oldest first.
    pub async fn history(&self, content_id: &str) -> Vec<ModerationAction> {
        let actions = self.actions.read().await;
        actions
            .iter()
            .filter(|a| a.content_id == content_id)
            .cloned()
            .collect()
    }

    /// Replay an item's history from the initial state. Used by invariant
    /// checks: the result must always match the item's current status.
    pub async fn replay_status(&self, content_id: &str) -> ContentStatus {
        let mut status = ContentStatus::Visible;
        for action in self.history(content_id).await {
            status = action.to_status;
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentItem, ContentKind};
    use crate::identity::{InMemoryIdentityProvider, Role, User};
    use crate::notify::RecordingNotificationSink;

    struct Fixture {
        registry: Arc<ContentRegistry>,
        sink: Arc<RecordingNotificationSink>,
        machine: ModerationMachine,
    }

    async fn setup() -> Fixture {
        let registry = Arc::new(ContentRegistry::new());
        registry
            .register(ContentItem::new("topic_1", ContentKind::Topic, "alice"))
            .await;

        let identity = InMemoryIdentityProvider::shared();
        identity.upsert(User::new("user_1", Role::User, true));
        identity.upsert(User::new("mod_1", Role::AdminL1, true));
        identity.upsert(User::new("owner_1", Role::Owner, true));

        let sink = Arc::new(RecordingNotificationSink::new());
        let machine = ModerationMachine::new(
            registry.clone(),
            identity,
            Arc::new(AuditLog::new()),
            sink.clone(),
            ModerationConfig::default(),
        );

        Fixture {
            registry,
            sink,
            machine,
        }
    }

    #[tokio::test]
    async fn test_moderator_quarantines_visible_content() {
        let f = setup().await;

        let action = f
            .machine
            .transition("topic_1", ContentStatus::Quarantined, "mod_1", "repeated reports")
            .await
            .unwrap();
        assert_eq!(action.to_status, ContentStatus::Quarantined);
        assert_eq!(action.from_status, ContentStatus::Visible);
        assert_eq!(
            f.registry.get("topic_1").await.unwrap().status,
            ContentStatus::Quarantined
        );

        let history = f.machine.history("topic_1").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].actor_id.as_deref(), Some("mod_1"));

        let notices = f.sink.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].to, ContentStatus::Quarantined);
    }

    #[tokio::test]
    async fn test_quarantine_lift_requires_owner() {
        let f = setup().await;
        f.machine
            .transition("topic_1", ContentStatus::Quarantined, "mod_1", "escalation")
            .await
            .unwrap();

        let err = f
            .machine
            .transition("topic_1", ContentStatus::Visible, "mod_1", "appeal accepted")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientPrivilege { .. }));

        // Rejection leaves status and history untouched.
        assert_eq!(
            f.registry.get("topic_1").await.unwrap().status,
            ContentStatus::Quarantined
        );
        assert_eq!(f.machine.history("topic_1").await.len(), 1);

        let action = f
            .machine
            .transition("topic_1", ContentStatus::Visible, "owner_1", "appeal accepted")
            .await
            .unwrap();
        assert_eq!(action.to_status, ContentStatus::Visible);
        assert_eq!(f.machine.history("topic_1").await.len(), 2);
    }

    #[tokio::test]
    async fn test_illegal_transition_rejected() {
        let f = setup().await;

        // Visible -> HiddenByMod is not in the table.
        let err = f
            .machine
            .transition("topic_1", ContentStatus::HiddenByMod, "owner_1", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
        assert!(f.machine.history("topic_1").await.is_empty());
        assert!(f.sink.notices().is_empty());
    }

    #[tokio::test]
    async fn test_plain_user_cannot_moderate() {
        let f = setup().await;

        let err = f
            .machine
            .transition("topic_1", ContentStatus::Quarantined, "user_1", "grudge")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientPrivilege { .. }));
    }

    #[tokio::test]
    async fn test_human_cannot_take_system_transition() {
        let f = setup().await;

        let err = f
            .machine
            .transition("topic_1", ContentStatus::HiddenByAi, "owner_1", "manual hide")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientPrivilege { .. }));
    }

    #[tokio::test]
    async fn test_auto_hide_respects_confidence_threshold() {
        let f = setup().await;

        let below = f.machine.auto_hide("topic_1", 0.90).await.unwrap();
        assert!(below.is_none());
        assert_eq!(
            f.registry.get("topic_1").await.unwrap().status,
            ContentStatus::Visible
        );

        let hidden = f.machine.auto_hide("topic_1", 0.97).await.unwrap();
        assert_eq!(hidden.unwrap().to_status, ContentStatus::HiddenByAi);

        // A second classifier pass on hidden content is a quiet no-op.
        let again = f.machine.auto_hide("topic_1", 0.99).await.unwrap();
        assert!(again.is_none());
        assert_eq!(f.machine.history("topic_1").await.len(), 1);
        assert!(f.machine.history("topic_1").await[0].actor_id.is_none());
    }

    #[tokio::test]
    async fn test_confirm_ai_hide_then_replay_matches() {
        let f = setup().await;

        f.machine.auto_hide("topic_1", 0.99).await.unwrap();
        f.machine
            .transition("topic_1", ContentStatus::HiddenByMod, "mod_1", "confirmed")
            .await
            .unwrap();
        f.machine
            .transition("topic_1", ContentStatus::Visible, "mod_1", "edited by author")
            .await
            .unwrap();

        let replayed = f.machine.replay_status("topic_1").await;
        assert_eq!(replayed, f.registry.get("topic_1").await.unwrap().status);
        assert_eq!(replayed, ContentStatus::Visible);
    }

    #[tokio::test]
    async fn test_unknown_actor_rejected() {
        let f = setup().await;

        let err = f
            .machine
            .transition("topic_1", ContentStatus::Quarantined, "ghost", "boo")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownUser { .. }));
    }
}
