//! Notification sink seam.
//!
//! The engine produces moderation notification payloads; delivery belongs to
//! the external notification collaborator and is at-most-once best-effort.
//! A delivery failure never rolls back the transition that produced it.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::content::ContentStatus;

/// Payload emitted on every committed moderation transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationNotice {
    pub content_id: String,
    pub from: ContentStatus,
    pub to: ContentStatus,
    pub reason: String,
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: ModerationNotice) -> anyhow::Result<()>;
}

/// Drops every notice. Default wiring when no sink is attached.
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {
    fn notify(&self, _notice: ModerationNotice) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Collects notices in memory; used in tests.
#[derive(Default)]
pub struct RecordingNotificationSink {
    notices: Mutex<Vec<ModerationNotice>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<ModerationNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn notify(&self, notice: ModerationNotice) -> anyhow::Result<()> {
        self.notices.lock().unwrap().push(notice);
        Ok(())
    }
}
