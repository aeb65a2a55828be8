//! Engagement event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Kind of a single engagement event. An `Unlike` is its own event, not a
/// retraction of a prior `Like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Like,
    Unlike,
    Reply,
    View,
}

impl EventKind {
    /// Parse an external wire value. Unknown values are a caller error.
    pub fn parse(value: &str) -> Result<Self, EngineError> {
        match value {
            "LIKE" => Ok(EventKind::Like),
            "UNLIKE" => Ok(EventKind::Unlike),
            "REPLY" => Ok(EventKind::Reply),
            "VIEW" => Ok(EventKind::View),
            other => Err(EngineError::InvalidKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// One like, unlike, reply, or view attributed to one actor on one content
/// item. Immutable once accepted; `id` is the caller-supplied idempotency key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementEvent {
    pub id: String,
    pub content_id: String,
    pub actor_id: String,
    pub kind: EventKind,
    pub occurred_at: DateTime<Utc>,
}

impl EngagementEvent {
    pub fn new(
        id: impl Into<String>,
        content_id: impl Into<String>,
        actor_id: impl Into<String>,
        kind: EventKind,
    ) -> Self {
        Self {
            id: id.into(),
            content_id: content_id.into(),
            actor_id: actor_id.into(),
            kind,
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(EventKind::parse("LIKE").unwrap(), EventKind::Like);
        assert_eq!(EventKind::parse("UNLIKE").unwrap(), EventKind::Unlike);
        assert_eq!(EventKind::parse("REPLY").unwrap(), EventKind::Reply);
        assert_eq!(EventKind::parse("VIEW").unwrap(), EventKind::View);

        let err = EventKind::parse("SUPERLIKE").unwrap_err();
        assert!(matches!(err, EngineError::InvalidKind { .. }));
    }
}
