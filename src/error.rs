//! Engine error taxonomy.
//!
//! Caller errors (unknown content, bad event kind, illegal transitions,
//! insufficient privilege) are non-retryable and surfaced as-is. `Storage`
//! is transient and safe to retry because every write path is idempotent.
//! `InvariantViolation` halts the affected operation and is logged loudly.

use thiserror::Error;

use crate::content::ContentStatus;
use crate::identity::Role;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown content: {content_id}")]
    UnknownContent { content_id: String },

    #[error("invalid engagement event kind: {kind}")]
    InvalidKind { kind: String },

    #[error("unknown user: {user_id}")]
    UnknownUser { user_id: String },

    #[error("illegal moderation transition: {from:?} -> {to:?}")]
    IllegalTransition {
        from: ContentStatus,
        to: ContentStatus,
    },

    #[error("insufficient privilege: {role:?} cannot perform {from:?} -> {to:?}")]
    InsufficientPrivilege {
        role: Role,
        from: ContentStatus,
        to: ContentStatus,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    /// Whether a caller may safely retry the failed operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(EngineError::Storage("connection reset".to_string()).is_retryable());
        assert!(!EngineError::UnknownContent {
            content_id: "topic_1".to_string()
        }
        .is_retryable());
        assert!(!EngineError::InvalidKind {
            kind: "SUPERLIKE".to_string()
        }
        .is_retryable());
    }
}
