//! External identity and access roles.
//!
//! The identity provider is an upstream collaborator: the engine reads
//! `(user_id, role, kyc_verified)` and never writes identity data back.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Access roles, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    AdminL1,
    AdminL2,
    Owner,
}

impl Role {
    /// Moderator-level access (L1 admin and above).
    pub fn is_moderator(&self) -> bool {
        matches!(self, Role::AdminL1 | Role::AdminL2 | Role::Owner)
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner)
    }
}

/// Read-only snapshot of an upstream identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub role: Role,
    /// Know-Your-Customer verification flag; gates payout eligibility.
    pub kyc_verified: bool,
}

impl User {
    pub fn new(id: impl Into<String>, role: Role, kyc_verified: bool) -> Self {
        Self {
            id: id.into(),
            role,
            kyc_verified,
        }
    }
}

/// Seam to the external identity/access provider.
pub trait IdentityProvider: Send + Sync {
    fn user(&self, user_id: &str) -> Option<User>;
}

/// In-memory identity provider used for wiring and tests.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    users: DashMap<String, User>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn user(&self, user_id: &str) -> Option<User> {
        self.users.get(user_id).map(|u| u.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_privileges() {
        assert!(!Role::User.is_moderator());
        assert!(Role::AdminL1.is_moderator());
        assert!(Role::AdminL2.is_moderator());
        assert!(Role::Owner.is_moderator());
        assert!(Role::Owner.is_owner());
        assert!(!Role::AdminL2.is_owner());
    }

    #[test]
    fn test_provider_lookup() {
        let provider = InMemoryIdentityProvider::new();
        provider.upsert(User::new("alice", Role::AdminL1, true));

        let user = provider.user("alice").unwrap();
        assert_eq!(user.role, Role::AdminL1);
        assert!(user.kyc_verified);
        assert!(provider.user("bob").is_none());
    }
}
