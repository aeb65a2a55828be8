//! Legal-transition table.

use crate::content::ContentStatus;
use crate::identity::Role;

/// Minimum actor for a legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRequirement {
    /// Only the automated classifier path; no human role qualifies.
    System,
    /// Any L1 admin or above.
    Moderator,
    /// Owner only; quarantine is the most serious escalation and requires
    /// the highest privilege to lift.
    Owner,
}

impl ActorRequirement {
    pub fn satisfied_by(&self, role: Role) -> bool {
        match self {
            ActorRequirement::System => false,
            ActorRequirement::Moderator => role.is_moderator(),
            ActorRequirement::Owner => role.is_owner(),
        }
    }
}

/// The complete legal-transition table. `None` means the pair is illegal,
/// self-transitions included.
pub fn required_actor(from: ContentStatus, to: ContentStatus) -> Option<ActorRequirement> {
    use ContentStatus::*;

    match (from, to) {
        (Visible, HiddenByAi) => Some(ActorRequirement::System),
        (Visible, Quarantined) => Some(ActorRequirement::Moderator),
        (HiddenByAi, HiddenByMod) => Some(ActorRequirement::Moderator),
        (HiddenByAi, Visible) => Some(ActorRequirement::Moderator),
        (HiddenByMod, Visible) => Some(ActorRequirement::Moderator),
        (Quarantined, Visible) => Some(ActorRequirement::Owner),
        (Quarantined, HiddenByMod) => Some(ActorRequirement::Owner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ContentStatus::*;

    const ALL_STATUSES: [ContentStatus; 4] = [Visible, HiddenByAi, HiddenByMod, Quarantined];

    #[test]
    fn test_legal_pairs() {
        assert_eq!(required_actor(Visible, HiddenByAi), Some(ActorRequirement::System));
        assert_eq!(required_actor(Visible, Quarantined), Some(ActorRequirement::Moderator));
        assert_eq!(required_actor(HiddenByAi, HiddenByMod), Some(ActorRequirement::Moderator));
        assert_eq!(required_actor(HiddenByAi, Visible), Some(ActorRequirement::Moderator));
        assert_eq!(required_actor(HiddenByMod, Visible), Some(ActorRequirement::Moderator));
        assert_eq!(required_actor(Quarantined, Visible), Some(ActorRequirement::Owner));
        assert_eq!(required_actor(Quarantined, HiddenByMod), Some(ActorRequirement::Owner));
    }

    #[test]
    fn test_self_transitions_are_illegal() {
        for status in ALL_STATUSES {
            assert_eq!(required_actor(status, status), None);
        }
    }

    #[test]
    fn test_exactly_seven_legal_pairs() {
        let mut legal = 0;
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                if required_actor(from, to).is_some() {
                    legal += 1;
                }
            }
        }
        assert_eq!(legal, 7);
    }

    #[test]
    fn test_requirement_satisfaction() {
        assert!(!ActorRequirement::System.satisfied_by(Role::Owner));
        assert!(ActorRequirement::Moderator.satisfied_by(Role::AdminL1));
        assert!(ActorRequirement::Moderator.satisfied_by(Role::Owner));
        assert!(!ActorRequirement::Moderator.satisfied_by(Role::User));
        assert!(ActorRequirement::Owner.satisfied_by(Role::Owner));
        assert!(!ActorRequirement::Owner.satisfied_by(Role::AdminL2));
    }
}
