//! Content Moderation State Machine
//!
//! Owns content visibility and the legal-transition graph. Transitions are
//! enumerated in an explicit table rather than scattered conditionals, so an
//! illegal combination is a lookup miss. Every committed transition appends
//! one `ModerationAction`; the full status history of an item is
//! reconstructable from that log alone.

pub mod machine;
pub mod transition;

pub use machine::{ModerationAction, ModerationMachine};
pub use transition::{required_actor, ActorRequirement};
