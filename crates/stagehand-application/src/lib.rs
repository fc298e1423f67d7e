//! Stagehand application: the navigation engine and its collaborator
//! contracts.

pub mod delivery;
pub mod engine;
pub mod locks;
pub mod roles;

pub use delivery::OutboundDelivery;
pub use engine::{NavigationEngine, NavigationOutcome};
pub use locks::UserLocks;
pub use roles::{RoleResolver, StaticRoleResolver};
