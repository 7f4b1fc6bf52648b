//! Moderation & session-state engine.
//!
//! Stateless over the store: every component holds only an injected
//! store handle and a clock, so replicas need no coordination beyond
//! the store's per-document atomicity.

mod calls;
mod moderation;
mod policy;
mod presence;
mod reports;
mod status;

pub use calls::CallTracker;
pub use moderation::ModerationEngine;
pub use policy::QuarantinePolicy;
pub use presence::PresenceRegistry;
pub use reports::ReportQueue;
pub use status::{AccessStatus, StatusResolver};
