//! Arena Melee - crowd melee engagement around a single defender
//!
//! Hostile agents converge on one anchor, only the closest few may attack,
//! the rest hold a back row, and everyone keeps personal space.

pub mod core;
pub mod engagement;
pub mod simulation;

pub use crate::core::{AgentId, EngagementConfig, EngagementError, Result, Tick};
pub use crate::engagement::{ArenaBounds, ArenaClamp, EngagementEvent, EngagementState};
pub use crate::simulation::{run_engagement_tick, EngagementWorld};
