//! Melee engagement around a single defender
//!
//! Many hostile agents converge on one anchor. Only the closest few (the
//! frontline) may attack; the rest hold a looser back row. Each tick an
//! agent ranks itself against the others, picks a slot with room to stand,
//! walks there, and is pushed apart from anyone it would crowd.
//!
//! Leaves first: registry -> rank -> slot -> separation -> stun/attack ->
//! state_machine. The world (`crate::simulation`) owns the agents and runs
//! the compute/commit tick.

pub mod agent;
pub mod arena;
pub mod attack;
pub mod constants;
pub mod events;
pub mod health;
pub mod rank;
pub mod registry;
pub mod separation;
pub mod slot;
pub mod state_machine;
pub mod stun;

pub use agent::{agent_seed, Agent, EngagementState, HitboxMode};
pub use arena::{ArenaBounds, ArenaClamp};
pub use attack::{draw_interval, AttackScheduler, AttackTrigger};
pub use constants::*;
pub use events::EngagementEvent;
pub use health::{roll_stun, stun_profile, zone_damage, Health, Hit, HitOutcome, HitZone};
pub use rank::{distance_rank, is_frontline};
pub use registry::{AgentRegistry, Peer, PeerSnapshot};
pub use separation::enforce_separation;
pub use slot::{lane_sign, lateral_extent, min_distance_to_others, SlotFinder};
pub use state_machine::{step_agent, AgentStep, TickContext};
pub use stun::StunController;
