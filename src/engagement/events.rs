//! Signals for the presentation and weapon layers
//!
//! The engagement core never calls into animation, audio or colliders
//! directly. Every externally visible edge becomes one of these events.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Tick};
use crate::engagement::agent::EngagementState;
use crate::engagement::health::{HitOutcome, HitZone};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngagementEvent {
    StateChanged {
        agent: AgentId,
        from: EngagementState,
        to: EngagementState,
        tick: Tick,
    },
    /// Play an attack variant
    AttackTriggered {
        agent: AgentId,
        variant: String,
        crossfade: f32,
        tick: Tick,
    },
    /// Weapon may register hits from now on
    HitWindowBegan { agent: AgentId, tick: Tick },
    HitWindowEnded { agent: AgentId, tick: Tick },
    StunBegan {
        agent: AgentId,
        duration: f32,
        tick: Tick,
    },
    StunEnded { agent: AgentId, tick: Tick },
    /// Switch from the travel collider to per-zone melee hitboxes
    MeleeHitboxesEnabled { agent: AgentId, tick: Tick },
    HitResolved {
        agent: AgentId,
        zone: HitZone,
        outcome: HitOutcome,
        tick: Tick,
    },
    AgentDied { agent: AgentId, tick: Tick },
}

impl EngagementEvent {
    pub fn agent(&self) -> AgentId {
        match self {
            EngagementEvent::StateChanged { agent, .. }
            | EngagementEvent::AttackTriggered { agent, .. }
            | EngagementEvent::HitWindowBegan { agent, .. }
            | EngagementEvent::HitWindowEnded { agent, .. }
            | EngagementEvent::StunBegan { agent, .. }
            | EngagementEvent::StunEnded { agent, .. }
            | EngagementEvent::MeleeHitboxesEnabled { agent, .. }
            | EngagementEvent::HitResolved { agent, .. }
            | EngagementEvent::AgentDied { agent, .. } => *agent,
        }
    }

    pub fn tick(&self) -> Tick {
        match self {
            EngagementEvent::StateChanged { tick, .. }
            | EngagementEvent::AttackTriggered { tick, .. }
            | EngagementEvent::HitWindowBegan { tick, .. }
            | EngagementEvent::HitWindowEnded { tick, .. }
            | EngagementEvent::StunBegan { tick, .. }
            | EngagementEvent::StunEnded { tick, .. }
            | EngagementEvent::MeleeHitboxesEnabled { tick, .. }
            | EngagementEvent::HitResolved { tick, .. }
            | EngagementEvent::AgentDied { tick, .. } => *tick,
        }
    }
}
