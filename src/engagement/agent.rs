//! Engagement agent: one hostile melee unit

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::EngagementConfig;
use crate::core::types::AgentId;
use crate::engagement::attack::AttackScheduler;
use crate::engagement::health::Health;
use crate::engagement::stun::StunController;

/// Per-agent engagement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngagementState {
    #[default]
    Inactive,
    Approaching,
    Attacking,
}

impl EngagementState {
    /// Participates in ranking, placement and separation
    pub fn is_active(&self) -> bool {
        !matches!(self, EngagementState::Inactive)
    }

    /// Whether `self -> next` is an edge of the state machine
    pub fn can_transition_to(&self, next: EngagementState) -> bool {
        use EngagementState::*;
        matches!(
            (*self, next),
            (Inactive, Approaching)
                | (Approaching, Attacking)
                | (Attacking, Approaching)
                | (Approaching, Inactive)
                | (Attacking, Inactive)
        )
    }
}

/// Which collider set is live on the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitboxMode {
    /// Single root collider used while walking the path
    #[default]
    Travel,
    /// Per-zone colliders for melee hits
    Melee,
    /// Dead: nothing collides
    Disabled,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec3,
    /// Yaw in radians, 0 = facing +Z
    pub facing: f32,
    /// Speed commanded on the last tick (for walk/idle blending)
    pub move_speed: f32,
    pub state: EngagementState,
    pub attack: AttackScheduler,
    pub stun: StunController,
    pub health: Health,
    pub hitbox_mode: HitboxMode,
    pub is_dead: bool,
    /// False once the agent is disabled; disabled agents never simulate again
    pub enabled: bool,
    pub(crate) rng: ChaCha8Rng,
}

impl Agent {
    pub fn new(id: AgentId, position: Vec3, config: &EngagementConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(agent_seed(config.seed, id));
        let attack = AttackScheduler::new(config, &mut rng);

        Self {
            id,
            position,
            facing: 0.0,
            move_speed: 0.0,
            state: EngagementState::Inactive,
            attack,
            stun: StunController::new(),
            health: Health::from_config(config),
            hitbox_mode: HitboxMode::Travel,
            is_dead: false,
            enabled: true,
            rng,
        }
    }

    /// Alive and enabled
    pub fn is_simulating(&self) -> bool {
        self.enabled && !self.is_dead
    }

    pub fn is_attacking(&self) -> bool {
        self.state == EngagementState::Attacking
    }
}

/// Mix the world seed with the agent id so every agent gets its own stream
pub fn agent_seed(world_seed: u64, id: AgentId) -> u64 {
    world_seed ^ id.0.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
