//! Attack slot search
//!
//! Each agent aims for a lane beside or behind the defender, then nudges
//! that aim across a small fixed grid of candidates toward whichever spot
//! keeps the most room from its neighbours.

use glam::Vec3;

use crate::core::config::EngagementConfig;
use crate::core::types::{horizontal_distance, lateral_axis, AgentId};
use crate::engagement::arena::ArenaClamp;
use crate::engagement::constants::{
    BACKLINE_LATERAL_SCALE, NO_NEIGHBOR_DISTANCE, SLOT_CANDIDATES, SLOT_DISTANCE_PENALTY,
    SLOT_FORWARD_STEP_FACTOR,
};
use crate::engagement::registry::PeerSnapshot;

/// Lane side: 0 for the center lane, +1 right, -1 left
pub fn lane_sign(id: AgentId) -> f32 {
    match id.lane() {
        1 => 1.0,
        2 => -1.0,
        _ => 0.0,
    }
}

/// Lateral spread for the agent's row
pub fn lateral_extent(config: &EngagementConfig, frontline: bool) -> f32 {
    if frontline {
        config.lateral_offset
    } else {
        config.lateral_offset * BACKLINE_LATERAL_SCALE
    }
}

/// Minimum horizontal distance from `pos` to any active peer but `me`
///
/// Returns a large sentinel when there is nobody else.
pub fn min_distance_to_others(me: AgentId, pos: Vec3, peers: &PeerSnapshot) -> f32 {
    peers
        .active_others(me)
        .map(|peer| horizontal_distance(pos, peer.position))
        .fold(None, |best: Option<f32>, d| Some(best.map_or(d, |b| b.min(d))))
        .unwrap_or(NO_NEIGHBOR_DISTANCE)
}

pub struct SlotFinder<'a> {
    config: &'a EngagementConfig,
    arena: &'a dyn ArenaClamp,
    peers: &'a PeerSnapshot,
}

impl<'a> SlotFinder<'a> {
    pub fn new(config: &'a EngagementConfig, arena: &'a dyn ArenaClamp, peers: &'a PeerSnapshot) -> Self {
        Self {
            config,
            arena,
            peers,
        }
    }

    /// Lane point in front of the target, clamped to the arena
    ///
    /// `dir_to_target` must be a horizontal unit vector from agent to target.
    pub fn desired_position(&self, me: AgentId, target: Vec3, dir_to_target: Vec3, frontline: bool) -> Vec3 {
        let anchor = target - dir_to_target * self.config.anchor_distance(frontline);
        let side = lateral_axis(dir_to_target);
        let desired = anchor + side * (lane_sign(me) * lateral_extent(self.config, frontline));
        self.arena.clamp_to_arena(desired)
    }

    /// Best-separated candidate around `desired`
    ///
    /// Score is clearance to the nearest peer minus a penalty for straying
    /// from `desired`. The first maximum in candidate order wins.
    pub fn best_slot(&self, me: AgentId, desired: Vec3, dir_to_target: Vec3, frontline: bool) -> Vec3 {
        let side = lateral_axis(dir_to_target);
        let lateral = lateral_extent(self.config, frontline);
        let forward_step = self.config.min_distance_from_other_enemies * SLOT_FORWARD_STEP_FACTOR;

        let mut best = desired;
        let mut best_score = f32::NEG_INFINITY;

        for &(lateral_steps, back_steps) in SLOT_CANDIDATES.iter() {
            let candidate = desired + side * (lateral_steps * lateral) - dir_to_target * (back_steps * forward_step);
            let candidate = self.arena.clamp_to_arena(candidate);

            let clearance = min_distance_to_others(me, candidate, self.peers);
            let drift = (candidate - desired).length();
            let score = clearance - drift * SLOT_DISTANCE_PENALTY;

            if score > best_score {
                best_score = score;
                best = candidate;
            }
        }

        best
    }

    /// Desired lane point followed by the candidate search
    pub fn find(&self, me: AgentId, target: Vec3, dir_to_target: Vec3, frontline: bool) -> Vec3 {
        let desired = self.desired_position(me, target, dir_to_target, frontline);
        self.best_slot(me, desired, dir_to_target, frontline)
    }
}
