//! Distance ranking and frontline eligibility
//!
//! An agent's rank is how many active peers are clearly closer to the
//! target than it is. "Clearly" means by more than the hysteresis margin,
//! so two agents at nearly the same distance share a rank instead of
//! swapping places every tick.

use glam::Vec3;

use crate::core::types::{horizontal_distance_sq, AgentId};
use crate::engagement::constants::RANK_HYSTERESIS;
use crate::engagement::registry::PeerSnapshot;

/// Number of active peers strictly closer to `target` than `position`
/// by more than the hysteresis margin (compared in squared distance)
pub fn distance_rank(me: AgentId, position: Vec3, target: Vec3, peers: &PeerSnapshot) -> usize {
    let my_dist_sq = horizontal_distance_sq(position, target);
    let threshold = my_dist_sq - RANK_HYSTERESIS * RANK_HYSTERESIS;

    peers
        .active_others(me)
        .filter(|peer| horizontal_distance_sq(peer.position, target) < threshold)
        .count()
}

/// Frontline agents may attack; the cap is floored at one
pub fn is_frontline(
    me: AgentId,
    position: Vec3,
    target: Vec3,
    peers: &PeerSnapshot,
    max_attackers: usize,
) -> bool {
    distance_rank(me, position, target, peers) < max_attackers.max(1)
}
