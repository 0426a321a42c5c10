//! Single-pass separation
//!
//! Each neighbour closer than the minimum spacing pushes the proposed
//! position straight away from itself by exactly the overlap. Pushes add
//! up in one pass; heavy crowding can leave residual overlap, which the
//! next tick's slot search works off.

use glam::Vec3;

use crate::core::types::{horizontal, AgentId};
use crate::engagement::constants::SEPARATION_MIN_DISTANCE;
use crate::engagement::registry::PeerSnapshot;

pub fn enforce_separation(me: AgentId, proposed: Vec3, min_distance: f32, peers: &PeerSnapshot) -> Vec3 {
    let mut corrected = proposed;

    for peer in peers.active_others(me) {
        let diff = horizontal(corrected - peer.position);
        let dist = diff.length();
        if dist < SEPARATION_MIN_DISTANCE {
            continue;
        }

        if dist < min_distance {
            let push = min_distance - dist;
            corrected += (diff / dist) * push;
        }
    }

    corrected.y = proposed.y;
    corrected
}
