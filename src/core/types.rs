//! Core type definitions used throughout the codebase

use std::f32::consts::{PI, TAU};
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stable identifier for engagement agents
///
/// Assigned from a monotonic counter at spawn time, so ordering and lane
/// selection are reproducible across runs and platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl AgentId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Lane index (0 = center, 1 = right, 2 = left)
    pub fn lane(&self) -> u64 {
        self.0 % 3
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Simulation tick counter
pub type Tick = u64;

/// Squared length below which a direction vector is treated as degenerate
pub const DIRECTION_EPSILON_SQ: f32 = 0.0001;

/// Project onto the horizontal (XZ) plane
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    horizontal(a - b).length()
}

#[inline]
pub fn horizontal_distance_sq(a: Vec3, b: Vec3) -> f32 {
    horizontal(a - b).length_squared()
}

/// Horizontal axis perpendicular to `dir` (`up × dir`)
#[inline]
pub fn lateral_axis(dir: Vec3) -> Vec3 {
    Vec3::Y.cross(horizontal(dir))
}

/// Yaw (radians around +Y, 0 = facing +Z) looking along `dir`
///
/// Returns `None` for degenerate directions so callers keep their facing.
pub fn yaw_towards(dir: Vec3) -> Option<f32> {
    let flat = horizontal(dir);
    if flat.length_squared() <= DIRECTION_EPSILON_SQ {
        return None;
    }
    Some(flat.x.atan2(flat.z))
}

/// Wrap an angle into `[-PI, PI)`
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Turn `current` toward `target` along the shortest arc by fraction `t`
pub fn turn_towards(current: f32, target: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let delta = wrap_angle(target - current);
    wrap_angle(current + delta * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_cycles_through_three() {
        let lanes: Vec<u64> = (0..6).map(|i| AgentId(i).lane()).collect();
        assert_eq!(lanes, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 5.0, 0.0);
        let b = Vec3::new(3.0, -2.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < 1e-6);
        assert!((horizontal_distance_sq(a, b) - 25.0).abs() < 1e-5);
    }

    #[test]
    fn test_lateral_axis_is_perpendicular() {
        let dir = Vec3::new(0.0, 0.0, 1.0);
        let side = lateral_axis(dir);
        assert!(side.dot(dir).abs() < 1e-6);
        assert!((side - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_yaw_towards_degenerate_is_none() {
        assert!(yaw_towards(Vec3::ZERO).is_none());
        assert!(yaw_towards(Vec3::new(0.0, 3.0, 0.0)).is_none());
        assert_eq!(yaw_towards(Vec3::Z), Some(0.0));
    }

    #[test]
    fn test_turn_towards_takes_short_arc() {
        let current = 3.0;
        let target = -3.0;
        let turned = turn_towards(current, target, 0.5);
        // Short arc crosses PI, so the result stays near the +/-PI seam
        assert!(turned.abs() > 3.0);
        assert!((turn_towards(0.0, 1.0, 1.0) - 1.0).abs() < 1e-6);
    }
}
