//! Arena bounds and the clamp seam
//!
//! The engagement core never reaches for a global arena. It receives an
//! [`ArenaClamp`] at construction and routes every committed or candidate
//! position through it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::horizontal;

/// Maps a position to the nearest in-bounds point, preserving height
pub trait ArenaClamp: Send + Sync {
    fn clamp_to_arena(&self, pos: Vec3) -> Vec3;
}

impl<F> ArenaClamp for F
where
    F: Fn(Vec3) -> Vec3 + Send + Sync,
{
    fn clamp_to_arena(&self, pos: Vec3) -> Vec3 {
        self(pos)
    }
}

/// Built-in arena shapes, loadable from config
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ArenaBounds {
    /// No bound: clamping is the identity
    #[default]
    Unbounded,
    /// Axis-aligned rectangle on the XZ plane
    Rect {
        min_x: f32,
        min_z: f32,
        max_x: f32,
        max_z: f32,
    },
    /// Disc on the XZ plane
    Circle {
        center_x: f32,
        center_z: f32,
        radius: f32,
    },
}

impl ArenaBounds {
    pub fn rect(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Self {
        Self::Rect {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    pub fn circle(center_x: f32, center_z: f32, radius: f32) -> Self {
        Self::Circle {
            center_x,
            center_z,
            radius,
        }
    }

    pub fn contains(&self, pos: Vec3) -> bool {
        let clamped = self.clamp_to_arena(pos);
        (clamped - pos).length_squared() <= 1e-8
    }
}

impl ArenaClamp for ArenaBounds {
    fn clamp_to_arena(&self, pos: Vec3) -> Vec3 {
        match *self {
            ArenaBounds::Unbounded => pos,
            ArenaBounds::Rect {
                min_x,
                min_z,
                max_x,
                max_z,
            } => {
                // max/min instead of clamp: an inverted rect must not panic
                Vec3::new(pos.x.max(min_x).min(max_x), pos.y, pos.z.max(min_z).min(max_z))
            }
            ArenaBounds::Circle {
                center_x,
                center_z,
                radius,
            } => {
                let center = Vec3::new(center_x, pos.y, center_z);
                let offset = horizontal(pos - center);
                let dist = offset.length();
                let radius = radius.max(0.0);
                if dist <= radius {
                    pos
                } else {
                    center + offset * (radius / dist)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_is_identity() {
        let pos = Vec3::new(100.0, 3.0, -50.0);
        assert_eq!(ArenaBounds::Unbounded.clamp_to_arena(pos), pos);
    }

    #[test]
    fn test_rect_clamps_horizontal_only() {
        let arena = ArenaBounds::rect(-5.0, -5.0, 5.0, 5.0);
        let clamped = arena.clamp_to_arena(Vec3::new(8.0, 2.5, -9.0));
        assert_eq!(clamped, Vec3::new(5.0, 2.5, -5.0));
        assert!(arena.contains(Vec3::new(1.0, 100.0, 1.0)));
    }

    #[test]
    fn test_circle_projects_to_rim() {
        let arena = ArenaBounds::circle(0.0, 0.0, 4.0);
        let clamped = arena.clamp_to_arena(Vec3::new(8.0, 1.0, 0.0));
        assert!((clamped - Vec3::new(4.0, 1.0, 0.0)).length() < 1e-5);
        assert!(!arena.contains(Vec3::new(0.0, 0.0, 4.5)));
    }

    #[test]
    fn test_closure_clamp() {
        let floor = |pos: Vec3| Vec3::new(pos.x.max(0.0), pos.y, pos.z);
        assert_eq!(floor.clamp_to_arena(Vec3::new(-1.0, 0.0, 2.0)), Vec3::new(0.0, 0.0, 2.0));
    }
}
