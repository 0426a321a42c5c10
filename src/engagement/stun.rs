//! Temporary incapacitation
//!
//! Stun only ever extends: a shorter stun landing on a longer one leaves the
//! remaining time untouched.

use serde::{Deserialize, Serialize};

/// Stun countdown for a single agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StunController {
    timer: f32,
    stunned: bool,
}

impl StunController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stunned(&self) -> bool {
        self.stunned
    }

    /// Remaining stun time in seconds (0 when not stunned)
    pub fn remaining(&self) -> f32 {
        self.timer
    }

    /// Apply a stun of `duration` seconds
    ///
    /// Non-positive (or NaN) durations are ignored. Returns true only when
    /// the agent goes from free to stunned, so callers emit one begin signal
    /// per stun episode.
    pub fn apply(&mut self, duration: f32) -> bool {
        if !(duration > 0.0) {
            return false;
        }

        let began = !self.stunned;
        self.stunned = true;
        self.timer = self.timer.max(duration);
        began
    }

    /// Count down; returns true on the tick the stun wears off
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.stunned {
            return false;
        }

        self.timer -= dt;
        if self.timer <= 0.0 {
            self.clear();
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.stunned = false;
        self.timer = 0.0;
    }
}
