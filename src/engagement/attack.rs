//! Attack timing and hit-window bookkeeping
//!
//! The scheduler owns the "attack in progress" flag. The host opens and
//! closes it through the same begin/end hit-window signals it forwards to
//! the weapon, so control flow never depends on polling animation state.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::EngagementConfig;

/// Request to play an attack variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackTrigger {
    pub variant: String,
    pub crossfade: f32,
}

/// Randomized-interval attack timer for one agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackScheduler {
    timer: f32,
    interval: f32,
    hit_window_open: bool,
}

impl AttackScheduler {
    pub fn new<R: Rng>(config: &EngagementConfig, rng: &mut R) -> Self {
        Self {
            timer: 0.0,
            interval: draw_interval(config, rng),
            hit_window_open: false,
        }
    }

    /// Restart the countdown with a fresh interval
    pub fn reset<R: Rng>(&mut self, config: &EngagementConfig, rng: &mut R) {
        self.timer = 0.0;
        self.interval = draw_interval(config, rng);
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn hit_window_open(&self) -> bool {
        self.hit_window_open
    }

    /// Advance the timer by `dt`
    ///
    /// When the interval elapses the timer resets, a new interval is drawn
    /// and a random variant is picked. No trigger is produced while a hit
    /// window is still open; the elapsed time carries over so the next
    /// attack follows as soon as the window closes.
    pub fn advance<R: Rng>(
        &mut self,
        dt: f32,
        config: &EngagementConfig,
        rng: &mut R,
    ) -> Option<AttackTrigger> {
        self.timer += dt;

        if self.hit_window_open || self.timer < self.interval {
            return None;
        }

        self.timer = 0.0;
        self.interval = draw_interval(config, rng);

        if config.attack_variants.is_empty() {
            return None;
        }

        let index = rng.gen_range(0..config.attack_variants.len());
        Some(AttackTrigger {
            variant: config.attack_variants[index].clone(),
            crossfade: config.attack_crossfade_duration,
        })
    }

    /// Returns true if the window was closed before
    pub fn begin_hit_window(&mut self) -> bool {
        let opened = !self.hit_window_open;
        self.hit_window_open = true;
        opened
    }

    /// Returns true if the window was open before
    pub fn end_hit_window(&mut self) -> bool {
        let closed = self.hit_window_open;
        self.hit_window_open = false;
        closed
    }
}

/// Uniform draw from `[attack_interval_min, attack_interval_max]`
pub fn draw_interval<R: Rng>(config: &EngagementConfig, rng: &mut R) -> f32 {
    let lo = config.attack_interval_min.min(config.attack_interval_max);
    let hi = config.attack_interval_min.max(config.attack_interval_max);
    if hi <= lo {
        return lo;
    }
    rng.gen_range(lo..=hi)
}
