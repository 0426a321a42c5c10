//! Engagement configuration with documented constants
//!
//! Every tunable that shapes how agents crowd the defender lives here.
//! The struct is read-only once handed to an `EngagementWorld`; the world
//! runs it through [`EngagementConfig::sanitized`] first so a bad designer
//! value degrades to a safe minimum instead of breaking a tick.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngagementError, Result};
use crate::engagement::arena::ArenaBounds;
use crate::engagement::constants::{HARD_EXIT_RANGE_FACTOR, MIN_ATTACK_INTERVAL};

/// Configuration for the melee engagement systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    // === RANKING ===
    /// How many agents may stand at the defender and attack at once
    ///
    /// Agents whose distance rank is below this cap are "frontline".
    /// Floored at 1 when read through [`EngagementConfig::max_attackers`].
    pub max_simultaneous_attackers: usize,

    // === POSITIONING ===
    /// Distance from the target at which the front row stands
    pub stop_distance: f32,

    /// Extra distance added for the back row
    pub back_row_distance_offset: f32,

    /// Horizontal distance at which a frontline agent may begin attacking
    ///
    /// An attacking agent drops back to approaching beyond twice this range.
    pub attack_range: f32,

    /// Minimum spacing between agents, enforced by the separation pass
    pub min_distance_from_other_enemies: f32,

    /// Sideways offset from the ideal spot so agents do not queue in a line
    pub lateral_offset: f32,

    // === MOVEMENT ===
    pub combat_move_speed: f32,

    /// Speed multiplier for backline agents (they shuffle, not charge)
    pub back_row_speed_factor: f32,

    /// Dead band around `stop_distance` inside which attackers hold still
    pub hold_band: f32,

    /// Speed multiplier for the small in-place corrections while attacking
    pub hold_speed_factor: f32,

    /// Facing interpolation rate (fraction of the remaining turn per second)
    pub turn_rate: f32,

    // === ATTACKS ===
    pub attack_interval_min: f32,
    pub attack_interval_max: f32,

    /// Attack variants the presentation layer knows how to play
    ///
    /// An empty list keeps the timer running without emitting triggers.
    pub attack_variants: Vec<String>,

    /// Crossfade passed along with every attack trigger
    pub attack_crossfade_duration: f32,

    // === STUN ===
    /// Stun applied by hits to head, torso or body
    pub flesh_stun_duration: f32,
    pub flesh_stun_chance: f32,

    /// Stun applied by hits that land on armor
    pub armor_stun_duration: f32,
    pub armor_stun_chance: f32,

    // === DAMAGE ===
    pub max_health: i32,
    pub max_armor: i32,

    /// Damage multiplier for head hits
    pub head_damage_multiplier: f32,

    // === ARENA ===
    /// Bounds used when no custom clamp is injected
    pub arena: ArenaBounds,

    // === SIMULATION ===
    /// Fixed step used by the headless runner (seconds)
    pub tick_seconds: f32,

    /// Agent count at which the compute phase runs on the rayon pool
    ///
    /// Below this, thread overhead exceeds the O(n²) scan it would split.
    pub parallel_threshold: usize,

    /// Seed for per-agent attack timing and hit rolls
    pub seed: u64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            max_simultaneous_attackers: 4,

            stop_distance: 1.3,
            back_row_distance_offset: 1.2,
            attack_range: 1.6,
            min_distance_from_other_enemies: 1.0,
            lateral_offset: 0.7,

            combat_move_speed: 2.0,
            back_row_speed_factor: 0.3,
            hold_band: 0.3,
            hold_speed_factor: 0.5,
            turn_rate: 10.0,

            attack_interval_min: 2.0,
            attack_interval_max: 4.0,
            attack_variants: vec!["attack_slash".to_string(), "attack_overhead".to_string()],
            attack_crossfade_duration: 0.1,

            flesh_stun_duration: 0.6,
            flesh_stun_chance: 0.35,
            armor_stun_duration: 0.3,
            armor_stun_chance: 0.15,

            max_health: 3,
            max_armor: 0,
            head_damage_multiplier: 2.0,

            arena: ArenaBounds::Unbounded,

            tick_seconds: 1.0 / 60.0,
            parallel_threshold: 64,
            seed: 12345,
        }
    }
}

impl EngagementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document; missing keys take defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngagementConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Reject values that cannot be repaired by clamping
    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("stop_distance", self.stop_distance),
            ("back_row_distance_offset", self.back_row_distance_offset),
            ("attack_range", self.attack_range),
            ("min_distance_from_other_enemies", self.min_distance_from_other_enemies),
            ("lateral_offset", self.lateral_offset),
            ("combat_move_speed", self.combat_move_speed),
            ("back_row_speed_factor", self.back_row_speed_factor),
            ("hold_band", self.hold_band),
            ("hold_speed_factor", self.hold_speed_factor),
            ("turn_rate", self.turn_rate),
            ("attack_interval_min", self.attack_interval_min),
            ("attack_interval_max", self.attack_interval_max),
            ("attack_crossfade_duration", self.attack_crossfade_duration),
            ("flesh_stun_duration", self.flesh_stun_duration),
            ("flesh_stun_chance", self.flesh_stun_chance),
            ("armor_stun_duration", self.armor_stun_duration),
            ("armor_stun_chance", self.armor_stun_chance),
            ("head_damage_multiplier", self.head_damage_multiplier),
            ("tick_seconds", self.tick_seconds),
        ];

        if let Some((name, value)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngagementError::InvalidConfig(format!(
                "{} must be finite (got {})",
                name, value
            )));
        }

        if self.tick_seconds <= 0.0 {
            return Err(EngagementError::InvalidConfig(format!(
                "tick_seconds must be positive (got {})",
                self.tick_seconds
            )));
        }

        for (name, chance) in [
            ("flesh_stun_chance", self.flesh_stun_chance),
            ("armor_stun_chance", self.armor_stun_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(EngagementError::InvalidConfig(format!(
                    "{} must be within [0, 1] (got {})",
                    name, chance
                )));
            }
        }

        if self.max_health <= 0 {
            return Err(EngagementError::InvalidConfig(format!(
                "max_health must be positive (got {})",
                self.max_health
            )));
        }

        Ok(())
    }

    /// Copy with every repairable value clamped to a safe minimum
    ///
    /// Each repair is logged once at warn level.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();

        if config.max_simultaneous_attackers == 0 {
            tracing::warn!("max_simultaneous_attackers is 0; using 1");
            config.max_simultaneous_attackers = 1;
        }

        for (name, value) in [
            ("stop_distance", &mut config.stop_distance),
            ("back_row_distance_offset", &mut config.back_row_distance_offset),
            ("attack_range", &mut config.attack_range),
            ("min_distance_from_other_enemies", &mut config.min_distance_from_other_enemies),
            ("lateral_offset", &mut config.lateral_offset),
            ("combat_move_speed", &mut config.combat_move_speed),
            ("back_row_speed_factor", &mut config.back_row_speed_factor),
            ("hold_band", &mut config.hold_band),
            ("hold_speed_factor", &mut config.hold_speed_factor),
            ("turn_rate", &mut config.turn_rate),
            ("attack_crossfade_duration", &mut config.attack_crossfade_duration),
            ("flesh_stun_duration", &mut config.flesh_stun_duration),
            ("armor_stun_duration", &mut config.armor_stun_duration),
            ("head_damage_multiplier", &mut config.head_damage_multiplier),
        ] {
            if !(*value >= 0.0) || !(*value).is_finite() {
                tracing::warn!("{} is {}; using 0", name, value);
                *value = 0.0;
            }
        }

        for (name, value) in [
            ("flesh_stun_chance", &mut config.flesh_stun_chance),
            ("armor_stun_chance", &mut config.armor_stun_chance),
        ] {
            let current = *value;
            let clamped = if current.is_finite() { current.clamp(0.0, 1.0) } else { 0.0 };
            if clamped != current {
                tracing::warn!("{} is {}; using {}", name, value, clamped);
                *value = clamped;
            }
        }

        let defaults = EngagementConfig::default();
        if !config.attack_interval_min.is_finite() {
            tracing::warn!(
                "attack_interval_min is {}; using {}",
                config.attack_interval_min,
                defaults.attack_interval_min
            );
            config.attack_interval_min = defaults.attack_interval_min;
        }
        if !config.attack_interval_max.is_finite() {
            tracing::warn!(
                "attack_interval_max is {}; using {}",
                config.attack_interval_max,
                defaults.attack_interval_max
            );
            config.attack_interval_max = defaults.attack_interval_max;
        }
        if !(config.attack_interval_min >= MIN_ATTACK_INTERVAL) {
            tracing::warn!(
                "attack_interval_min is {}; using {}",
                config.attack_interval_min,
                MIN_ATTACK_INTERVAL
            );
            config.attack_interval_min = MIN_ATTACK_INTERVAL;
        }
        if !(config.attack_interval_max >= config.attack_interval_min) {
            tracing::warn!(
                "attack_interval_max ({}) is below attack_interval_min ({}); using the minimum",
                config.attack_interval_max,
                config.attack_interval_min
            );
            config.attack_interval_max = config.attack_interval_min;
        }

        if !(config.tick_seconds > 0.0) || !config.tick_seconds.is_finite() {
            tracing::warn!("tick_seconds is {}; using 1/60", config.tick_seconds);
            config.tick_seconds = 1.0 / 60.0;
        }

        if config.max_health <= 0 {
            tracing::warn!("max_health is {}; using 1", config.max_health);
            config.max_health = 1;
        }
        if config.max_armor < 0 {
            tracing::warn!("max_armor is {}; using 0", config.max_armor);
            config.max_armor = 0;
        }

        config
    }

    /// Attacker cap, never below one
    pub fn max_attackers(&self) -> usize {
        self.max_simultaneous_attackers.max(1)
    }

    /// Distance from the target that a frontline or backline agent aims for
    pub fn anchor_distance(&self, frontline: bool) -> f32 {
        if frontline {
            self.stop_distance
        } else {
            self.stop_distance + self.back_row_distance_offset
        }
    }

    /// Approach speed for the agent's row
    pub fn approach_speed(&self, frontline: bool) -> f32 {
        if frontline {
            self.combat_move_speed
        } else {
            self.combat_move_speed * self.back_row_speed_factor
        }
    }

    /// Distance beyond which an attacker gives up and re-approaches
    pub fn hard_exit_distance(&self) -> f32 {
        self.attack_range * HARD_EXIT_RANGE_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngagementConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn test_max_attackers_floored_at_one() {
        let config = EngagementConfig {
            max_simultaneous_attackers: 0,
            ..Default::default()
        };
        assert_eq!(config.max_attackers(), 1);
        assert_eq!(config.sanitized().max_simultaneous_attackers, 1);
    }

    #[test]
    fn test_sanitize_repairs_intervals() {
        let config = EngagementConfig {
            attack_interval_min: -1.0,
            attack_interval_max: 0.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.attack_interval_min, MIN_ATTACK_INTERVAL);
        assert_eq!(config.attack_interval_max, MIN_ATTACK_INTERVAL);
    }

    #[test]
    fn test_sanitize_replaces_non_finite_intervals() {
        let config = EngagementConfig {
            attack_interval_min: f32::NEG_INFINITY,
            attack_interval_max: f32::INFINITY,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.attack_interval_min, 2.0);
        assert_eq!(config.attack_interval_max, 4.0);

        // Infinite max with a large finite min falls back to the min
        let config = EngagementConfig {
            attack_interval_min: 10.0,
            attack_interval_max: f32::INFINITY,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.attack_interval_max, 10.0);

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        let interval = crate::engagement::attack::draw_interval(&config, &mut rng);
        assert_eq!(interval, 10.0);
    }

    #[test]
    fn test_sanitize_clamps_negative_durations_and_chances() {
        let config = EngagementConfig {
            flesh_stun_duration: -0.5,
            armor_stun_chance: 1.7,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.flesh_stun_duration, 0.0);
        assert_eq!(config.armor_stun_chance, 1.0);
    }

    #[test]
    fn test_anchor_distance_for_rows() {
        let config = EngagementConfig::default();
        assert_eq!(config.anchor_distance(true), 1.3);
        assert!((config.anchor_distance(false) - 2.5).abs() < 1e-6);
        assert!((config.approach_speed(false) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_from_toml_partial_document() {
        let config = EngagementConfig::from_toml_str(
            r#"
            max_simultaneous_attackers = 2
            attack_range = 2.0
            attack_variants = ["jab"]

            [arena]
            shape = "circle"
            center_x = 0.0
            center_z = 0.0
            radius = 10.0
            "#,
        )
        .expect("Should parse partial config");

        assert_eq!(config.max_simultaneous_attackers, 2);
        assert_eq!(config.attack_range, 2.0);
        assert_eq!(config.attack_variants, vec!["jab".to_string()]);
        assert_eq!(config.stop_distance, 1.3);
        assert!(matches!(config.arena, ArenaBounds::Circle { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_chance() {
        let result = EngagementConfig::from_toml_str("flesh_stun_chance = 2.5");
        assert!(matches!(result, Err(EngagementError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = EngagementConfig::load("does/not/exist.toml");
        assert!(matches!(result, Err(EngagementError::IoError(_))));
    }
}
