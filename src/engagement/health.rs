//! Hit zones, health and armor
//!
//! Damage resolution stays deliberately small: armor soaks flat damage,
//! penetration ignores part of it, shred wears it down. What matters to the
//! engagement core is the outcome (survived, stunned, or dead).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::EngagementConfig;

/// Where a hit landed on an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitZone {
    Head,
    Torso,
    Body,
    Armor,
    /// Struck the agent's own weapon: a clash, no damage
    Weapon,
}

impl HitZone {
    pub fn is_flesh(&self) -> bool {
        matches!(self, HitZone::Head | HitZone::Torso | HitZone::Body)
    }
}

/// A single incoming hit, as reported by the defender's weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub zone: HitZone,
    pub damage: i32,
    pub armor_penetration: i32,
    pub shred: i32,
}

impl Hit {
    pub fn new(zone: HitZone, damage: i32) -> Self {
        Self {
            zone,
            damage,
            armor_penetration: 0,
            shred: 0,
        }
    }
}

/// Result of resolving a hit against an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Weapon-on-weapon contact
    Clash,
    /// Target already dead
    Ignored,
    Damaged { dealt: i32, stun: Option<f32> },
    Killed { dealt: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    pub armor: i32,
    pub max_armor: i32,
}

impl Health {
    pub fn new(max: i32, max_armor: i32) -> Self {
        let max = max.max(1);
        let max_armor = max_armor.max(0);
        Self {
            current: max,
            max,
            armor: max_armor,
            max_armor,
        }
    }

    pub fn from_config(config: &EngagementConfig) -> Self {
        Self::new(config.max_health, config.max_armor)
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    /// Apply damage; returns the amount that got through armor
    pub fn take_damage(&mut self, damage: i32, armor_penetration: i32, shred: i32) -> i32 {
        let effective_armor = self.armor.saturating_sub(armor_penetration.max(0)).max(0);
        let dealt = damage.saturating_sub(effective_armor).max(0);
        self.current = self.current.saturating_sub(dealt);

        if shred > 0 && self.armor > 0 {
            self.armor = (self.armor - shred).max(0);
        }

        dealt
    }
}

/// Damage after zone modifiers (head hits are multiplied)
pub fn zone_damage(hit: &Hit, config: &EngagementConfig) -> i32 {
    match hit.zone {
        HitZone::Head => (hit.damage as f32 * config.head_damage_multiplier).round() as i32,
        HitZone::Weapon => 0,
        _ => hit.damage,
    }
}

/// Stun (duration, chance) configured for a zone
pub fn stun_profile(zone: HitZone, config: &EngagementConfig) -> Option<(f32, f32)> {
    if zone.is_flesh() {
        Some((config.flesh_stun_duration, config.flesh_stun_chance))
    } else if zone == HitZone::Armor {
        Some((config.armor_stun_duration, config.armor_stun_chance))
    } else {
        None
    }
}

/// Roll for a stun; returns the duration to apply on success
pub fn roll_stun<R: Rng>(zone: HitZone, config: &EngagementConfig, rng: &mut R) -> Option<f32> {
    let (duration, chance) = stun_profile(zone, config)?;
    if duration <= 0.0 || chance <= 0.0 {
        return None;
    }
    let roll: f32 = rng.gen();
    (roll <= chance).then_some(duration)
}
