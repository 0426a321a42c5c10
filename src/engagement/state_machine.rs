//! Per-agent engagement state machine
//!
//! `step_agent` is the compute half of a tick. It reads a frozen snapshot
//! of every other agent and returns this agent's next state; it never
//! touches shared storage, so agents can be stepped in any order (or in
//! parallel) with identical results. The world commits the steps
//! afterwards and enforces the attacker cap across all of them.
//!
//! Transitions:
//! - Inactive -> Approaching: `begin_combat` (world lifecycle call)
//! - Approaching -> Attacking: frontline and within attack range
//! - Attacking -> Approaching: beyond twice the attack range, or no longer frontline
//! - any -> Inactive: `stop_combat`, death or disable (world lifecycle calls)

use glam::Vec3;

use crate::core::config::EngagementConfig;
use crate::core::types::{horizontal, turn_towards, yaw_towards, Tick, DIRECTION_EPSILON_SQ};
use crate::engagement::agent::{Agent, EngagementState};
use crate::engagement::arena::ArenaClamp;
use crate::engagement::constants::{APPROACH_MIN_DISTANCE, SLOT_ARRIVAL_DISTANCE};
use crate::engagement::events::EngagementEvent;
use crate::engagement::rank::is_frontline;
use crate::engagement::registry::PeerSnapshot;
use crate::engagement::separation::enforce_separation;
use crate::engagement::slot::SlotFinder;

/// Everything an agent may read while planning its tick
pub struct TickContext<'a> {
    pub config: &'a EngagementConfig,
    pub arena: &'a dyn ArenaClamp,
    pub peers: &'a PeerSnapshot,
    /// Defender anchor; `None` leaves engagement logic inert
    pub target: Option<Vec3>,
    pub dt: f32,
    pub tick: Tick,
}

impl TickContext<'_> {
    fn turn_fraction(&self) -> f32 {
        (self.config.turn_rate * self.dt).min(1.0)
    }

    fn frontline(&self, agent: &Agent, target: Vec3) -> bool {
        is_frontline(agent.id, agent.position, target, self.peers, self.config.max_attackers())
    }
}

/// Planned next state of one agent plus the signals it raised
#[derive(Debug, Clone)]
pub struct AgentStep {
    pub agent: Agent,
    pub events: Vec<EngagementEvent>,
}

pub fn step_agent(mut agent: Agent, ctx: &TickContext<'_>) -> AgentStep {
    let mut events = Vec::new();

    if !agent.is_simulating() {
        return AgentStep { agent, events };
    }

    if agent.stun.tick(ctx.dt) {
        events.push(EngagementEvent::StunEnded {
            agent: agent.id,
            tick: ctx.tick,
        });
    }

    if let Some(target) = ctx.target {
        match agent.state {
            EngagementState::Inactive => {}
            EngagementState::Approaching => update_approach(&mut agent, target, ctx),
            EngagementState::Attacking => update_attack(&mut agent, target, ctx, &mut events),
        }
    }

    // Stunned agents idle in place
    if agent.stun.is_stunned() {
        agent.move_speed = 0.0;
    }

    AgentStep { agent, events }
}

fn update_approach(agent: &mut Agent, target: Vec3, ctx: &TickContext<'_>) {
    if agent.stun.is_stunned() || agent.attack.hit_window_open() {
        return;
    }

    let to_target = horizontal(target - agent.position);
    let dist = to_target.length();
    if dist < APPROACH_MIN_DISTANCE {
        agent.move_speed = 0.0;
        return;
    }

    let dir_to_target = to_target / dist;
    let frontline = ctx.frontline(agent, target);
    let slot = SlotFinder::new(ctx.config, ctx.arena, ctx.peers).find(agent.id, target, dir_to_target, frontline);

    let to_slot = horizontal(slot - agent.position);
    let slot_dist = to_slot.length();

    if slot_dist > SLOT_ARRIVAL_DISTANCE {
        let move_dir = to_slot / slot_dist;
        let speed = ctx.config.approach_speed(frontline);
        // Never step past the slot
        let step = (speed * ctx.dt).min(slot_dist);

        let mut proposed = agent.position + move_dir * step;
        proposed.y = agent.position.y;
        commit_move(agent, proposed, ctx);

        agent.move_speed = speed;
        face(agent, move_dir, ctx.turn_fraction());
    } else {
        agent.move_speed = 0.0;
        face(agent, dir_to_target, ctx.turn_fraction());
    }

    if frontline && dist <= ctx.config.attack_range {
        agent.state = EngagementState::Attacking;
        agent.attack.reset(ctx.config, &mut agent.rng);
    }
}

fn update_attack(agent: &mut Agent, target: Vec3, ctx: &TickContext<'_>, events: &mut Vec<EngagementEvent>) {
    if agent.stun.is_stunned() {
        return;
    }

    // An open hit window freezes positioning but the timer keeps running
    if agent.attack.hit_window_open() {
        agent.move_speed = 0.0;
    } else {
        let to_target = horizontal(target - agent.position);

        if to_target.length_squared() > DIRECTION_EPSILON_SQ {
            let dist = to_target.length();
            let dir_to_target = to_target / dist;

            if dist > ctx.config.hard_exit_distance() || !ctx.frontline(agent, target) {
                agent.state = EngagementState::Approaching;
                return;
            }

            hold_position(agent, dir_to_target, dist, ctx);
            face(agent, dir_to_target, ctx.turn_fraction());
        } else {
            agent.move_speed = 0.0;
        }
    }

    if let Some(trigger) = agent.attack.advance(ctx.dt, ctx.config, &mut agent.rng) {
        events.push(EngagementEvent::AttackTriggered {
            agent: agent.id,
            variant: trigger.variant,
            crossfade: trigger.crossfade,
            tick: ctx.tick,
        });
    }
}

/// Small in-place corrections toward `stop_distance`, outside a dead band
fn hold_position(agent: &mut Agent, dir_to_target: Vec3, dist: f32, ctx: &TickContext<'_>) {
    let config = ctx.config;
    let direction = if dist > config.stop_distance + config.hold_band {
        dir_to_target
    } else if dist < config.stop_distance - config.hold_band {
        -dir_to_target
    } else {
        agent.move_speed = 0.0;
        return;
    };

    let speed = config.combat_move_speed * config.hold_speed_factor;
    let mut proposed = agent.position + direction * (speed * ctx.dt);
    proposed.y = agent.position.y;
    commit_move(agent, proposed, ctx);
    agent.move_speed = speed;
}

/// Separation first, then the arena clamp
fn commit_move(agent: &mut Agent, proposed: Vec3, ctx: &TickContext<'_>) {
    let separated = enforce_separation(
        agent.id,
        proposed,
        ctx.config.min_distance_from_other_enemies,
        ctx.peers,
    );
    agent.position = ctx.arena.clamp_to_arena(separated);
}

fn face(agent: &mut Agent, dir: Vec3, t: f32) {
    if let Some(yaw) = yaw_towards(dir) {
        agent.facing = turn_towards(agent.facing, yaw, t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{horizontal_distance, AgentId};
    use crate::engagement::arena::ArenaBounds;
    use crate::engagement::registry::Peer;

    fn agent_at(id: u64, position: Vec3, state: EngagementState, config: &EngagementConfig) -> Agent {
        let mut agent = Agent::new(AgentId(id), position, config);
        agent.state = state;
        agent
    }

    fn peers_of(agents: &[&Agent]) -> PeerSnapshot {
        PeerSnapshot::new(
            agents
                .iter()
                .map(|a| Peer {
                    id: a.id,
                    position: a.position,
                    state: a.state,
                })
                .collect(),
        )
    }

    fn context<'a>(
        config: &'a EngagementConfig,
        arena: &'a ArenaBounds,
        peers: &'a PeerSnapshot,
        target: Option<Vec3>,
    ) -> TickContext<'a> {
        TickContext {
            config,
            arena,
            peers,
            target,
            dt: 0.1,
            tick: 0,
        }
    }

    #[test]
    fn test_inactive_agent_does_nothing() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let agent = agent_at(0, Vec3::new(5.0, 0.0, 0.0), EngagementState::Inactive, &config);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent.clone(), &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert_eq!(step.agent.position, agent.position);
        assert_eq!(step.agent.state, EngagementState::Inactive);
    }

    #[test]
    fn test_approach_moves_toward_target() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let agent = agent_at(0, Vec3::new(10.0, 0.0, 0.0), EngagementState::Approaching, &config);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent, &context(&config, &arena, &peers, Some(Vec3::ZERO)));

        assert!((step.agent.position.x - (10.0 - 2.0 * 0.1)).abs() < 1e-4);
        assert_eq!(step.agent.move_speed, config.combat_move_speed);
        assert_eq!(step.agent.state, EngagementState::Approaching);
        // Facing -X
        assert!((step.agent.facing.abs() - std::f32::consts::FRAC_PI_2).abs() < 1.0);
    }

    #[test]
    fn test_enters_attack_in_range() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let agent = agent_at(0, Vec3::new(1.5, 0.0, 0.0), EngagementState::Approaching, &config);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent, &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert_eq!(step.agent.state, EngagementState::Attacking);
        assert_eq!(step.agent.attack.timer(), 0.0);
    }

    #[test]
    fn test_backline_agent_does_not_attack() {
        let config = EngagementConfig {
            max_simultaneous_attackers: 1,
            ..Default::default()
        };
        let arena = ArenaBounds::Unbounded;
        let front = agent_at(0, Vec3::new(1.0, 0.0, 0.0), EngagementState::Attacking, &config);
        let back = agent_at(1, Vec3::new(0.0, 0.0, 1.5), EngagementState::Approaching, &config);
        let peers = peers_of(&[&front, &back]);
        let step = step_agent(back, &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert_eq!(step.agent.state, EngagementState::Approaching);
        assert!(step.agent.move_speed <= config.approach_speed(false) + 1e-6);
    }

    #[test]
    fn test_attacker_leaves_when_target_far() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let agent = agent_at(0, Vec3::new(3.5, 0.0, 0.0), EngagementState::Attacking, &config);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent.clone(), &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert_eq!(step.agent.state, EngagementState::Approaching);
        assert_eq!(step.agent.position, agent.position);
    }

    #[test]
    fn test_attacker_leaves_when_overtaken() {
        let config = EngagementConfig {
            max_simultaneous_attackers: 1,
            ..Default::default()
        };
        let arena = ArenaBounds::Unbounded;
        let attacker = agent_at(0, Vec3::new(1.3, 0.0, 0.0), EngagementState::Attacking, &config);
        let rival = agent_at(1, Vec3::new(0.0, 0.0, 0.8), EngagementState::Approaching, &config);
        let peers = peers_of(&[&attacker, &rival]);

        let step = step_agent(attacker.clone(), &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert_eq!(step.agent.state, EngagementState::Approaching);
        assert_eq!(step.agent.position, attacker.position);
        assert!(step.events.is_empty());
    }

    #[test]
    fn test_attacker_holds_inside_dead_band() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let agent = agent_at(0, Vec3::new(1.4, 0.0, 0.0), EngagementState::Attacking, &config);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent.clone(), &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert_eq!(step.agent.state, EngagementState::Attacking);
        assert_eq!(step.agent.position, agent.position);
        assert_eq!(step.agent.move_speed, 0.0);
    }

    #[test]
    fn test_attacker_closes_distance_outside_band() {
        let config = EngagementConfig {
            attack_range: 2.0,
            ..Default::default()
        };
        let arena = ArenaBounds::Unbounded;
        let agent = agent_at(0, Vec3::new(1.9, 0.0, 0.0), EngagementState::Attacking, &config);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent, &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert!(step.agent.position.x < 1.9);
        assert_eq!(step.agent.move_speed, config.combat_move_speed * config.hold_speed_factor);
    }

    #[test]
    fn test_stunned_agent_frozen() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let mut agent = agent_at(0, Vec3::new(10.0, 0.0, 0.0), EngagementState::Approaching, &config);
        agent.stun.apply(1.0);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent.clone(), &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert_eq!(step.agent.position, agent.position);
        assert_eq!(step.agent.move_speed, 0.0);
        assert!((step.agent.stun.remaining() - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_stun_end_signalled() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let mut agent = agent_at(0, Vec3::new(10.0, 0.0, 0.0), EngagementState::Approaching, &config);
        agent.stun.apply(0.05);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent, &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert!(step
            .events
            .iter()
            .any(|e| matches!(e, EngagementEvent::StunEnded { .. })));
    }

    #[test]
    fn test_hit_window_freezes_attacker() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        // Far enough that an unfrozen attacker would leave
        let mut agent = agent_at(0, Vec3::new(5.0, 0.0, 0.0), EngagementState::Attacking, &config);
        agent.attack.begin_hit_window();
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent.clone(), &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert_eq!(step.agent.state, EngagementState::Attacking);
        assert_eq!(step.agent.position, agent.position);
        assert!(step.agent.attack.timer() > 0.0);
    }

    #[test]
    fn test_attack_triggers_after_interval() {
        let config = EngagementConfig {
            attack_interval_min: 0.1,
            attack_interval_max: 0.1,
            ..Default::default()
        };
        let arena = ArenaBounds::Unbounded;
        let agent = agent_at(0, Vec3::new(1.3, 0.0, 0.0), EngagementState::Attacking, &config);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent, &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert!(step
            .events
            .iter()
            .any(|e| matches!(e, EngagementEvent::AttackTriggered { .. })));
    }

    #[test]
    fn test_no_target_is_inert() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let agent = agent_at(0, Vec3::new(10.0, 0.0, 0.0), EngagementState::Approaching, &config);
        let peers = peers_of(&[&agent]);
        let step = step_agent(agent.clone(), &context(&config, &arena, &peers, None));
        assert_eq!(step.agent.position, agent.position);
        assert!(step.events.is_empty());
    }

    #[test]
    fn test_on_top_of_target_holds_without_nan() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let target = Vec3::new(2.0, 0.0, 2.0);
        for state in [EngagementState::Approaching, EngagementState::Attacking] {
            let agent = agent_at(0, target + Vec3::Y, state, &config);
            let peers = peers_of(&[&agent]);
            let step = step_agent(agent.clone(), &context(&config, &arena, &peers, Some(target)));
            assert!(step.agent.position.is_finite());
            assert!(step.agent.facing.is_finite());
            assert_eq!(step.agent.position, agent.position);
        }
    }

    #[test]
    fn test_separation_applied_while_approaching() {
        let config = EngagementConfig::default();
        let arena = ArenaBounds::Unbounded;
        let blocker = agent_at(1, Vec3::new(4.6, 0.0, 0.0), EngagementState::Approaching, &config);
        let agent = agent_at(0, Vec3::new(5.0, 0.0, 0.0), EngagementState::Approaching, &config);
        let peers = peers_of(&[&agent, &blocker]);
        let step = step_agent(agent, &context(&config, &arena, &peers, Some(Vec3::ZERO)));
        assert!(horizontal_distance(step.agent.position, blocker.position) >= config.min_distance_from_other_enemies - 1e-4);
    }
}
