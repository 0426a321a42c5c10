//! Tick system - advances every engaged agent by one step
//!
//! Each tick runs in two phases:
//! 1. Compute: snapshot committed positions/states of registered agents,
//!    then step every agent against that snapshot (rayon above the
//!    configured agent count). No agent sees another's in-tick movement,
//!    so results do not depend on iteration order.
//! 2. Commit: cap simultaneous attackers, write the steps back and emit
//!    state changes.

use glam::Vec3;
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::core::types::horizontal_distance_sq;
use crate::engagement::agent::EngagementState;
use crate::engagement::events::EngagementEvent;
use crate::engagement::state_machine::{step_agent, AgentStep, TickContext};
use crate::simulation::world::EngagementWorld;

/// Run one engagement tick and return everything that happened
///
/// Events raised by lifecycle calls since the previous tick come first.
pub fn run_engagement_tick(world: &mut EngagementWorld, dt: f32) -> Vec<EngagementEvent> {
    let dt = if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        tracing::warn!("Ignoring invalid tick delta {}", dt);
        0.0
    };

    let tick = world.current_tick;
    let mut events = std::mem::take(&mut world.pending_events);

    // Compute phase
    let snapshot = world.registry.snapshot(&world.agents);
    let ctx = TickContext {
        config: &world.config,
        arena: world.arena.as_ref(),
        peers: &snapshot,
        target: world.target,
        dt,
        tick,
    };

    let mut steps: Vec<AgentStep> = if world.agents.len() >= world.config.parallel_threshold {
        world
            .agents
            .par_iter()
            .map(|agent| step_agent(agent.clone(), &ctx))
            .collect()
    } else {
        world
            .agents
            .iter()
            .map(|agent| step_agent(agent.clone(), &ctx))
            .collect()
    };

    // Commit phase
    let previous: Vec<EngagementState> = world.agents.iter().map(|agent| agent.state).collect();

    if let Some(target) = world.target {
        enforce_attacker_cap(&mut steps, &previous, target, world.config.max_attackers());
    }

    for (idx, step) in steps.into_iter().enumerate() {
        let from = previous[idx];
        let to = step.agent.state;

        if from != to {
            debug_assert!(from.can_transition_to(to));
            tracing::debug!("{} {:?} -> {:?} at tick {}", step.agent.id, from, to, tick);
            events.push(EngagementEvent::StateChanged {
                agent: step.agent.id,
                from,
                to,
                tick,
            });
        }

        events.extend(step.events);
        world.agents[idx] = step.agent;
    }

    world.current_tick += 1;
    events
}

/// Keep at most `cap` agents Attacking after a tick
///
/// Rank ties inside the hysteresis band can let more agents than the cap
/// read as frontline in the same tick. Incumbent attackers keep their slot,
/// then the closest newcomers, then the lowest id.
fn enforce_attacker_cap(
    steps: &mut [AgentStep],
    previous: &[EngagementState],
    target: Vec3,
    cap: usize,
) {
    let mut attackers: Vec<_> = steps
        .iter()
        .enumerate()
        .filter(|(_, step)| step.agent.is_simulating() && step.agent.is_attacking())
        .map(|(idx, step)| {
            let incumbent = previous[idx] == EngagementState::Attacking;
            let dist_sq = OrderedFloat(horizontal_distance_sq(step.agent.position, target));
            (idx, incumbent, dist_sq, step.agent.id)
        })
        .collect();

    if attackers.len() <= cap {
        return;
    }

    attackers.sort_by_key(|&(_, incumbent, dist_sq, id)| (!incumbent, dist_sq, id));

    for &(idx, _, _, id) in &attackers[cap..] {
        tracing::debug!("{} over the attacker cap, falling back", id);
        steps[idx].agent.state = EngagementState::Approaching;
    }
}
