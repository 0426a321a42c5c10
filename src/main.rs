//! Arena Melee - Headless Engagement Runner
//!
//! Spawns a ring of attackers around a defender anchor, runs the engagement
//! for a fixed number of ticks and prints a summary. The runner plays the
//! host side: it opens a hit window whenever an attack is triggered, closes
//! it a few ticks later, and lands random defender hits.

use std::path::PathBuf;

use ahash::AHashMap;
use arena_melee::core::error::Result;
use arena_melee::core::types::{AgentId, Tick};
use arena_melee::engagement::{EngagementEvent, EngagementState, Hit, HitZone};
use arena_melee::{EngagementConfig, EngagementWorld};
use clap::Parser;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const DEFENDER_ZONES: [HitZone; 5] = [
    HitZone::Head,
    HitZone::Torso,
    HitZone::Body,
    HitZone::Armor,
    HitZone::Weapon,
];

/// Headless melee engagement runner
#[derive(Parser, Debug)]
#[command(name = "arena_melee")]
#[command(about = "Run a melee engagement around a single defender and report what happened")]
struct Args {
    /// Number of attackers spawned on the ring
    #[arg(long, default_value_t = 8)]
    agents: usize,

    /// Ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seed for the world and the host's random hits
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override max_simultaneous_attackers
    #[arg(long)]
    max_attackers: Option<usize>,

    /// Defender drift speed along +X (units per second)
    #[arg(long, default_value_t = 0.0)]
    target_drift: f32,

    /// Spawn ring radius
    #[arg(long, default_value_t = 6.0)]
    radius: f32,

    /// Ticks an attack keeps its hit window open
    #[arg(long, default_value_t = 12)]
    swing_ticks: u64,

    /// Per-tick chance the defender lands a hit on an engaged attacker
    #[arg(long, default_value_t = 0.02)]
    hit_chance: f64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize, Default)]
struct RunSummary {
    ticks: u64,
    agents: usize,
    seed: u64,
    inactive: usize,
    approaching: usize,
    attacking: usize,
    attacks_triggered: usize,
    max_simultaneous_attackers: usize,
    stuns: usize,
    hits: usize,
    deaths: usize,
    state_changes: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("arena_melee=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngagementConfig::load(path)?,
        None => EngagementConfig::default(),
    };
    if let Some(max) = args.max_attackers {
        config.max_simultaneous_attackers = max;
    }
    let seed = args.seed.unwrap_or(config.seed);
    config.seed = seed;

    tracing::info!(
        "Starting engagement: {} agents, {} ticks, seed {}",
        args.agents,
        args.ticks,
        seed
    );

    let mut world = EngagementWorld::new(config);
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let mut target = Vec3::ZERO;
    world.set_target(Some(target));

    let ids = spawn_ring(&mut world, args.agents, args.radius);
    for &id in &ids {
        world.begin_combat(id)?;
    }

    let dt = world.config().tick_seconds;
    let mut summary = RunSummary {
        agents: args.agents,
        seed,
        ..Default::default()
    };
    // Hit windows the host has to close, keyed by agent
    let mut swings: AHashMap<AgentId, Tick> = AHashMap::new();

    for _ in 0..args.ticks {
        if args.target_drift != 0.0 {
            target.x += args.target_drift * dt;
            world.set_target(Some(target));
        }

        let events = world.tick(dt);
        let now = world.current_tick;

        for event in &events {
            tally(&mut summary, event);
            if let EngagementEvent::AttackTriggered { agent, .. } = event {
                if world.begin_hit_window(*agent)? {
                    swings.insert(*agent, now + args.swing_ticks);
                }
            }
        }

        close_finished_swings(&mut world, &mut swings, now)?;

        if rng.gen_bool(args.hit_chance.clamp(0.0, 1.0)) {
            land_random_hit(&mut world, &ids, &mut rng)?;
        }

        summary.max_simultaneous_attackers =
            summary.max_simultaneous_attackers.max(world.attacking_count());
    }

    // Lifecycle events raised after the last tick
    for event in world.drain_events() {
        tally(&mut summary, &event);
    }

    summary.ticks = world.current_tick;
    for agent in world.agents() {
        match agent.state {
            EngagementState::Inactive => summary.inactive += 1,
            EngagementState::Approaching => summary.approaching += 1,
            EngagementState::Attacking => summary.attacking += 1,
        }
    }

    tracing::info!("Engagement finished after {} ticks", summary.ticks);

    match args.format.as_str() {
        "text" => print_text(&summary),
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        other => {
            tracing::warn!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// Evenly spaced attackers on a circle around the origin
fn spawn_ring(world: &mut EngagementWorld, count: usize, radius: f32) -> Vec<AgentId> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / count.max(1) as f32;
            world.spawn(Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius))
        })
        .collect()
}

/// End every hit window whose swing has run its course
fn close_finished_swings(
    world: &mut EngagementWorld,
    swings: &mut AHashMap<AgentId, Tick>,
    now: Tick,
) -> Result<()> {
    let mut finished: Vec<AgentId> = swings
        .iter()
        .filter(|(_, until)| **until <= now)
        .map(|(&id, _)| id)
        .collect();
    finished.sort();

    for id in finished {
        swings.remove(&id);
        world.end_hit_window(id)?;
    }
    Ok(())
}

fn land_random_hit(world: &mut EngagementWorld, ids: &[AgentId], rng: &mut StdRng) -> Result<()> {
    let engaged: Vec<AgentId> = ids
        .iter()
        .copied()
        .filter(|&id| {
            world
                .agent(id)
                .map(|agent| agent.is_simulating() && agent.state.is_active())
                .unwrap_or(false)
        })
        .collect();
    if engaged.is_empty() {
        return Ok(());
    }

    let victim = engaged[rng.gen_range(0..engaged.len())];
    let zone = DEFENDER_ZONES[rng.gen_range(0..DEFENDER_ZONES.len())];
    world.apply_hit(victim, Hit::new(zone, 1))?;
    Ok(())
}

fn tally(summary: &mut RunSummary, event: &EngagementEvent) {
    match event {
        EngagementEvent::AttackTriggered { .. } => summary.attacks_triggered += 1,
        EngagementEvent::StunBegan { .. } => summary.stuns += 1,
        EngagementEvent::HitResolved { .. } => summary.hits += 1,
        EngagementEvent::AgentDied { .. } => summary.deaths += 1,
        EngagementEvent::StateChanged { .. } => summary.state_changes += 1,
        _ => {}
    }
}

fn print_text(summary: &RunSummary) {
    println!("Engagement Summary");
    println!("==================");
    println!("Ticks: {}", summary.ticks);
    println!("Agents: {}", summary.agents);
    println!(
        "Final states: {} inactive, {} approaching, {} attacking",
        summary.inactive, summary.approaching, summary.attacking
    );
    println!("Attacks triggered: {}", summary.attacks_triggered);
    println!("Max simultaneous attackers: {}", summary.max_simultaneous_attackers);
    println!("Hits: {} (stuns: {}, deaths: {})", summary.hits, summary.stuns, summary.deaths);
    println!("State changes: {}", summary.state_changes);
    println!();
    println!("Seed: {}", summary.seed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swings_close_only_when_due() {
        let mut world = EngagementWorld::new(EngagementConfig::default());
        world.set_target(Some(Vec3::ZERO));
        let ids = spawn_ring(&mut world, 2, 3.0);
        for &id in &ids {
            world.begin_combat(id).expect("agent exists");
            world.begin_hit_window(id).expect("agent exists");
        }

        let mut swings = AHashMap::new();
        swings.insert(ids[0], 5);
        swings.insert(ids[1], 9);

        close_finished_swings(&mut world, &mut swings, 5).expect("agents exist");
        assert!(!swings.contains_key(&ids[0]));
        assert!(swings.contains_key(&ids[1]));
        assert_eq!(world.agent(ids[0]).map(|a| a.attack.hit_window_open()), Some(false));
        assert_eq!(world.agent(ids[1]).map(|a| a.attack.hit_window_open()), Some(true));
    }
}
