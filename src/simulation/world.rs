//! Engagement world - owns every agent, the registry and the target anchor
//!
//! All lifecycle edges (spawn, begin/stop combat, stun, hits, death,
//! disable, despawn) go through here and take effect immediately, so an
//! agent that dies between ticks is already gone from the registry when
//! the next tick snapshots it. Events raised by lifecycle calls are queued
//! and handed out with the next tick's events (or via `drain_events`).

use ahash::AHashMap;
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::EngagementConfig;
use crate::core::error::{EngagementError, Result};
use crate::core::types::{AgentId, Tick};
use crate::engagement::agent::{Agent, EngagementState, HitboxMode};
use crate::engagement::arena::ArenaClamp;
use crate::engagement::events::EngagementEvent;
use crate::engagement::health::{roll_stun, zone_damage, Hit, HitOutcome, HitZone};
use crate::engagement::rank;
use crate::engagement::registry::AgentRegistry;
use crate::simulation::tick::run_engagement_tick;

pub struct EngagementWorld {
    pub current_tick: Tick,
    pub(crate) config: EngagementConfig,
    pub(crate) arena: Box<dyn ArenaClamp>,
    pub(crate) target: Option<Vec3>,
    pub(crate) agents: Vec<Agent>,
    pub(crate) registry: AgentRegistry,
    pub(crate) pending_events: Vec<EngagementEvent>,
    index: AHashMap<AgentId, usize>,
    next_id: u64,
    rng: ChaCha8Rng,
    warned_missing_target: bool,
}

impl EngagementWorld {
    /// World clamped by the arena described in `config`
    pub fn new(config: EngagementConfig) -> Self {
        let arena = config.arena;
        Self::with_arena(config, arena)
    }

    /// World with a custom arena clamp (e.g. a navmesh projection)
    pub fn with_arena(config: EngagementConfig, arena: impl ArenaClamp + 'static) -> Self {
        let config = config.sanitized();
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Self {
            current_tick: 0,
            config,
            arena: Box::new(arena),
            target: None,
            agents: Vec::new(),
            registry: AgentRegistry::new(),
            pending_events: Vec::new(),
            index: AHashMap::new(),
            next_id: 0,
            rng,
            warned_missing_target: false,
        }
    }

    pub fn config(&self) -> &EngagementConfig {
        &self.config
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// Move (or remove) the defender anchor
    pub fn set_target(&mut self, target: Option<Vec3>) {
        self.target = target;
    }

    /// Create an agent in the Inactive state and register it
    pub fn spawn(&mut self, position: Vec3) -> AgentId {
        let id = AgentId::new(self.next_id);
        self.next_id += 1;

        self.index.insert(id, self.agents.len());
        self.agents.push(Agent::new(id, position, &self.config));
        self.registry.insert(id);

        tracing::debug!("Spawned {} at {:?}", id, position);
        id
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.index.get(&id).map(|&idx| &self.agents[idx])
    }

    /// Agents in spawn order (the order they are stepped in)
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_registered(&self, id: AgentId) -> bool {
        self.registry.contains(id)
    }

    pub fn attacking_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.is_simulating() && agent.is_attacking())
            .count()
    }

    /// Teleport an agent (used by the path-following layer on arrival)
    pub fn set_position(&mut self, id: AgentId, position: Vec3) -> Result<()> {
        let idx = self.index_of(id)?;
        self.agents[idx].position = position;
        Ok(())
    }

    /// Inactive -> Approaching
    ///
    /// Returns false (and changes nothing) when there is no target, the
    /// agent is dead or disabled, or it is already engaged. A missing
    /// target is reported once per world.
    pub fn begin_combat(&mut self, id: AgentId) -> Result<bool> {
        let idx = self.index_of(id)?;

        if self.target.is_none() {
            if !self.warned_missing_target {
                tracing::warn!("begin_combat for {} ignored: no target anchor set", id);
                self.warned_missing_target = true;
            }
            return Ok(false);
        }

        let tick = self.current_tick;
        let agent = &mut self.agents[idx];
        if !agent.is_simulating() || agent.state != EngagementState::Inactive {
            return Ok(false);
        }

        agent.state = EngagementState::Approaching;
        agent.attack.reset(&self.config, &mut agent.rng);
        agent.move_speed = 0.0;

        self.pending_events.push(EngagementEvent::StateChanged {
            agent: id,
            from: EngagementState::Inactive,
            to: EngagementState::Approaching,
            tick,
        });

        if agent.hitbox_mode != HitboxMode::Melee {
            agent.hitbox_mode = HitboxMode::Melee;
            self.pending_events
                .push(EngagementEvent::MeleeHitboxesEnabled { agent: id, tick });
        }

        self.registry.insert(id);
        tracing::debug!("{} entered combat", id);
        Ok(true)
    }

    /// Any -> Inactive; the agent leaves the registry until it re-engages
    pub fn stop_combat(&mut self, id: AgentId) -> Result<bool> {
        let idx = self.index_of(id)?;
        let tick = self.current_tick;
        let agent = &mut self.agents[idx];

        if agent.state == EngagementState::Inactive {
            return Ok(false);
        }

        let from = agent.state;
        agent.state = EngagementState::Inactive;
        agent.move_speed = 0.0;
        let window_closed = agent.attack.end_hit_window();

        self.registry.remove(id);

        if window_closed {
            self.pending_events
                .push(EngagementEvent::HitWindowEnded { agent: id, tick });
        }
        self.pending_events.push(EngagementEvent::StateChanged {
            agent: id,
            from,
            to: EngagementState::Inactive,
            tick,
        });

        tracing::debug!("{} left combat", id);
        Ok(true)
    }

    /// External death signal; returns false if the agent was already dead
    pub fn kill(&mut self, id: AgentId) -> Result<bool> {
        let idx = self.index_of(id)?;
        let tick = self.current_tick;
        let agent = &mut self.agents[idx];

        if agent.is_dead {
            return Ok(false);
        }

        agent.is_dead = true;
        self.retire(idx, tick);
        self.pending_events
            .push(EngagementEvent::AgentDied { agent: id, tick });

        tracing::debug!("{} died", id);
        Ok(true)
    }

    /// Permanently stop simulating an agent without killing it
    pub fn disable(&mut self, id: AgentId) -> Result<bool> {
        let idx = self.index_of(id)?;
        let tick = self.current_tick;

        if !self.agents[idx].enabled {
            return Ok(false);
        }

        self.agents[idx].enabled = false;
        self.retire(idx, tick);

        tracing::debug!("{} disabled", id);
        Ok(true)
    }

    /// Remove an agent from the world entirely
    pub fn despawn(&mut self, id: AgentId) -> Result<Agent> {
        let idx = self.index_of(id)?;
        let agent = self.agents.remove(idx);

        self.registry.remove(id);
        self.index.remove(&id);
        for (i, remaining) in self.agents.iter().enumerate().skip(idx) {
            self.index.insert(remaining.id, i);
        }

        tracing::debug!("{} despawned", id);
        Ok(agent)
    }

    /// Stun for `duration` seconds; returns true when the agent became stunned
    ///
    /// Stuns never shorten a running one. A fresh stun interrupts any open
    /// hit window.
    pub fn apply_stun(&mut self, id: AgentId, duration: f32) -> Result<bool> {
        let idx = self.index_of(id)?;
        let tick = self.current_tick;
        let agent = &mut self.agents[idx];

        if !agent.is_simulating() {
            return Ok(false);
        }

        if !agent.stun.apply(duration) {
            return Ok(false);
        }

        agent.move_speed = 0.0;
        self.pending_events.push(EngagementEvent::StunBegan {
            agent: id,
            duration: agent.stun.remaining(),
            tick,
        });
        if agent.attack.end_hit_window() {
            self.pending_events
                .push(EngagementEvent::HitWindowEnded { agent: id, tick });
        }

        Ok(true)
    }

    /// Resolve a defender hit: damage, possible stun, possible death
    pub fn apply_hit(&mut self, id: AgentId, hit: Hit) -> Result<HitOutcome> {
        let idx = self.index_of(id)?;
        let tick = self.current_tick;

        let outcome = {
            let agent = &mut self.agents[idx];
            if !agent.is_simulating() {
                HitOutcome::Ignored
            } else if hit.zone == HitZone::Weapon {
                HitOutcome::Clash
            } else {
                let damage = zone_damage(&hit, &self.config);
                let dealt = agent
                    .health
                    .take_damage(damage, hit.armor_penetration, hit.shred);

                if agent.health.is_depleted() {
                    HitOutcome::Killed { dealt }
                } else {
                    let stun = roll_stun(hit.zone, &self.config, &mut self.rng);
                    HitOutcome::Damaged { dealt, stun }
                }
            }
        };

        if outcome != HitOutcome::Ignored {
            self.pending_events.push(EngagementEvent::HitResolved {
                agent: id,
                zone: hit.zone,
                outcome,
                tick,
            });
        }

        match outcome {
            HitOutcome::Killed { .. } => {
                self.kill(id)?;
            }
            HitOutcome::Damaged {
                stun: Some(duration),
                ..
            } => {
                self.apply_stun(id, duration)?;
            }
            _ => {}
        }

        Ok(outcome)
    }

    /// Attack animation reached its damaging frames
    ///
    /// Ignored for stunned, dead or disabled agents.
    pub fn begin_hit_window(&mut self, id: AgentId) -> Result<bool> {
        let idx = self.index_of(id)?;
        let tick = self.current_tick;
        let agent = &mut self.agents[idx];

        if !agent.is_simulating() || agent.stun.is_stunned() {
            return Ok(false);
        }

        let opened = agent.attack.begin_hit_window();
        if opened {
            self.pending_events
                .push(EngagementEvent::HitWindowBegan { agent: id, tick });
        }
        Ok(opened)
    }

    pub fn end_hit_window(&mut self, id: AgentId) -> Result<bool> {
        let idx = self.index_of(id)?;
        let tick = self.current_tick;

        let closed = self.agents[idx].attack.end_hit_window();
        if closed {
            self.pending_events
                .push(EngagementEvent::HitWindowEnded { agent: id, tick });
        }
        Ok(closed)
    }

    /// Rank against the committed state; `None` without a target
    pub fn distance_rank(&self, id: AgentId) -> Result<Option<usize>> {
        let idx = self.index_of(id)?;
        let Some(target) = self.target else {
            return Ok(None);
        };

        let snapshot = self.registry.snapshot(&self.agents);
        let agent = &self.agents[idx];
        Ok(Some(rank::distance_rank(agent.id, agent.position, target, &snapshot)))
    }

    pub fn is_frontline(&self, id: AgentId) -> Result<Option<bool>> {
        let max_attackers = self.config.max_attackers();
        Ok(self
            .distance_rank(id)?
            .map(|rank| rank < max_attackers))
    }

    /// Take events raised by lifecycle calls since the last tick
    pub fn drain_events(&mut self) -> Vec<EngagementEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Advance by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Vec<EngagementEvent> {
        run_engagement_tick(self, dt)
    }

    /// Advance by the configured fixed step
    pub fn step(&mut self) -> Vec<EngagementEvent> {
        let dt = self.config.tick_seconds;
        self.tick(dt)
    }

    fn index_of(&self, id: AgentId) -> Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(EngagementError::AgentNotFound(id))
    }

    /// Shared teardown for death and disable
    fn retire(&mut self, idx: usize, tick: Tick) {
        let agent = &mut self.agents[idx];
        let id = agent.id;
        let from = agent.state;

        agent.state = EngagementState::Inactive;
        agent.move_speed = 0.0;
        agent.hitbox_mode = HitboxMode::Disabled;
        agent.stun.clear();
        let window_closed = agent.attack.end_hit_window();

        self.registry.remove(id);

        if window_closed {
            self.pending_events
                .push(EngagementEvent::HitWindowEnded { agent: id, tick });
        }
        if from != EngagementState::Inactive {
            self.pending_events.push(EngagementEvent::StateChanged {
                agent: id,
                from,
                to: EngagementState::Inactive,
                tick,
            });
        }
    }
}
