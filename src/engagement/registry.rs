//! Agent registry and per-tick peer snapshots
//!
//! The registry is owned by the world, not a process-wide static, so
//! independent simulations (and tests) never see each other's agents.

use ahash::AHashSet;
use glam::Vec3;

use crate::core::types::AgentId;
use crate::engagement::agent::{Agent, EngagementState};

/// Set of agents currently taking part in the engagement
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    members: AHashSet<AgentId>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the agent was already registered
    pub fn insert(&mut self, id: AgentId) -> bool {
        self.members.insert(id)
    }

    /// Returns false if the agent was not registered
    pub fn remove(&mut self, id: AgentId) -> bool {
        self.members.remove(&id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Freeze the committed position and state of every registered agent
    ///
    /// `agents` supplies the iteration order, so the snapshot is as
    /// deterministic as the caller's storage.
    pub fn snapshot<'a>(&self, agents: impl IntoIterator<Item = &'a Agent>) -> PeerSnapshot {
        let peers = agents
            .into_iter()
            .filter(|agent| self.contains(agent.id) && agent.is_simulating())
            .map(|agent| Peer {
                id: agent.id,
                position: agent.position,
                state: agent.state,
            })
            .collect();
        PeerSnapshot { peers }
    }
}

/// Another agent as seen from the compute phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peer {
    pub id: AgentId,
    pub position: Vec3,
    pub state: EngagementState,
}

/// Read-only view of all registered agents at the start of a tick
#[derive(Debug, Clone, Default)]
pub struct PeerSnapshot {
    peers: Vec<Peer>,
}

impl PeerSnapshot {
    pub fn new(peers: Vec<Peer>) -> Self {
        Self { peers }
    }

    pub fn get(&self, id: AgentId) -> Option<&Peer> {
        self.peers.iter().find(|peer| peer.id == id)
    }

    /// Active peers other than `me`
    pub fn active_others(&self, me: AgentId) -> impl Iterator<Item = &Peer> + '_ {
        self.peers
            .iter()
            .filter(move |peer| peer.id != me && peer.state.is_active())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
