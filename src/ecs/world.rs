//! Agent registry wrapper around hecs

use hecs::Entity;

use super::components::Name;
use crate::steering::{Agent, Snapshot};

/// Handle to an agent in the registry.
///
/// Handles are generational: a handle to a despawned agent never resolves
/// to a newer one, lookups simply return `None`.
pub type AgentId = Entity;

/// Registry of every agent taking part in the simulation
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Register an agent under a name
    pub fn spawn_agent(&mut self, name: impl Into<String>, agent: Agent) -> AgentId {
        self.inner.spawn((Name::new(name), agent))
    }

    /// Remove an agent. Returns false when the handle was already stale.
    pub fn despawn(&mut self, id: AgentId) -> bool {
        self.inner.despawn(id).is_ok()
    }

    /// Borrow an agent
    pub fn agent(&self, id: AgentId) -> Option<hecs::Ref<'_, Agent>> {
        self.inner.get::<&Agent>(id).ok()
    }

    /// Borrow an agent mutably
    pub fn agent_mut(&mut self, id: AgentId) -> Option<hecs::RefMut<'_, Agent>> {
        self.inner.get::<&mut Agent>(id).ok()
    }

    /// Name an agent was spawned with
    pub fn name(&self, id: AgentId) -> Option<String> {
        self.inner
            .get::<&Name>(id)
            .ok()
            .map(|name| name.as_str().to_owned())
    }

    /// Look up an agent by name
    pub fn find(&self, name: &str) -> Option<AgentId> {
        self.inner
            .query::<&Name>()
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| id)
    }

    /// Check if an agent exists
    pub fn contains(&self, id: AgentId) -> bool {
        self.inner.contains(id)
    }

    /// Get the number of agents
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Capture the kinematic state of every agent
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::with_capacity(self.inner.len() as usize);
        for (id, agent) in self.inner.query::<&Agent>().iter() {
            snapshot.insert(id, agent.state());
        }
        snapshot
    }

    /// Iterate over every agent mutably
    pub fn agents_mut(&mut self) -> hecs::QueryMut<'_, &mut Agent> {
        self.inner.query_mut::<&mut Agent>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
