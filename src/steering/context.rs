//! What a behavior may read while steering
//!
//! Behaviors never borrow other agents directly. They resolve target and
//! peer handles against a [`Snapshot`] taken at the start of the tick, so
//! every agent steers against the same frozen world state and a despawned
//! target simply resolves to nothing.

use glam::Vec2;
use rustc_hash::FxHashMap;

use super::kinematic::Body;
use crate::ecs::{AgentId, Transform};
use crate::physics::ObstacleQuery;

/// Kinematic state of an agent as seen by others
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub rotation_velocity: f32,
}

impl AgentState {
    /// Build from an agent's transform and body
    #[must_use]
    pub fn new(transform: &Transform, body: &Body) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            velocity: body.velocity,
            rotation_velocity: body.rotation_velocity,
        }
    }
}

/// Frozen kinematic state of every agent, keyed by handle
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    states: FxHashMap<AgentId, AgentState>,
}

impl Snapshot {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty snapshot sized for `capacity` agents
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Record an agent's state
    pub fn insert(&mut self, id: AgentId, state: AgentState) {
        self.states.insert(id, state);
    }

    /// Resolve a handle; `None` for removed agents
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<AgentState> {
        self.states.get(&id).copied()
    }

    /// Number of recorded agents
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if nothing is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Everything outside the agent itself that a behavior may consult
#[derive(Clone, Copy)]
pub struct SteeringContext<'a> {
    /// Handle of the agent being steered, used to skip itself in peer lists
    pub self_id: Option<AgentId>,
    /// Other agents
    pub agents: &'a Snapshot,
    /// Collision queries for obstacle avoidance
    pub obstacles: Option<&'a dyn ObstacleQuery>,
}

impl<'a> SteeringContext<'a> {
    /// Context with only agent lookups
    #[must_use]
    pub fn new(agents: &'a Snapshot) -> Self {
        Self {
            self_id: None,
            agents,
            obstacles: None,
        }
    }

    /// Attach a collision query
    #[must_use]
    pub fn with_obstacles(mut self, obstacles: &'a dyn ObstacleQuery) -> Self {
        self.obstacles = Some(obstacles);
        self
    }

    /// Set the agent being steered
    #[must_use]
    pub fn for_agent(mut self, id: AgentId) -> Self {
        self.self_id = Some(id);
        self
    }

    /// Resolve a target handle
    #[must_use]
    pub fn target(&self, id: Option<AgentId>) -> Option<AgentState> {
        id.and_then(|id| self.agents.get(id))
    }
}

/// The agent being steered, seen read-only
#[derive(Debug, Clone, Copy)]
pub struct Steered<'a> {
    pub transform: &'a Transform,
    pub body: &'a Body,
}

impl Steered<'_> {
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }
}
