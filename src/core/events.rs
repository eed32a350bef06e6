//! Motion events
//!
//! A double-buffered event queue. The simulation swaps the buffers at the
//! end of every step, so events pushed before or during a step become
//! readable once it returns and stay readable until the next one.
//!
//! # Example
//!
//! ```ignore
//! sim.tick();
//! for event in sim.events().iter() {
//!     if let MotionEvent::PathCompleted { agent } = event {
//!         log::info!("{agent:?} arrived");
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;

use crate::ecs::AgentId;

/// Things that happened to agents during a tick
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MotionEvent {
    /// An agent joined the simulation.
    AgentSpawned { agent: AgentId, position: Vec2 },

    /// An agent left the simulation.
    AgentDespawned { agent: AgentId },

    /// A move order produced a path.
    PathAssigned {
        agent: AgentId,
        destination: Vec2,
        /// Number of waypoints, start cell included
        waypoints: usize,
    },

    /// A move order found no route.
    PathNotFound { agent: AgentId, destination: Vec2 },

    /// An agent passed a waypoint on its path.
    WaypointReached {
        agent: AgentId,
        /// Index of the waypoint just reached
        index: usize,
    },

    /// An agent reached the last waypoint of its path.
    PathCompleted { agent: AgentId },

    /// MoveToPosition reached its goal and switched itself off.
    ArrivedAtPosition { agent: AgentId, position: Vec2 },
}

impl MotionEvent {
    /// The agent this event concerns
    #[must_use]
    pub const fn agent(&self) -> AgentId {
        match self {
            Self::AgentSpawned { agent, .. }
            | Self::AgentDespawned { agent }
            | Self::PathAssigned { agent, .. }
            | Self::PathNotFound { agent, .. }
            | Self::WaypointReached { agent, .. }
            | Self::PathCompleted { agent }
            | Self::ArrivedAtPosition { agent, .. } => *agent,
        }
    }
}

/// Double-buffered queue of [`MotionEvent`]s
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<MotionEvent>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<MotionEvent>,
}

impl EventQueue {
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be read after the next `swap()`.
    #[inline]
    pub fn push(&mut self, event: MotionEvent) {
        self.pending.push_back(event);
    }

    /// Make pending events readable and start a fresh pending buffer.
    ///
    /// Events not read since the previous swap are dropped.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &MotionEvent> {
        self.processing.iter()
    }

    /// Take ownership of events from the previous tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = MotionEvent> + '_ {
        self.processing.drain(..)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events waiting for the next swap.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear both buffers.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
