//! Autonomous motion for real-time 2D agents
//!
//! This crate provides:
//! - Weighted steering behaviors blended per agent and integrated each tick
//! - Walkability grids built from tile layers
//! - A* pathfinding feeding a path-following behavior
//! - Obstacle ray casts and unit-selection queries with rapier2d
//! - An agent registry built on hecs

pub mod core;
pub mod ecs;
pub mod pathfinding;
pub mod physics;
pub mod steering;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier2d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{
        ConfigError, EventQueue, MotionEvent, SceneConfig, Simulation, SimulationConfig,
        SteeringTuning,
    };
    pub use crate::ecs::{AgentId, Name, Transform, World};
    pub use crate::pathfinding::{
        Grid, Path, Pathfinder, TerrainType, TileLayers, TileRule, WalkabilityRules,
    };
    pub use crate::physics::{CollisionWorld, ObstacleQuery, RayHit};
    pub use crate::steering::{Agent, Body, BodyConfig, SteeringKind, SteeringOutput};
    pub use glam::Vec2;
}
