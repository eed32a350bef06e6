//! Core simulation module
//!
//! Contains configuration, scene loading, motion events and the
//! [`Simulation`] driver.

mod config;
mod events;
mod scene;
mod simulation;

pub use config::{ConfigError, SimulationConfig, SteeringTuning};
pub use events::{EventQueue, MotionEvent};
pub use scene::{AgentConfig, BehaviorConfig, ObstacleRect, SceneConfig, SpawnPoint, TerrainSpeed};
pub use simulation::Simulation;
