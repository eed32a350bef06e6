//! Steering behaviors for autonomous 2D agents
//!
//! Behaviors produce a [`SteeringOutput`]; an [`Agent`] blends the outputs
//! of its active behaviors and integrates the result into its [`Body`].

mod agent;
mod basic;
mod behavior;
mod context;
mod delegate;
mod group;
mod kinematic;
mod output;

pub use agent::Agent;
pub use basic::{align, anti_align, arrive, flee, seek, velocity_matching};
pub use behavior::{Behavior, SteeringBehavior, SteeringKind};
pub use context::{AgentState, Snapshot, Steered, SteeringContext};
pub use delegate::{
    PathFollower, Wander, WanderParams, evade, face, look_where_you_going, obstacle_avoidance,
    predict_position, pursue,
};
pub use group::{alignment, cohesion, separation};
pub use kinematic::{Body, BodyConfig, integrate, wrap_angle};
pub use output::SteeringOutput;
