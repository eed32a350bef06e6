//! Entity Component System module
//!
//! Built on top of the hecs ECS library. The world doubles as the agent
//! registry: behaviors refer to their targets through [`AgentId`] handles.

mod components;
mod world;

pub use components::{Name, Transform};
pub use world::{AgentId, World};
