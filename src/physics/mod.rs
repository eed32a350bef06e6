//! Collision queries
//!
//! Built on top of rapier2d

mod query;
mod world;

pub use query::{ObstacleQuery, RayHit};
pub use world::{CollisionWorld, ObstacleHandle};
