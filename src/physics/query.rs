//! Collision queries consumed by steering

use glam::Vec2;

/// Result of a ray cast against static geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The point of intersection
    pub point: Vec2,
    /// Surface normal at the hit point
    pub normal: Vec2,
    /// Distance from ray origin
    pub distance: f32,
}

/// Ray casts against obstacles, ignoring agents
pub trait ObstacleQuery {
    /// First obstacle hit along a unit `direction` within `max_distance`
    fn ray_cast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit>;
}

impl<F> ObstacleQuery for F
where
    F: Fn(Vec2, Vec2, f32) -> Option<RayHit>,
{
    fn ray_cast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        self(origin, direction, max_distance)
    }
}
