//! Collision world using rapier2d
//!
//! Obstacles are fixed cuboids. Agents are kinematic sensor balls tagged with
//! their [`AgentId`] so queries can tell them apart from terrain. Queries go
//! through the query pipeline, which is refreshed by [`CollisionWorld::step`]
//! and [`CollisionWorld::refresh_queries`].

use glam::Vec2;
use rapier2d::parry::bounding_volume::{Aabb, BoundingVolume};
use rapier2d::prelude::*;
use rustc_hash::FxHashMap;

use super::query::{ObstacleQuery, RayHit};
use crate::ecs::AgentId;

/// Handle to a static obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObstacleHandle(pub rapier2d::geometry::ColliderHandle);

fn agent_tag(id: AgentId) -> u128 {
    u128::from(id.to_bits().get())
}

fn tagged_agent(collider: &Collider) -> Option<AgentId> {
    if collider.user_data == 0 {
        return None;
    }
    u64::try_from(collider.user_data)
        .ok()
        .and_then(AgentId::from_bits)
}

/// Physics world holding obstacles and agent proxies
pub struct CollisionWorld {
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Query pipeline for ray casting
    query_pipeline: QueryPipeline,
    integration_parameters: IntegrationParameters,
    agents: FxHashMap<AgentId, RigidBodyHandle>,
    obstacles: Vec<ObstacleHandle>,
}

impl CollisionWorld {
    /// Create an empty world with no gravity
    #[must_use]
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            agents: FxHashMap::default(),
            obstacles: Vec::new(),
        }
    }

    /// Step the simulation, moving agent proxies to their queued positions
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &vector![0.0, 0.0],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Rebuild the query acceleration structure without stepping
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add an axis-aligned box obstacle centred on `center`
    pub fn add_obstacle(&mut self, center: Vec2, half_extents: Vec2) -> ObstacleHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![center.x, center.y])
            .build();
        let body = self.rigid_body_set.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y).build();

        let handle = ObstacleHandle(self.collider_set.insert_with_parent(
            collider,
            body,
            &mut self.rigid_body_set,
        ));
        self.obstacles.push(handle);
        handle
    }

    /// Add an obstacle from its minimum corner and size
    pub fn add_obstacle_rect(&mut self, min: Vec2, size: Vec2) -> ObstacleHandle {
        let half = size * 0.5;
        self.add_obstacle(min + half, half)
    }

    /// Number of static obstacles
    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Register an agent proxy. Replaces any existing proxy for the agent.
    pub fn add_agent(&mut self, id: AgentId, position: Vec2, radius: f32) {
        self.remove_agent(id);

        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![position.x, position.y])
            .build();
        let body = self.rigid_body_set.insert(body);
        let collider = ColliderBuilder::ball(radius)
            .sensor(true)
            .user_data(agent_tag(id))
            .build();
        self.collider_set
            .insert_with_parent(collider, body, &mut self.rigid_body_set);

        self.agents.insert(id, body);
    }

    /// Remove an agent proxy
    pub fn remove_agent(&mut self, id: AgentId) -> bool {
        let Some(body) = self.agents.remove(&id) else {
            return false;
        };
        self.rigid_body_set.remove(
            body,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        self.query_pipeline.update(&self.collider_set);
        true
    }

    /// Queue an agent proxy's position for the next step
    pub fn set_agent_position(&mut self, id: AgentId, position: Vec2) {
        if let Some(body) = self
            .agents
            .get(&id)
            .and_then(|handle| self.rigid_body_set.get_mut(*handle))
        {
            body.set_next_kinematic_translation(vector![position.x, position.y]);
        }
    }

    /// Current position of an agent proxy
    #[must_use]
    pub fn agent_position(&self, id: AgentId) -> Option<Vec2> {
        self.agents
            .get(&id)
            .and_then(|handle| self.rigid_body_set.get(*handle))
            .map(|body| {
                let pos = body.translation();
                Vec2::new(pos.x, pos.y)
            })
    }

    /// Number of agent proxies
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Agent whose proxy contains a point
    #[must_use]
    pub fn point_query(&self, point: Vec2) -> Option<AgentId> {
        let only_agents = |_: ColliderHandle, collider: &Collider| collider.user_data != 0;
        let filter = QueryFilter::default().predicate(&only_agents);

        let mut found = None;
        self.query_pipeline.intersections_with_point(
            &self.rigid_body_set,
            &self.collider_set,
            &point![point.x, point.y],
            filter,
            |handle| {
                found = self.collider_set.get(handle).and_then(tagged_agent);
                found.is_none()
            },
        );
        found
    }

    /// Agents whose proxies overlap an axis-aligned box
    #[must_use]
    pub fn query_area(&self, min: Vec2, max: Vec2) -> Vec<AgentId> {
        let (lo, hi) = (min.min(max), min.max(max));
        let area = Aabb::new(point![lo.x, lo.y], point![hi.x, hi.y]);

        let mut found = Vec::new();
        self.query_pipeline
            .colliders_with_aabb_intersecting_aabb(&area, |handle| {
                let id = self
                    .collider_set
                    .get(*handle)
                    .filter(|collider| collider.compute_aabb().intersects(&area))
                    .and_then(tagged_agent);
                found.extend(id);
                true
            });
        found.sort_by_key(|id| id.to_bits());
        found.dedup();
        found
    }

    /// Cast a ray against obstacles only
    #[must_use]
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let ray = Ray::new(point![origin.x, origin.y], vector![direction.x, direction.y]);
        let skip_agents = |_: ColliderHandle, collider: &Collider| collider.user_data == 0;
        let filter = QueryFilter::default().predicate(&skip_agents);

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(_, hit)| {
                let point = ray.point_at(hit.time_of_impact);
                RayHit {
                    point: Vec2::new(point.x, point.y),
                    normal: Vec2::new(hit.normal.x, hit.normal.y),
                    distance: hit.time_of_impact,
                }
            })
    }
}

impl ObstacleQuery for CollisionWorld {
    fn ray_cast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        self.raycast(origin, direction, max_distance)
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(count: usize) -> Vec<AgentId> {
        let mut world = hecs::World::new();
        (0..count).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn test_raycast_hits_obstacle() {
        let mut world = CollisionWorld::new();
        world.add_obstacle(Vec2::new(100.0, 0.0), Vec2::new(10.0, 50.0));
        world.refresh_queries();

        let hit = world.raycast(Vec2::ZERO, Vec2::X, 350.0).unwrap();
        assert!((hit.point.x - 90.0).abs() < 1e-3);
        assert!((hit.distance - 90.0).abs() < 1e-3);
        assert!((hit.normal - Vec2::NEG_X).length() < 1e-3);

        assert!(world.raycast(Vec2::ZERO, Vec2::X, 50.0).is_none());
        assert!(world.raycast(Vec2::ZERO, Vec2::NEG_X, 350.0).is_none());
    }

    #[test]
    fn test_raycast_ignores_agents() {
        let agent = ids(1)[0];
        let mut world = CollisionWorld::new();
        world.add_agent(agent, Vec2::new(40.0, 0.0), 10.0);
        world.refresh_queries();

        assert!(world.raycast(Vec2::ZERO, Vec2::X, 350.0).is_none());
        assert_eq!(world.point_query(Vec2::new(42.0, 3.0)), Some(agent));
    }

    #[test]
    fn test_point_query_skips_obstacles() {
        let mut world = CollisionWorld::new();
        world.add_obstacle_rect(Vec2::ZERO, Vec2::new(20.0, 20.0));
        world.refresh_queries();

        assert_eq!(world.obstacle_count(), 1);
        assert!(world.point_query(Vec2::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_query_area_and_moves() {
        let agents = ids(3);
        let mut world = CollisionWorld::new();
        world.add_agent(agents[0], Vec2::new(0.0, 0.0), 5.0);
        world.add_agent(agents[1], Vec2::new(50.0, 50.0), 5.0);
        world.add_agent(agents[2], Vec2::new(500.0, 500.0), 5.0);
        assert!(world.query_area(Vec2::new(-10.0, -10.0), Vec2::new(60.0, 60.0)).is_empty());
        world.refresh_queries();

        let found = world.query_area(Vec2::new(-10.0, -10.0), Vec2::new(60.0, 60.0));
        let mut expected = vec![agents[0], agents[1]];
        expected.sort_by_key(|id| id.to_bits());
        assert_eq!(found, expected);

        world.set_agent_position(agents[2], Vec2::new(20.0, 20.0));
        world.step(1.0 / 60.0);
        assert_eq!(world.agent_position(agents[2]), Some(Vec2::new(20.0, 20.0)));
        assert_eq!(world.query_area(Vec2::new(-10.0, -10.0), Vec2::new(60.0, 60.0)).len(), 3);

        assert!(world.remove_agent(agents[0]));
        assert!(!world.remove_agent(agents[0]));
        assert_eq!(world.agent_count(), 2);
        assert_eq!(world.query_area(Vec2::new(-10.0, -10.0), Vec2::new(60.0, 60.0)).len(), 2);
        assert!(world.point_query(Vec2::ZERO).is_none());
    }
}
