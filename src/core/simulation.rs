//! Fixed-step simulation driver
//!
//! Owns the agent registry, the navigation grid and the collision world.
//! Each tick snapshots every agent, steers and integrates them against that
//! snapshot, then moves their collision proxies.

use glam::Vec2;

use super::config::{ConfigError, SimulationConfig};
use super::events::{EventQueue, MotionEvent};
use super::scene::SceneConfig;
use crate::ecs::{AgentId, World};
use crate::pathfinding::{Grid, Path, Pathfinder};
use crate::physics::CollisionWorld;
use crate::steering::{Agent, Body, SteeringContext, SteeringKind};

/// Progress markers compared before and after an agent update
struct Progress {
    path: Option<(usize, usize)>,
    move_target: Option<Vec2>,
}

impl Progress {
    fn of(agent: &Agent) -> Self {
        Self {
            path: agent.path_progress(),
            move_target: agent.move_target(),
        }
    }
}

/// A running simulation
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    grid: Option<Grid>,
    collision: CollisionWorld,
    events: EventQueue,
    ticks: u64,
    spawned: u64,
}

impl Simulation {
    /// Create an empty simulation with no grid
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let events = EventQueue::with_capacity(config.event_capacity);
        Self {
            config,
            world: World::new(),
            grid: None,
            collision: CollisionWorld::new(),
            events,
            ticks: 0,
            spawned: 0,
        }
    }

    /// Build a simulation from a scene: grid, obstacles, then agents.
    ///
    /// Targets and groups are wired once every agent exists, and initial
    /// move orders are issued last.
    pub fn from_scene(scene: &SceneConfig, mut config: SimulationConfig) -> Result<Self, ConfigError> {
        scene.validate()?;
        if let Some(tuning) = scene.tuning {
            config.tuning = tuning;
        }
        config.validate()?;

        let mut sim = Self::new(config);
        sim.grid = scene.build_grid()?;

        for obstacle in &scene.obstacles {
            sim.collision.add_obstacle_rect(obstacle.min, obstacle.size);
        }
        sim.collision.refresh_queries();

        let mut ids = Vec::with_capacity(scene.agents.len());
        for agent_config in &scene.agents {
            let mut agent = sim
                .new_agent(scene.start_position(agent_config))
                .with_body(Body::from(agent_config.body));
            agent.transform.rotation = agent_config.rotation;
            for speed in &agent_config.terrain_speed {
                agent = agent.with_terrain_speed(speed.terrain, speed.max_velocity);
            }
            for behavior in &agent_config.behaviors {
                agent.add_steering(behavior.kind);
                if let Some(weight) = behavior.weight {
                    agent.set_steering_weight(behavior.kind, weight);
                }
            }
            ids.push(sim.spawn_agent(agent_config.name.as_str(), agent));
        }

        for (agent_config, &id) in scene.agents.iter().zip(&ids) {
            for behavior in &agent_config.behaviors {
                let target = behavior.target.as_deref().and_then(|name| sim.world.find(name));
                let peers: Vec<AgentId> = behavior
                    .group
                    .iter()
                    .filter_map(|name| sim.world.find(name))
                    .collect();

                let Some(mut agent) = sim.world.agent_mut(id) else {
                    continue;
                };
                if let Some(target) = target {
                    agent.set_steering_target(behavior.kind, target);
                }
                if behavior.kind.is_group() {
                    agent.set_steering_peers(behavior.kind, &peers);
                }
                if let Some(point) = behavior.point {
                    match behavior.kind {
                        SteeringKind::Face => agent.face_point(point),
                        SteeringKind::MoveToPosition => agent.move_to(point),
                        _ => {}
                    }
                }
            }
        }

        for (agent_config, &id) in scene.agents.iter().zip(&ids) {
            if let Some(destination) = agent_config.destination {
                sim.order_move(id, destination);
            }
        }

        log::info!(
            "Loaded scene '{}': {} agents, {} obstacles, grid {}",
            scene.name,
            sim.world.len(),
            sim.collision.obstacle_count(),
            if sim.grid.is_some() { "present" } else { "absent" }
        );

        Ok(sim)
    }

    /// A fresh agent at a position using this simulation's tunables and
    /// the next wander seed
    #[must_use]
    pub fn new_agent(&mut self, position: Vec2) -> Agent {
        let seed = self
            .config
            .seed
            .wrapping_add(self.spawned.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.spawned += 1;

        Agent::at(position)
            .with_tuning(self.config.tuning)
            .with_seed(seed)
    }

    /// Register an agent and its collision proxy
    pub fn spawn_agent(&mut self, name: &str, agent: Agent) -> AgentId {
        let position = agent.transform.position;
        let id = self.world.spawn_agent(name, agent);
        self.collision
            .add_agent(id, position, self.config.agent_radius);
        self.collision.refresh_queries();

        log::debug!("Spawned agent '{name}' ({id:?}) at {position}");
        self.events.push(MotionEvent::AgentSpawned { agent: id, position });
        id
    }

    /// Remove an agent. Behaviors targeting it stop producing output.
    pub fn despawn(&mut self, id: AgentId) -> bool {
        if !self.world.despawn(id) {
            return false;
        }
        self.collision.remove_agent(id);

        log::debug!("Despawned agent {id:?}");
        self.events.push(MotionEvent::AgentDespawned { agent: id });
        true
    }

    /// Replace the navigation grid
    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = Some(grid);
    }

    /// Add a static obstacle from its minimum corner and size
    pub fn add_obstacle(&mut self, min: Vec2, size: Vec2) {
        self.collision.add_obstacle_rect(min, size);
        self.collision.refresh_queries();
    }

    /// Find a path on the grid; empty without a grid
    #[must_use]
    pub fn find_path(&self, start: Vec2, end: Vec2) -> Path {
        self.grid
            .as_ref()
            .map(|grid| Pathfinder::new(grid).find_path(start, end))
            .unwrap_or_default()
    }

    /// Path an agent to a destination, enabling path following if needed.
    ///
    /// Returns false when the agent is gone or no route exists; in that case
    /// any path in progress is cleared. An order into the agent's own walkable
    /// cell completes at once.
    pub fn order_move(&mut self, id: AgentId, destination: Vec2) -> bool {
        let Some(start) = self.world.agent(id).map(|agent| agent.transform.position) else {
            return false;
        };
        let already_there = self.grid.as_ref().is_some_and(|grid| {
            match (grid.world_to_grid(start), grid.world_to_grid(destination)) {
                (Some(from), Some(to)) => from == to && grid.is_walkable(to.0, to.1),
                _ => false,
            }
        });
        let path = if already_there {
            Path::default()
        } else {
            self.find_path(start, destination)
        };

        let Some(mut agent) = self.world.agent_mut(id) else {
            return false;
        };
        agent.add_steering(SteeringKind::PathFollowing);

        if already_there {
            agent.clear_path();
            log::debug!("Move order for {id:?} to {destination}: already in that cell");
            self.events.push(MotionEvent::PathCompleted { agent: id });
            return true;
        }

        if path.is_empty() {
            agent.clear_path();
            log::debug!("No route for {id:?} from {start} to {destination}");
            self.events.push(MotionEvent::PathNotFound {
                agent: id,
                destination,
            });
            return false;
        }

        let waypoints = path.len();
        agent.move_along(path);
        log::info!("Move order for {id:?} to {destination}: {waypoints} waypoints");
        self.events.push(MotionEvent::PathAssigned {
            agent: id,
            destination,
            waypoints,
        });
        true
    }

    /// Install a peer list into each member's group behaviors
    pub fn form_group(&mut self, members: &[AgentId]) {
        for &id in members {
            if let Some(mut agent) = self.world.agent_mut(id) {
                agent.set_group_targets(members);
            }
        }
    }

    /// Advance one fixed timestep
    pub fn tick(&mut self) {
        self.step(self.config.timestep);
    }

    /// Advance by `dt` seconds.
    ///
    /// Events produced by the step become readable once it returns.
    pub fn step(&mut self, dt: f32) {
        let snapshot = self.world.snapshot();

        for (id, agent) in self.world.agents_mut() {
            if let Some(terrain) = self
                .grid
                .as_ref()
                .and_then(|grid| grid.terrain_at(agent.transform.position))
            {
                agent.change_terrain(terrain);
            }

            let before = Progress::of(agent);
            let ctx = SteeringContext::new(&snapshot)
                .for_agent(id)
                .with_obstacles(&self.collision);
            agent.update(dt, &ctx);
            let after = Progress::of(agent);

            Self::emit_progress(&mut self.events, id, &before, &after);
        }

        for (id, agent) in self.world.inner.query::<&Agent>().iter() {
            self.collision
                .set_agent_position(id, agent.transform.position);
        }
        self.collision.step(dt);

        self.events.swap();
        self.ticks += 1;
    }

    fn emit_progress(events: &mut EventQueue, agent: AgentId, before: &Progress, after: &Progress) {
        if let (Some((from, len)), Some((to, after_len))) = (before.path, after.path) {
            if len == after_len && to > from {
                for index in from..to.min(len) {
                    events.push(MotionEvent::WaypointReached { agent, index });
                }
                if from < len && to >= len {
                    log::debug!("{agent:?} completed its path");
                    events.push(MotionEvent::PathCompleted { agent });
                }
            }
        }

        if let (Some(position), None) = (before.move_target, after.move_target) {
            events.push(MotionEvent::ArrivedAtPosition { agent, position });
        }
    }

    /// Agent whose collision proxy contains a point
    #[must_use]
    pub fn agent_at(&self, point: Vec2) -> Option<AgentId> {
        self.collision.point_query(point)
    }

    /// Agents whose collision proxies overlap a box
    #[must_use]
    pub fn agents_in(&self, min: Vec2, max: Vec2) -> Vec<AgentId> {
        self.collision.query_area(min, max)
    }

    /// Get the agent registry
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get the agent registry mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get the navigation grid
    #[must_use]
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Get the collision world
    #[must_use]
    pub fn collision(&self) -> &CollisionWorld {
        &self.collision
    }

    /// Events from the last step
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Events from the last step, mutably (for draining)
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Number of steps taken
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}
