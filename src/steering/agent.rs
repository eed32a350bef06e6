//! Agent: transform, body and a set of blended steering behaviors

use glam::Vec2;
use rustc_hash::FxHashMap;

use super::behavior::{Behavior, SteeringBehavior, SteeringKind};
use super::context::{AgentState, Steered, SteeringContext};
use super::kinematic::{Body, integrate};
use super::output::SteeringOutput;
use crate::core::SteeringTuning;
use crate::ecs::{AgentId, Transform};
use crate::pathfinding::{Path, TerrainType};

/// A mobile agent driven by weighted steering behaviors
#[derive(Debug, Clone, Default)]
pub struct Agent {
    pub transform: Transform,
    pub body: Body,
    /// Max velocity per terrain type
    pub terrain_speed: FxHashMap<TerrainType, f32>,
    /// Tunables copied into behaviors when they are enabled
    pub tuning: SteeringTuning,
    behaviors: FxHashMap<SteeringKind, SteeringBehavior>,
    seed: u64,
}

impl Agent {
    /// Create an agent at a position with default limits
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Default::default()
        }
    }

    /// Use a specific body
    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Use specific behavior tunables
    #[must_use]
    pub fn with_tuning(mut self, tuning: SteeringTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Seed for random behaviors (wander)
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the max velocity used on a terrain type
    #[must_use]
    pub fn with_terrain_speed(mut self, terrain: TerrainType, max_velocity: f32) -> Self {
        self.terrain_speed.insert(terrain, max_velocity);
        self
    }

    /// Kinematic state as seen by other agents
    #[must_use]
    pub fn state(&self) -> AgentState {
        AgentState::new(&self.transform, &self.body)
    }

    /// Enable a behavior kind. Already-active kinds are left untouched.
    pub fn add_steering(&mut self, kind: SteeringKind) {
        let seed = self.seed.wrapping_add(kind as u64);
        let tuning = &self.tuning;
        self.behaviors
            .entry(kind)
            .or_insert_with(|| SteeringBehavior::new(kind, tuning, seed));
    }

    /// Disable a behavior kind
    pub fn remove_steering(&mut self, kind: SteeringKind) {
        self.behaviors.remove(&kind);
    }

    /// Point a behavior at a target agent
    pub fn set_steering_target(&mut self, kind: SteeringKind, target: AgentId) {
        if let Some(behavior) = self.behaviors.get_mut(&kind) {
            behavior.target = Some(target);
        }
    }

    /// Set a behavior's linear weight
    pub fn set_steering_weight(&mut self, kind: SteeringKind, weight: i32) {
        if let Some(behavior) = self.behaviors.get_mut(&kind) {
            behavior.weight = weight;
        }
    }

    /// Install the peer list into every active group behavior
    pub fn set_group_targets(&mut self, peers: &[AgentId]) {
        for behavior in self.behaviors.values_mut() {
            behavior.set_peers(peers);
        }
    }

    /// Install the peer list into one group behavior
    pub fn set_steering_peers(&mut self, kind: SteeringKind, peers: &[AgentId]) {
        if let Some(behavior) = self.behaviors.get_mut(&kind) {
            behavior.set_peers(peers);
        }
    }

    /// Point Face at a world position instead of an agent
    pub fn face_point(&mut self, point: Vec2) {
        if let Some(SteeringBehavior {
            behavior: Behavior::Face { point: slot, .. },
            ..
        }) = self.behaviors.get_mut(&SteeringKind::Face)
        {
            *slot = Some(point);
        }
    }

    /// Follow a path, replacing any path in progress
    pub fn move_along(&mut self, path: Path) {
        if let Some(SteeringBehavior {
            behavior: Behavior::PathFollowing(follower),
            ..
        }) = self.behaviors.get_mut(&SteeringKind::PathFollowing)
        {
            follower.set_path(path);
        }
    }

    /// Stop following the current path
    pub fn clear_path(&mut self) {
        self.move_along(Path::default());
    }

    /// Seek a world position until reached
    pub fn move_to(&mut self, point: Vec2) {
        if let Some(behavior) = self.behaviors.get_mut(&SteeringKind::MoveToPosition) {
            if let Behavior::MoveToPosition { goal, .. } = &mut behavior.behavior {
                *goal = point;
                behavior.weight = 1;
            }
        }
    }

    /// Switch max velocity to the speed for a terrain type
    pub fn change_terrain(&mut self, terrain: TerrainType) {
        if let Some(&speed) = self.terrain_speed.get(&terrain) {
            self.body.max_velocity = speed;
        }
    }

    /// Bearing of the velocity, or the current rotation when stationary
    #[must_use]
    pub fn heading_from_velocity(&self) -> f32 {
        let velocity = self.body.velocity;
        if velocity.length() > 0.0 {
            velocity.y.atan2(velocity.x)
        } else {
            self.transform.rotation
        }
    }

    /// Whether a behavior kind is active
    #[must_use]
    pub fn has_steering(&self, kind: SteeringKind) -> bool {
        self.behaviors.contains_key(&kind)
    }

    /// Borrow an active behavior
    #[must_use]
    pub fn steering(&self, kind: SteeringKind) -> Option<&SteeringBehavior> {
        self.behaviors.get(&kind)
    }

    /// Active kinds, sorted
    #[must_use]
    pub fn active_kinds(&self) -> Vec<SteeringKind> {
        let mut kinds: Vec<_> = self.behaviors.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Path cursor and length, if path following is active
    #[must_use]
    pub fn path_progress(&self) -> Option<(usize, usize)> {
        match self.behaviors.get(&SteeringKind::PathFollowing) {
            Some(SteeringBehavior {
                behavior: Behavior::PathFollowing(follower),
                ..
            }) => Some((follower.cursor(), follower.path().len())),
            _ => None,
        }
    }

    /// Goal of an armed MoveToPosition
    #[must_use]
    pub fn move_target(&self) -> Option<Vec2> {
        match self.behaviors.get(&SteeringKind::MoveToPosition) {
            Some(SteeringBehavior {
                weight,
                behavior: Behavior::MoveToPosition { goal, .. },
                ..
            }) if *weight != 0 => Some(*goal),
            _ => None,
        }
    }

    /// Sum every active behavior's output.
    ///
    /// Weights scale the linear part only; angular parts add up unweighted.
    pub fn blended_steering(&mut self, ctx: &SteeringContext<'_>) -> SteeringOutput {
        let me = Steered {
            transform: &self.transform,
            body: &self.body,
        };

        let mut result = SteeringOutput::ZERO;
        for behavior in self.behaviors.values_mut() {
            let output = behavior.steer(&me, ctx);
            result.accumulate(output, behavior.weight);
        }
        result
    }

    /// Blend behaviors and integrate one step
    pub fn update(&mut self, dt: f32, ctx: &SteeringContext<'_>) {
        if !self.body.can_move {
            self.body.halt();
            return;
        }

        let steering = self.blended_steering(ctx);
        integrate(&mut self.transform, &mut self.body, steering, dt);
    }
}
