//! Delegating steering behaviors
//!
//! These compute a point or an orientation and hand it to one of the basic
//! behaviors.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::basic::{SMALL_THRESHOLD, align, flee, seek};
use super::context::{AgentState, Steered};
use super::output::SteeringOutput;
use crate::pathfinding::Path;
use crate::physics::ObstacleQuery;

/// Turn to face a point
pub fn face(me: &Steered<'_>, point: Vec2, time_to_target: f32) -> SteeringOutput {
    let direction = point - me.position();

    // Nothing to face
    if direction.length() < SMALL_THRESHOLD {
        return SteeringOutput::ZERO;
    }

    align(me, direction.y.atan2(direction.x), time_to_target)
}

/// Turn to face the direction of travel
pub fn look_where_you_going(me: &Steered<'_>, time_to_target: f32) -> SteeringOutput {
    let velocity = me.velocity();
    if velocity.length() < SMALL_THRESHOLD {
        return SteeringOutput::ZERO;
    }

    align(me, velocity.y.atan2(velocity.x), time_to_target)
}

/// Where a moving target will be, looking at most `horizon` seconds ahead
#[must_use]
pub fn predict_position(position: Vec2, target: &AgentState, horizon: f32) -> Vec2 {
    let distance = (target.position - position).length();
    let speed = target.velocity.length();

    // Too slow for a reasonable prediction time
    let prediction = if speed <= f32::EPSILON || distance >= speed * horizon {
        horizon
    } else {
        distance / speed
    };

    target.position + target.velocity * prediction
}

/// Seek the predicted position of a target
pub fn pursue(me: &Steered<'_>, target: &AgentState, horizon: f32) -> SteeringOutput {
    seek(me, predict_position(me.position(), target, horizon))
}

/// Flee the predicted position of a target
pub fn evade(me: &Steered<'_>, target: &AgentState, horizon: f32) -> SteeringOutput {
    flee(me, predict_position(me.position(), target, horizon))
}

/// Cast a ray along the velocity and seek away from whatever it hits
pub fn obstacle_avoidance(
    me: &Steered<'_>,
    obstacles: &dyn ObstacleQuery,
    look_ahead: f32,
    avoid_distance: f32,
) -> SteeringOutput {
    let velocity = me.velocity();
    if velocity.length() < SMALL_THRESHOLD {
        return SteeringOutput::ZERO;
    }

    match obstacles.ray_cast(me.position(), velocity.normalize(), look_ahead) {
        Some(hit) => seek(me, hit.point + hit.normal * avoid_distance),
        None => SteeringOutput::ZERO,
    }
}

/// Wander tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WanderParams {
    /// Radius of the wander circle
    pub radius: f32,
    /// Distance of the circle ahead of the agent
    pub offset: f32,
    /// Maximum change of the wander orientation per call
    pub rate: f32,
}

/// Wander state: a target orientation drifting by a bounded random amount
#[derive(Debug, Clone)]
pub struct Wander {
    pub params: WanderParams,
    /// Orientation of the target on the circle, relative to the agent
    pub orientation: f32,
    rng: StdRng,
}

impl Wander {
    /// Create a wander state with a deterministic random stream
    #[must_use]
    pub fn new(params: WanderParams, orientation: f32, seed: u64) -> Self {
        Self {
            params,
            orientation,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Perturb the orientation and steer.
    ///
    /// The angular part comes from facing the circle target; the linear part
    /// is full acceleration along the current heading, which gives forward
    /// drift with steering noise.
    pub fn steer(&mut self, me: &Steered<'_>, time_to_target: f32) -> SteeringOutput {
        // Zero-mean in [-1, 1]
        let delta = self.rng.random::<f32>() - self.rng.random::<f32>();
        self.orientation += delta * self.params.rate;

        let heading = me.transform.forward();
        let center = me.position() + heading * self.params.offset;
        let target_orientation = self.orientation + me.rotation();
        let target = center + Vec2::from_angle(target_orientation) * self.params.radius;

        let mut result = face(me, target, time_to_target);
        result.linear = heading * me.body.max_acceleration;
        result
    }
}

/// Path cursor state
#[derive(Debug, Clone, Default)]
pub struct PathFollower {
    path: Path,
    cursor: usize,
    /// Distance at which a waypoint counts as reached
    pub arrival_radius: f32,
}

impl PathFollower {
    /// Create a follower with no path
    #[must_use]
    pub fn new(arrival_radius: f32) -> Self {
        Self {
            path: Path::default(),
            cursor: 1,
            arrival_radius,
        }
    }

    /// Replace the path; the first waypoint is the start and is skipped
    pub fn set_path(&mut self, path: Path) {
        self.path = path;
        self.cursor = 1;
    }

    /// Drop the current path
    pub fn clear(&mut self) {
        self.set_path(Path::default());
    }

    /// The path being followed
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index of the waypoint currently sought
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when there is nothing left to follow
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.path.len()
    }

    /// Seek the current waypoint, advancing once it is within reach
    pub fn steer(&mut self, me: &Steered<'_>) -> SteeringOutput {
        let Some(waypoint) = self.path.get(self.cursor) else {
            return SteeringOutput::ZERO;
        };

        if (waypoint - me.position()).length() < self.arrival_radius {
            self.cursor += 1;
        }

        match self.path.get(self.cursor) {
            Some(waypoint) => seek(me, waypoint),
            None => SteeringOutput::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Transform;
    use crate::physics::RayHit;
    use crate::steering::Body;
    use std::f32::consts::FRAC_PI_2;

    fn steered<'a>(transform: &'a Transform, body: &'a Body) -> Steered<'a> {
        Steered { transform, body }
    }

    fn target_at(position: Vec2, velocity: Vec2) -> AgentState {
        AgentState {
            position,
            rotation: 0.0,
            velocity,
            rotation_velocity: 0.0,
        }
    }

    #[test]
    fn test_face_turns_towards_point() {
        let transform = Transform::default();
        let body = Body::default();
        let output = face(&steered(&transform, &body), Vec2::new(0.0, 10.0), 0.25);

        assert!(output.angular > 0.0);
        assert_eq!(output.linear, Vec2::ZERO);
    }

    #[test]
    fn test_face_coincident_point_is_noop() {
        let transform = Transform::from_position(Vec2::new(2.0, 2.0));
        let body = Body::default();
        let output = face(&steered(&transform, &body), Vec2::new(2.0, 2.0), 0.25);

        assert_eq!(output, SteeringOutput::ZERO);
    }

    #[test]
    fn test_look_where_you_going() {
        let transform = Transform::default();
        let still = Body::default();
        assert_eq!(
            look_where_you_going(&steered(&transform, &still), 0.25),
            SteeringOutput::ZERO
        );

        let moving = Body {
            velocity: Vec2::new(0.0, -5.0),
            ..Default::default()
        };
        let output = look_where_you_going(&steered(&transform, &moving), 0.25);
        assert!(output.angular < 0.0);
    }

    #[test]
    fn test_prediction_uses_horizon_for_slow_targets() {
        let target = target_at(Vec2::new(100.0, 0.0), Vec2::ZERO);
        assert_eq!(predict_position(Vec2::ZERO, &target, 4.0), Vec2::new(100.0, 0.0));

        let crawling = target_at(Vec2::new(100.0, 0.0), Vec2::new(0.0, 1.0));
        let predicted = predict_position(Vec2::ZERO, &crawling, 4.0);
        assert!((predicted - Vec2::new(100.0, 4.0)).length() < 1e-4);
    }

    #[test]
    fn test_prediction_uses_distance_over_speed_for_fast_targets() {
        let target = target_at(Vec2::new(100.0, 0.0), Vec2::new(0.0, 200.0));
        let predicted = predict_position(Vec2::ZERO, &target, 4.0);

        // 100 / 200 = 0.5 s ahead
        assert!((predicted - Vec2::new(100.0, 100.0)).length() < 1e-3);
    }

    #[test]
    fn test_zero_horizon_predicts_current_position() {
        let coincident = target_at(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(predict_position(Vec2::ZERO, &coincident, 0.0), Vec2::ZERO);

        let moving = target_at(Vec2::new(30.0, 0.0), Vec2::new(0.0, 50.0));
        assert_eq!(predict_position(Vec2::ZERO, &moving, 0.0), Vec2::new(30.0, 0.0));

        let transform = Transform::default();
        let body = Body::default();
        let me = steered(&transform, &body);
        let towards = pursue(&me, &coincident, 0.0);
        let away = evade(&me, &coincident, 0.0);

        assert!(towards.linear.is_finite());
        assert!(away.linear.is_finite());
    }

    #[test]
    fn test_pursue_and_evade_are_opposite() {
        let transform = Transform::default();
        let body = Body::default();
        let me = steered(&transform, &body);
        let target = target_at(Vec2::new(50.0, 0.0), Vec2::new(0.0, 10.0));

        let towards = pursue(&me, &target, 4.0);
        let away = evade(&me, &target, 4.0);

        assert!(towards.linear.y > 0.0);
        assert!((towards.linear + away.linear).length() < 1e-3);
    }

    #[test]
    fn test_obstacle_avoidance_seeks_along_normal() {
        let transform = Transform::default();
        let body = Body {
            velocity: Vec2::new(10.0, 0.0),
            ..Default::default()
        };
        let wall = |origin: Vec2, direction: Vec2, max: f32| {
            let point = origin + direction * 50.0;
            (max >= 50.0).then_some(RayHit {
                point,
                normal: Vec2::new(-1.0, 0.0),
                distance: 50.0,
            })
        };

        let output = obstacle_avoidance(&steered(&transform, &body), &wall, 350.0, 300.0);
        // Avoid target is (50 - 300, 0): behind the agent
        assert!(output.linear.x < 0.0);

        let short_sighted = obstacle_avoidance(&steered(&transform, &body), &wall, 10.0, 300.0);
        assert_eq!(short_sighted, SteeringOutput::ZERO);
    }

    #[test]
    fn test_obstacle_avoidance_needs_velocity() {
        let transform = Transform::default();
        let body = Body::default();
        let always_hit = |_: Vec2, _: Vec2, _: f32| {
            Some(RayHit {
                point: Vec2::ONE,
                normal: Vec2::X,
                distance: 1.0,
            })
        };

        let output = obstacle_avoidance(&steered(&transform, &body), &always_hit, 350.0, 300.0);
        assert_eq!(output, SteeringOutput::ZERO);
    }

    #[test]
    fn test_wander_drives_forward() {
        let transform = Transform::from_position_rotation(Vec2::ZERO, FRAC_PI_2);
        let body = Body::default();
        let params = WanderParams {
            radius: 2.0,
            offset: 2.0,
            rate: 1.0,
        };
        let mut wander = Wander::new(params, 2.0, 7);

        for _ in 0..20 {
            let output = wander.steer(&steered(&transform, &body), 0.25);
            // Linear part always along the heading, at full acceleration
            assert!(output.linear.x.abs() < 1e-3);
            assert!((output.linear.y - body.max_acceleration).abs() < 1e-3);
            assert!(output.angular.abs() <= body.max_angular_acceleration + 1e-6);
        }
    }

    #[test]
    fn test_wander_is_seeded() {
        let transform = Transform::default();
        let body = Body::default();
        let params = WanderParams {
            radius: 2.0,
            offset: 2.0,
            rate: 1.0,
        };
        let mut a = Wander::new(params, 0.0, 42);
        let mut b = Wander::new(params, 0.0, 42);

        for _ in 0..10 {
            a.steer(&steered(&transform, &body), 0.25);
            b.steer(&steered(&transform, &body), 0.25);
        }
        assert_eq!(a.orientation, b.orientation);
        assert!(a.orientation.abs() <= 10.0);
    }

    #[test]
    fn test_path_follower_advances_without_going_back() {
        let path = Path::from(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(200.0, 0.0),
        ]);
        let mut follower = PathFollower::new(8.0);
        follower.set_path(path);
        let body = Body::default();

        // At the start: seek waypoint 1
        let at_start = Transform::from_position(Vec2::ZERO);
        let output = follower.steer(&steered(&at_start, &body));
        assert_eq!(follower.cursor(), 1);
        assert!(output.linear.x > 0.0);

        // Within reach of waypoint 1: advance to 2
        let near_first = Transform::from_position(Vec2::new(95.0, 0.0));
        let output = follower.steer(&steered(&near_first, &body));
        assert_eq!(follower.cursor(), 2);
        assert!(output.linear.x > 0.0);

        // Wandering back near the start never rewinds the cursor
        follower.steer(&steered(&at_start, &body));
        assert_eq!(follower.cursor(), 2);

        // Reaching the last waypoint finishes the path
        let at_end = Transform::from_position(Vec2::new(199.0, 0.0));
        let output = follower.steer(&steered(&at_end, &body));
        assert_eq!(output, SteeringOutput::ZERO);
        assert!(follower.is_finished());
    }

    #[test]
    fn test_path_follower_empty_path() {
        let mut follower = PathFollower::new(8.0);
        let transform = Transform::default();
        let body = Body::default();

        assert!(follower.is_finished());
        assert_eq!(follower.steer(&steered(&transform, &body)), SteeringOutput::ZERO);
    }
}
