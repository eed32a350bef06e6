//! Basic steering behaviors
//!
//! Each function reads the steered agent plus a resolved target quantity
//! (a point, an orientation, a velocity) and returns the acceleration to
//! apply. Missing targets are handled by the caller.

use std::f32::consts::PI;

use glam::Vec2;

use super::context::Steered;
use super::kinematic::wrap_angle;
use super::output::SteeringOutput;

/// Below this length a direction is treated as degenerate
pub(crate) const SMALL_THRESHOLD: f32 = 1e-4;

/// Clip a linear acceleration to `max` keeping its direction
#[inline]
fn clip_linear(acceleration: Vec2, max: f32) -> Vec2 {
    if acceleration.length() > max {
        acceleration.normalize_or_zero() * max
    } else {
        acceleration
    }
}

/// Clip an angular acceleration to `max` keeping its sign
#[inline]
fn clip_angular(acceleration: f32, max: f32) -> f32 {
    if acceleration.abs() > max {
        acceleration.signum() * max
    } else {
        acceleration
    }
}

/// Full acceleration towards a point
pub fn seek(me: &Steered<'_>, target: Vec2) -> SteeringOutput {
    let direction = target - me.position();
    if direction.length() < SMALL_THRESHOLD {
        return SteeringOutput::ZERO;
    }

    SteeringOutput::linear(direction.normalize() * me.body.max_acceleration)
}

/// Full acceleration away from a point
pub fn flee(me: &Steered<'_>, threat: Vec2) -> SteeringOutput {
    let direction = me.position() - threat;
    if direction.length() < SMALL_THRESHOLD {
        return SteeringOutput::ZERO;
    }

    SteeringOutput::linear(direction.normalize() * me.body.max_acceleration)
}

/// Move towards a point, slowing inside the exterior radius and stopping
/// inside the interior radius
pub fn arrive(me: &Steered<'_>, target: Vec2, time_to_target: f32) -> SteeringOutput {
    let body = me.body;
    let to_target = target - me.position();
    let distance = to_target.length();

    if distance < body.interior_radius || distance < SMALL_THRESHOLD {
        return SteeringOutput::ZERO;
    }

    let target_speed = if distance > body.exterior_radius {
        body.max_velocity
    } else {
        body.max_velocity * distance / body.exterior_radius
    };

    let target_velocity = to_target / distance * target_speed;
    let acceleration = (target_velocity - body.velocity) / time_to_target;

    SteeringOutput::linear(clip_linear(acceleration, body.max_acceleration))
}

/// Rotate to match an orientation, slowing inside the exterior angle and
/// stopping inside the interior angle
pub fn align(me: &Steered<'_>, orientation: f32, time_to_target: f32) -> SteeringOutput {
    let body = me.body;
    let rotation = wrap_angle(orientation - me.rotation());
    let rotation_size = rotation.abs();

    if rotation_size < body.interior_angle || rotation_size < SMALL_THRESHOLD {
        return SteeringOutput::ZERO;
    }

    let mut target_rotation = if rotation_size > body.exterior_angle {
        body.max_rotation_velocity
    } else {
        body.max_rotation_velocity * rotation_size / body.exterior_angle
    };
    target_rotation *= rotation / rotation_size;

    let acceleration = (target_rotation - body.rotation_velocity) / time_to_target;

    SteeringOutput::angular(clip_angular(acceleration, body.max_angular_acceleration))
}

/// Rotate to face away from an orientation
pub fn anti_align(me: &Steered<'_>, orientation: f32, time_to_target: f32) -> SteeringOutput {
    align(me, orientation + PI, time_to_target)
}

/// Match another velocity
pub fn velocity_matching(
    me: &Steered<'_>,
    target_velocity: Vec2,
    time_to_target: f32,
) -> SteeringOutput {
    let acceleration = (target_velocity - me.velocity()) / time_to_target;
    SteeringOutput::linear(clip_linear(acceleration, me.body.max_acceleration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Transform;
    use crate::steering::Body;

    fn steered<'a>(transform: &'a Transform, body: &'a Body) -> Steered<'a> {
        Steered { transform, body }
    }

    #[test]
    fn test_seek() {
        let transform = Transform::default();
        let body = Body::default();
        let output = seek(&steered(&transform, &body), Vec2::new(10.0, 0.0));

        assert!(output.linear.x > 0.0);
        assert!((output.linear.length() - body.max_acceleration).abs() < 0.01);
        assert_eq!(output.angular, 0.0);
    }

    #[test]
    fn test_seek_coincident_target() {
        let transform = Transform::from_position(Vec2::new(5.0, 5.0));
        let body = Body::default();
        let output = seek(&steered(&transform, &body), Vec2::new(5.0, 5.0));

        assert_eq!(output, SteeringOutput::ZERO);
    }

    #[test]
    fn test_flee() {
        let transform = Transform::default();
        let body = Body::default();
        let output = flee(&steered(&transform, &body), Vec2::new(10.0, 0.0));

        assert!(output.linear.x < 0.0); // Flee in opposite direction
        assert!(!output.linear.x.is_nan());
    }

    #[test]
    fn test_arrive_full_speed_outside_slow_radius() {
        let transform = Transform::default();
        let body = Body::default();
        let me = steered(&transform, &body);

        // Far away: desired velocity is max velocity, so accel = 70 / 0.1 = 700 -> clipped
        let output = arrive(&me, Vec2::new(1000.0, 0.0), 0.1);
        assert!((output.linear.length() - body.max_acceleration).abs() < 1e-3);

        // With a generous acceleration limit the unclipped value shows the target speed
        let fast = Body {
            max_acceleration: 1e6,
            ..Default::default()
        };
        let output = arrive(&steered(&transform, &fast), Vec2::new(1000.0, 0.0), 0.1);
        let desired_speed = output.linear.length() * 0.1;
        assert!((desired_speed - fast.max_velocity).abs() < 1e-3);
    }

    #[test]
    fn test_arrive_ramps_inside_slow_radius() {
        let transform = Transform::default();
        let body = Body {
            max_acceleration: 1e6,
            ..Default::default()
        };
        let output = arrive(&steered(&transform, &body), Vec2::new(125.0, 0.0), 0.1);

        // Half the exterior radius -> half speed
        let desired_speed = output.linear.length() * 0.1;
        assert!((desired_speed - body.max_velocity * 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_arrive_stops_inside_interior_radius() {
        let transform = Transform::default();
        let body = Body {
            velocity: Vec2::new(20.0, 0.0),
            ..Default::default()
        };
        let output = arrive(&steered(&transform, &body), Vec2::new(10.0, 0.0), 0.1);

        assert_eq!(output.linear, Vec2::ZERO);
    }

    #[test]
    fn test_align_same_rotation_is_zero() {
        let transform = Transform::from_position_rotation(Vec2::ZERO, 1.2);
        let body = Body::default();
        let output = align(&steered(&transform, &body), 1.2, 0.25);

        assert_eq!(output, SteeringOutput::ZERO);
    }

    #[test]
    fn test_align_takes_shortest_way_round() {
        // From 170 degrees to -170 degrees the short way is +20 degrees
        let transform = Transform::from_position_rotation(Vec2::ZERO, 170f32.to_radians());
        let body = Body::default();
        let output = align(&steered(&transform, &body), (-170f32).to_radians(), 0.25);

        assert!(output.angular > 0.0);
        assert!(output.angular.abs() <= body.max_angular_acceleration + 1e-6);
        assert_eq!(output.linear, Vec2::ZERO);
    }

    #[test]
    fn test_anti_align_turns_away() {
        let transform = Transform::from_position_rotation(Vec2::ZERO, 0.0);
        let body = Body::default();
        let me = steered(&transform, &body);

        // Facing the same way as the target: needs half a turn
        let output = anti_align(&me, 0.0, 0.25);
        assert!(output.angular.abs() > 0.0);

        // Already opposite: nothing to do
        let output = anti_align(&me, PI, 0.25);
        assert_eq!(output.angular, 0.0);
    }

    #[test]
    fn test_velocity_matching() {
        let transform = Transform::default();
        let body = Body {
            velocity: Vec2::new(10.0, 0.0),
            max_acceleration: 1000.0,
            ..Default::default()
        };
        let output = velocity_matching(&steered(&transform, &body), Vec2::new(20.0, 0.0), 0.1);

        assert!((output.linear - Vec2::new(100.0, 0.0)).length() < 1e-3);
    }
}
