//! Kinematic body and integrator
//!
//! The integrator is semi-implicit: position advances with the velocity
//! from the previous step, then the velocity picks up the new acceleration.
//! Path following was tuned against this order.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::output::SteeringOutput;
use crate::ecs::Transform;

/// Physical state and limits of one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Whether the body can move at all
    pub can_move: bool,
    /// Current velocity
    pub velocity: Vec2,
    /// Current rotation velocity (radians/s)
    pub rotation_velocity: f32,
    /// Maximum speed
    pub max_velocity: f32,
    /// Maximum rotation velocity (radians/s)
    pub max_rotation_velocity: f32,
    /// Maximum linear acceleration
    pub max_acceleration: f32,
    /// Maximum angular acceleration (radians/s^2)
    pub max_angular_acceleration: f32,
    /// Arrival radius: inside it arrive stops steering
    pub interior_radius: f32,
    /// Slow radius: inside it arrive ramps speed down
    pub exterior_radius: f32,
    /// Alignment tolerance (radians)
    pub interior_angle: f32,
    /// Angle below which rotation ramps down (radians)
    pub exterior_angle: f32,
}

impl Default for Body {
    fn default() -> Self {
        BodyConfig::default().into()
    }
}

impl Body {
    /// Rescale the velocity to `max_velocity` if it exceeds it
    pub fn clip_velocity(&mut self) {
        if self.velocity.length() > self.max_velocity {
            self.velocity = self.velocity.normalize_or_zero() * self.max_velocity;
        }
    }

    /// Stop all motion
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.rotation_velocity = 0.0;
    }

    /// Current speed
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Serializable body limits. Angles are given in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub max_velocity: f32,
    pub max_rotation_velocity_deg: f32,
    pub max_acceleration: f32,
    pub max_angular_acceleration_deg: f32,
    pub interior_radius: f32,
    pub exterior_radius: f32,
    pub interior_angle_deg: f32,
    pub exterior_angle_deg: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            max_velocity: 70.0,
            max_rotation_velocity_deg: 90.0,
            max_acceleration: 500.0,
            max_angular_acceleration_deg: 100.0,
            interior_radius: 70.0,
            exterior_radius: 250.0,
            interior_angle_deg: 5.0,
            exterior_angle_deg: 15.0,
        }
    }
}

impl From<BodyConfig> for Body {
    fn from(config: BodyConfig) -> Self {
        Self {
            can_move: true,
            velocity: Vec2::ZERO,
            rotation_velocity: 0.0,
            max_velocity: config.max_velocity,
            max_rotation_velocity: config.max_rotation_velocity_deg.to_radians(),
            max_acceleration: config.max_acceleration,
            max_angular_acceleration: config.max_angular_acceleration_deg.to_radians(),
            interior_radius: config.interior_radius,
            exterior_radius: config.exterior_radius,
            interior_angle: config.interior_angle_deg.to_radians(),
            exterior_angle: config.exterior_angle_deg.to_radians(),
        }
    }
}

/// Map an angle into (-pi, pi]
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Advance a transform and body by one step of `dt` seconds.
pub fn integrate(transform: &mut Transform, body: &mut Body, steering: SteeringOutput, dt: f32) {
    if !body.can_move || steering.is_zero() {
        // No coasting
        body.halt();
        return;
    }

    transform.position += body.velocity * dt;
    transform.rotation += body.rotation_velocity * dt;

    body.velocity += steering.linear * dt;
    body.rotation_velocity += steering.angular * dt;

    body.clip_velocity();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving_body(velocity: Vec2) -> Body {
        Body {
            velocity,
            ..Default::default()
        }
    }

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-0.5 - TAU) + 0.5).abs() < 1e-5);

        for i in -50..50 {
            let wrapped = wrap_angle(i as f32 * 0.37);
            assert!(wrapped > -PI && wrapped <= PI + 1e-6);
        }
    }

    #[test]
    fn test_integrate_moves_with_old_velocity() {
        let mut transform = Transform::default();
        let mut body = moving_body(Vec2::new(10.0, 0.0));

        let steering = SteeringOutput::linear(Vec2::new(0.0, 100.0));
        integrate(&mut transform, &mut body, steering, 0.5);

        // Position used the previous velocity only
        assert!((transform.position - Vec2::new(5.0, 0.0)).length() < 1e-5);
        // Velocity picked up the acceleration afterwards
        assert!((body.velocity - Vec2::new(10.0, 50.0)).length() < 1e-5);
    }

    #[test]
    fn test_integrate_zero_steering_halts() {
        let mut transform = Transform::default();
        let mut body = moving_body(Vec2::new(10.0, 5.0));
        body.rotation_velocity = 1.0;

        integrate(&mut transform, &mut body, SteeringOutput::ZERO, 0.1);

        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.rotation_velocity, 0.0);
        assert_eq!(transform.position, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_immobile_body() {
        let mut transform = Transform::default();
        let mut body = moving_body(Vec2::new(10.0, 0.0));
        body.can_move = false;

        integrate(&mut transform, &mut body, SteeringOutput::linear(Vec2::X), 0.1);

        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(transform.position, Vec2::ZERO);
    }

    #[test]
    fn test_velocity_is_clipped() {
        let mut transform = Transform::default();
        let mut body = moving_body(Vec2::ZERO);

        for _ in 0..100 {
            let steering = SteeringOutput::linear(Vec2::new(3.0, 4.0) * 1000.0);
            integrate(&mut transform, &mut body, steering, 0.1);
            assert!(body.velocity.length() <= body.max_velocity + 1e-3);
        }

        // Direction preserved
        let direction = body.velocity.normalize();
        assert!((direction - Vec2::new(0.6, 0.8)).length() < 1e-4);
    }

    #[test]
    fn test_body_config_converts_degrees() {
        let body: Body = BodyConfig {
            interior_angle_deg: 180.0,
            ..Default::default()
        }
        .into();

        assert!((body.interior_angle - PI).abs() < 1e-5);
        assert!(body.can_move);
        assert_eq!(body.velocity, Vec2::ZERO);
    }
}
