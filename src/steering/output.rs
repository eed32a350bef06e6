//! Steering output value type

use glam::Vec2;

/// Output from a steering behavior
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Linear acceleration
    pub linear: Vec2,
    /// Angular acceleration (radians/s^2)
    pub angular: f32,
}

impl SteeringOutput {
    /// Zero steering
    pub const ZERO: Self = Self {
        linear: Vec2::ZERO,
        angular: 0.0,
    };

    /// Purely linear steering
    #[must_use]
    pub const fn linear(linear: Vec2) -> Self {
        Self {
            linear,
            angular: 0.0,
        }
    }

    /// Purely angular steering
    #[must_use]
    pub const fn angular(angular: f32) -> Self {
        Self {
            linear: Vec2::ZERO,
            angular,
        }
    }

    /// Accumulate another output, scaling only its linear part.
    ///
    /// Angular contributions are summed unweighted.
    pub fn accumulate(&mut self, other: Self, weight: i32) {
        self.linear += other.linear * weight as f32;
        self.angular += other.angular;
    }

    /// True when both components are exactly zero
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.linear == Vec2::ZERO && self.angular == 0.0
    }
}
