//! Simulation configuration and steering tunables

use serde::{Deserialize, Serialize};

/// Tunables copied into behaviors when an agent enables them.
///
/// Times are in seconds, distances in world units, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringTuning {
    /// Smoothing time for Align, AntiAlign, Face and friends
    pub align_time_to_target: f32,
    pub arrive_time_to_target: f32,
    pub velocity_matching_time_to_target: f32,
    /// Max prediction horizon for Pursue
    pub pursue_prediction: f32,
    /// Max prediction horizon for Evade
    pub evade_prediction: f32,
    pub wander_radius: f32,
    pub wander_offset: f32,
    pub wander_rate: f32,
    /// Starting wander orientation
    pub wander_orientation: f32,
    /// How far past a hit point obstacle avoidance aims
    pub avoid_distance: f32,
    /// Length of the obstacle avoidance ray
    pub look_ahead: f32,
    /// Distance at which a waypoint counts as reached
    pub path_arrival_radius: f32,
    /// Distance at which MoveToPosition switches itself off
    pub move_to_tolerance: f32,
    pub alignment_threshold: f32,
    pub cohesion_threshold: f32,
    pub separation_threshold: f32,
}

impl Default for SteeringTuning {
    fn default() -> Self {
        Self {
            align_time_to_target: 0.25,
            arrive_time_to_target: 0.1,
            velocity_matching_time_to_target: 0.1,
            pursue_prediction: 4.0,
            evade_prediction: 2.0,
            wander_radius: 2.0,
            wander_offset: 2.0,
            wander_rate: 1.0,
            wander_orientation: 2.0,
            avoid_distance: 300.0,
            look_ahead: 350.0,
            path_arrival_radius: 8.0,
            move_to_tolerance: 4.0,
            alignment_threshold: 300.0,
            cohesion_threshold: 1000.0,
            separation_threshold: 120.0,
        }
    }
}

impl SteeringTuning {
    /// Check every tunable is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let times = [
            ("align_time_to_target", self.align_time_to_target),
            ("arrive_time_to_target", self.arrive_time_to_target),
            (
                "velocity_matching_time_to_target",
                self.velocity_matching_time_to_target,
            ),
        ];
        for (name, value) in times {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }

        let distances = [
            ("pursue_prediction", self.pursue_prediction),
            ("evade_prediction", self.evade_prediction),
            ("avoid_distance", self.avoid_distance),
            ("look_ahead", self.look_ahead),
            ("path_arrival_radius", self.path_arrival_radius),
            ("move_to_tolerance", self.move_to_tolerance),
            ("alignment_threshold", self.alignment_threshold),
            ("cohesion_threshold", self.cohesion_threshold),
            ("separation_threshold", self.separation_threshold),
        ];
        for (name, value) in distances {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must not be negative")));
            }
        }

        Ok(())
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Fixed timestep in seconds
    pub timestep: f32,
    /// Base seed for wander random streams
    pub seed: u64,
    /// Radius of the collision proxy registered for each agent
    pub agent_radius: f32,
    /// Initial event queue capacity
    pub event_capacity: usize,
    pub tuning: SteeringTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            seed: 0x5EED,
            agent_radius: 16.0,
            event_capacity: 64,
            tuning: SteeringTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Set the fixed timestep
    #[must_use]
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the wander seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the collision proxy radius
    #[must_use]
    pub fn with_agent_radius(mut self, radius: f32) -> Self {
        self.agent_radius = radius;
        self
    }

    /// Set the event queue capacity
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the behavior tunables
    #[must_use]
    pub fn with_tuning(mut self, tuning: SteeringTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timestep > 0.0) {
            return Err(ConfigError::Invalid("timestep must be positive".into()));
        }
        if !(self.agent_radius > 0.0) {
            return Err(ConfigError::Invalid("agent radius must be positive".into()));
        }
        self.tuning.validate()
    }
}

/// Errors that can occur while loading or validating configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Malformed RON or JSON
    Parse(String),
    /// Well-formed but unusable values
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SimulationConfig::default()
            .with_timestep(0.02)
            .with_seed(9)
            .with_agent_radius(8.0);

        assert_eq!(config.timestep, 0.02);
        assert_eq!(config.seed, 9);
        assert_eq!(config.agent_radius, 8.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_timestep() {
        let config = SimulationConfig::default().with_timestep(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = SimulationConfig::default().with_timestep(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tuning_partial_ron() {
        let tuning: SteeringTuning = ron::from_str("(look_ahead: 100.0)").unwrap();

        assert_eq!(tuning.look_ahead, 100.0);
        assert_eq!(tuning.avoid_distance, 300.0);
        assert_eq!(tuning.path_arrival_radius, 8.0);
    }

    #[test]
    fn test_tuning_rejects_zero_time() {
        let tuning = SteeringTuning {
            arrive_time_to_target: 0.0,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_error_display() {
        let error = ConfigError::Invalid("tile size must be positive".into());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: tile size must be positive"
        );
    }
}
