//! Scene description: level tiles, obstacles, spawn points and agents
//!
//! Scenes are written in RON (Rusty Object Notation) or JSON.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::config::{ConfigError, SteeringTuning};
use crate::pathfinding::{Grid, TerrainType, TileLayers, WalkabilityRules};
use crate::steering::{BodyConfig, SteeringKind};

/// Axis-aligned obstacle from the level's object layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRect {
    /// Minimum corner
    pub min: Vec2,
    pub size: Vec2,
}

/// Named position agents can spawn at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub name: String,
    pub position: Vec2,
}

/// Max velocity override on one terrain type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainSpeed {
    pub terrain: TerrainType,
    pub max_velocity: f32,
}

/// A behavior enabled when the agent spawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    pub kind: SteeringKind,
    /// Linear weight; the kind's default when absent
    #[serde(default)]
    pub weight: Option<i32>,
    /// Name of the target agent
    #[serde(default)]
    pub target: Option<String>,
    /// Peer names for group behaviors
    #[serde(default)]
    pub group: Vec<String>,
    /// Face point or MoveToPosition goal
    #[serde(default)]
    pub point: Option<Vec2>,
}

impl BehaviorConfig {
    #[must_use]
    pub fn new(kind: SteeringKind) -> Self {
        Self {
            kind,
            weight: None,
            target: None,
            group: Vec::new(),
            point: None,
        }
    }
}

/// An agent to spawn with the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    /// Spawn point name; takes precedence over `position`
    #[serde(default)]
    pub spawn: Option<String>,
    #[serde(default)]
    pub position: Option<Vec2>,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub body: BodyConfig,
    #[serde(default)]
    pub behaviors: Vec<BehaviorConfig>,
    #[serde(default)]
    pub terrain_speed: Vec<TerrainSpeed>,
    /// Issue a move order here once spawned
    #[serde(default)]
    pub destination: Option<Vec2>,
}

impl AgentConfig {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spawn: None,
            position: None,
            rotation: 0.0,
            body: BodyConfig::default(),
            behaviors: Vec::new(),
            terrain_speed: Vec::new(),
            destination: None,
        }
    }
}

/// A complete scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Scene name
    pub name: String,
    /// Level tiles; no grid is built without them
    #[serde(default)]
    pub tiles: Option<TileLayers>,
    #[serde(default)]
    pub rules: WalkabilityRules,
    /// Overrides the simulation's tunables
    #[serde(default)]
    pub tuning: Option<SteeringTuning>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleRect>,
    #[serde(default)]
    pub spawn_points: Vec<SpawnPoint>,
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

impl SceneConfig {
    /// Create a new empty scene
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tiles: None,
            rules: WalkabilityRules::default(),
            tuning: None,
            obstacles: Vec::new(),
            spawn_points: Vec::new(),
            agents: Vec::new(),
        }
    }

    /// Parse and validate a RON scene
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let scene: SceneConfig =
            ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Parse and validate a JSON scene
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let scene: SceneConfig =
            serde_json::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load a scene from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Load a scene from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Load a scene, picking the format from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }

    /// Save the scene to a RON file
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Position of a named spawn point
    #[must_use]
    pub fn spawn_point(&self, name: &str) -> Option<Vec2> {
        self.spawn_points
            .iter()
            .find(|point| point.name == name)
            .map(|point| point.position)
    }

    /// Where an agent starts: its spawn point, else its position, else the origin
    #[must_use]
    pub fn start_position(&self, agent: &AgentConfig) -> Vec2 {
        agent
            .spawn
            .as_deref()
            .and_then(|name| self.spawn_point(name))
            .or(agent.position)
            .unwrap_or(Vec2::ZERO)
    }

    /// Build the walkability grid, if the scene has tiles
    pub fn build_grid(&self) -> Result<Option<Grid>, ConfigError> {
        self.tiles
            .as_ref()
            .map(|tiles| Grid::from_tiles(tiles, &self.rules))
            .transpose()
    }

    /// Check references and dimensions
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(tiles) = &self.tiles {
            tiles.validate()?;
        }
        self.rules.validate()?;
        if let Some(tuning) = &self.tuning {
            tuning.validate()?;
        }

        for obstacle in &self.obstacles {
            if obstacle.size.x <= 0.0 || obstacle.size.y <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "obstacle at {} has non-positive size",
                    obstacle.min
                )));
            }
        }

        for (index, agent) in self.agents.iter().enumerate() {
            if self.agents[..index].iter().any(|other| other.name == agent.name) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate agent name '{}'",
                    agent.name
                )));
            }
            if let Some(spawn) = &agent.spawn {
                if self.spawn_point(spawn).is_none() {
                    return Err(ConfigError::Invalid(format!(
                        "agent '{}' uses unknown spawn point '{spawn}'",
                        agent.name
                    )));
                }
            }

            let references = agent
                .behaviors
                .iter()
                .flat_map(|b| b.target.iter().chain(b.group.iter()));
            for name in references {
                if !self.agents.iter().any(|other| &other.name == name) {
                    return Err(ConfigError::Invalid(format!(
                        "agent '{}' refers to unknown agent '{name}'",
                        agent.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Number of agents
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
