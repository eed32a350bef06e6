//! Tile data consumed when building a walkability grid

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// Terrain under a cell, used for per-agent speed changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    Grass,
    Sand,
    BaseFloor,
    Water,
    Wall,
}

impl fmt::Display for TerrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Maps an inclusive range of tile identifiers to walkability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRule {
    pub first: u32,
    pub last: u32,
    pub walkable: bool,
    #[serde(default)]
    pub terrain: Option<TerrainType>,
}

impl TileRule {
    /// Rule for a walkable range
    #[must_use]
    pub const fn walkable(first: u32, last: u32) -> Self {
        Self {
            first,
            last,
            walkable: true,
            terrain: None,
        }
    }

    /// Rule for a blocking range
    #[must_use]
    pub const fn blocked(first: u32, last: u32) -> Self {
        Self {
            first,
            last,
            walkable: false,
            terrain: None,
        }
    }

    /// Tag the range with a terrain type
    #[must_use]
    pub const fn with_terrain(mut self, terrain: TerrainType) -> Self {
        self.terrain = Some(terrain);
        self
    }

    #[must_use]
    pub const fn matches(&self, tile: u32) -> bool {
        tile >= self.first && tile <= self.last
    }
}

/// Ordered tile rules; the first matching rule decides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalkabilityRules {
    pub rules: Vec<TileRule>,
}

impl WalkabilityRules {
    #[must_use]
    pub fn new(rules: Vec<TileRule>) -> Self {
        Self { rules }
    }

    /// Rule applying to a tile identifier
    #[must_use]
    pub fn classify(&self, tile: u32) -> Option<&TileRule> {
        self.rules.iter().find(|rule| rule.matches(tile))
    }

    /// Check every range is well formed
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.rules {
            if rule.first > rule.last {
                return Err(ConfigError::Invalid(format!(
                    "tile rule range {}..={} is empty",
                    rule.first, rule.last
                )));
            }
        }
        Ok(())
    }
}

/// Layered tile identifiers for a rectangular map.
///
/// Each layer is row-major, `width * height` long. Identifier 0 means no
/// tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayers {
    pub width: usize,
    pub height: usize,
    /// Edge length of a square tile in world units
    pub tile_size: u32,
    pub layers: Vec<Vec<u32>>,
}

impl TileLayers {
    /// Map with no layers
    #[must_use]
    pub fn new(width: usize, height: usize, tile_size: u32) -> Self {
        Self {
            width,
            height,
            tile_size,
            layers: Vec::new(),
        }
    }

    /// Append a layer
    #[must_use]
    pub fn with_layer(mut self, layer: Vec<u32>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Identifiers at a cell across all layers, bottom to top
    pub fn tiles_at(&self, x: usize, y: usize) -> impl Iterator<Item = u32> + '_ {
        let index = y * self.width + x;
        self.layers
            .iter()
            .filter_map(move |layer| layer.get(index).copied())
            .filter(|&tile| tile != 0)
    }

    /// Check dimensions against layer data
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::Invalid("tile size must be positive".into()));
        }
        let cells = self.width * self.height;
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.len() != cells {
                return Err(ConfigError::Invalid(format!(
                    "tile layer {index} has {} cells, expected {cells}",
                    layer.len()
                )));
            }
        }
        Ok(())
    }
}
