//! Walkability grid with 8-connected cells

use glam::Vec2;
use smallvec::SmallVec;

use super::tiles::{TerrainType, TileLayers, WalkabilityRules};
use crate::core::ConfigError;

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub walkable: bool,
    /// Centre of the cell in world space
    pub world_position: Vec2,
    pub gx: usize,
    pub gy: usize,
    pub terrain: Option<TerrainType>,
}

/// Neighbour coordinates of a cell (at most eight)
pub type Neighbours = SmallVec<[(usize, usize); 8]>;

/// A 2D navigation grid.
///
/// Immutable once built: search state lives with each search, so a grid
/// can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    tile_size: f32,
    nodes: Vec<Node>,
}

impl Grid {
    /// Create a grid with every cell walkable
    #[must_use]
    pub fn open(width: usize, height: usize, tile_size: f32) -> Self {
        let mut nodes = Vec::with_capacity(width * height);
        for gy in 0..height {
            for gx in 0..width {
                nodes.push(Node {
                    walkable: true,
                    world_position: Self::cell_center(gx, gy, tile_size),
                    gx,
                    gy,
                    terrain: None,
                });
            }
        }

        Self {
            width,
            height,
            tile_size,
            nodes,
        }
    }

    /// Build from tile layers.
    ///
    /// A cell is blocked if any of its tiles maps to a blocking rule, walkable
    /// if at least one maps to a walkable rule, and blocked when nothing
    /// matches. Terrain comes from the topmost tile carrying one.
    pub fn from_tiles(tiles: &TileLayers, rules: &WalkabilityRules) -> Result<Self, ConfigError> {
        tiles.validate()?;
        rules.validate()?;

        let mut grid = Self::open(tiles.width, tiles.height, tiles.tile_size as f32);
        for node in &mut grid.nodes {
            let mut walkable = false;
            let mut blocked = false;
            let mut terrain = None;

            for tile in tiles.tiles_at(node.gx, node.gy) {
                if let Some(rule) = rules.classify(tile) {
                    if rule.walkable {
                        walkable = true;
                    } else {
                        blocked = true;
                    }
                    terrain = rule.terrain.or(terrain);
                }
            }

            node.walkable = walkable && !blocked;
            node.terrain = terrain;
        }

        log::debug!(
            "Built {}x{} grid: {} walkable, {} blocked",
            grid.width,
            grid.height,
            grid.walkable_count(),
            grid.nodes.len() - grid.walkable_count()
        );

        Ok(grid)
    }

    fn cell_center(gx: usize, gy: usize, tile_size: f32) -> Vec2 {
        Vec2::new(
            (gx as f32 + 0.5) * tile_size,
            (gy as f32 + 0.5) * tile_size,
        )
    }

    /// Width in cells
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in cells
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Cell size in world units
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the grid has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flat index of a cell
    #[must_use]
    pub(crate) const fn index(&self, gx: usize, gy: usize) -> usize {
        gy * self.width + gx
    }

    /// Node at grid coordinates
    #[must_use]
    pub fn node(&self, gx: usize, gy: usize) -> Option<&Node> {
        if gx >= self.width || gy >= self.height {
            return None;
        }
        self.nodes.get(self.index(gx, gy))
    }

    /// Node by flat index
    #[must_use]
    pub(crate) fn node_at_index(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Set a cell's walkability
    pub fn set_walkable(&mut self, gx: usize, gy: usize, walkable: bool) {
        if gx < self.width && gy < self.height {
            let index = self.index(gx, gy);
            self.nodes[index].walkable = walkable;
        }
    }

    /// Check if a cell is walkable; out-of-bounds cells are not
    #[must_use]
    pub fn is_walkable(&self, gx: usize, gy: usize) -> bool {
        self.node(gx, gy).is_some_and(|node| node.walkable)
    }

    /// Grid coordinates containing a world position, if inside the grid
    #[must_use]
    pub fn world_to_grid(&self, position: Vec2) -> Option<(usize, usize)> {
        let gx = (position.x / self.tile_size).floor();
        let gy = (position.y / self.tile_size).floor();

        if !gx.is_finite() || !gy.is_finite() || gx < 0.0 || gy < 0.0 {
            return None;
        }

        let (gx, gy) = (gx as usize, gy as usize);
        (gx < self.width && gy < self.height).then_some((gx, gy))
    }

    /// Node containing a world position
    #[must_use]
    pub fn node_at_world(&self, position: Vec2) -> Option<&Node> {
        self.world_to_grid(position)
            .and_then(|(gx, gy)| self.node(gx, gy))
    }

    /// Terrain under a world position
    #[must_use]
    pub fn terrain_at(&self, position: Vec2) -> Option<TerrainType> {
        self.node_at_world(position).and_then(|node| node.terrain)
    }

    /// In-bounds neighbours of a cell (Moore neighbourhood)
    #[must_use]
    pub fn neighbours(&self, gx: usize, gy: usize) -> Neighbours {
        let mut result = Neighbours::new();

        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = gx as i64 + dx;
                let ny = gy as i64 + dy;
                if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                    continue;
                }
                result.push((nx as usize, ny as usize));
            }
        }

        result
    }

    /// Number of walkable cells
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.walkable).count()
    }

    /// Iterate over every node
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::TileRule;

    #[test]
    fn test_world_position_is_cell_center() {
        let grid = Grid::open(4, 3, 32.0);
        let node = grid.node(2, 1).map(|n| n.world_position);

        assert_eq!(node, Some(Vec2::new(80.0, 48.0)));
    }

    #[test]
    fn test_world_to_grid_bounds() {
        let grid = Grid::open(4, 3, 10.0);

        assert_eq!(grid.world_to_grid(Vec2::new(0.0, 0.0)), Some((0, 0)));
        assert_eq!(grid.world_to_grid(Vec2::new(39.9, 29.9)), Some((3, 2)));
        assert_eq!(grid.world_to_grid(Vec2::new(40.0, 5.0)), None);
        assert_eq!(grid.world_to_grid(Vec2::new(-0.1, 5.0)), None);
        assert_eq!(grid.world_to_grid(Vec2::new(f32::NAN, 5.0)), None);
        assert!(grid.node_at_world(Vec2::new(5.0, 100.0)).is_none());
    }

    #[test]
    fn test_neighbour_counts() {
        let grid = Grid::open(3, 3, 1.0);

        assert_eq!(grid.neighbours(1, 1).len(), 8);
        assert_eq!(grid.neighbours(0, 0).len(), 3);
        assert_eq!(grid.neighbours(1, 0).len(), 5);
        assert_eq!(grid.neighbours(2, 2).len(), 3);
    }

    #[test]
    fn test_from_tiles_mapping() {
        let tiles = TileLayers::new(3, 1, 16)
            // ground layer
            .with_layer(vec![1, 1, 0])
            // decoration layer: a rock on the middle cell
            .with_layer(vec![0, 50, 0]);
        let rules = WalkabilityRules::new(vec![
            TileRule::walkable(1, 10).with_terrain(TerrainType::Grass),
            TileRule::blocked(40, 60),
        ]);

        let grid = Grid::from_tiles(&tiles, &rules).unwrap();

        assert!(grid.is_walkable(0, 0));
        assert!(!grid.is_walkable(1, 0));
        // No tile at all defaults to blocked
        assert!(!grid.is_walkable(2, 0));
        assert_eq!(grid.walkable_count(), 1);
        assert_eq!(grid.terrain_at(Vec2::new(8.0, 8.0)), Some(TerrainType::Grass));
    }

    #[test]
    fn test_from_tiles_unknown_id_is_blocked() {
        let tiles = TileLayers::new(1, 1, 16).with_layer(vec![999]);
        let rules = WalkabilityRules::new(vec![TileRule::walkable(1, 10)]);

        let grid = Grid::from_tiles(&tiles, &rules).unwrap();
        assert!(!grid.is_walkable(0, 0));
    }

    #[test]
    fn test_from_tiles_rejects_bad_layers() {
        let tiles = TileLayers::new(2, 2, 16).with_layer(vec![1]);
        let rules = WalkabilityRules::default();

        assert!(Grid::from_tiles(&tiles, &rules).is_err());
    }
}
