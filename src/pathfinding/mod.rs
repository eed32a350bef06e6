//! Grid navigation
//!
//! A [`Grid`] is built once from tile data; a [`Pathfinder`] searches it and
//! returns a [`Path`] of world-space waypoints.

mod astar;
mod grid;
mod path;
mod tiles;

pub use astar::{Pathfinder, find_path};
pub use grid::{Grid, Neighbours, Node};
pub use path::Path;
pub use tiles::{TerrainType, TileLayers, TileRule, WalkabilityRules};
