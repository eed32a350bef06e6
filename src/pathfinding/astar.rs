//! A* search over a [`Grid`]
//!
//! Step costs and the heuristic are both Manhattan distances between cell
//! centres. A diagonal step costs as much as two straight ones, so paths can
//! be longer than the Euclidean optimum.

use glam::Vec2;

use super::grid::Grid;
use super::path::Path;

/// Per-search bookkeeping, indexed by flat cell index
struct SearchState {
    g: Vec<f32>,
    h: Vec<f32>,
    parent: Vec<Option<usize>>,
    in_open: Vec<bool>,
    closed: Vec<bool>,
    open: Vec<usize>,
}

impl SearchState {
    fn new(cells: usize) -> Self {
        Self {
            g: vec![f32::INFINITY; cells],
            h: vec![0.0; cells],
            parent: vec![None; cells],
            in_open: vec![false; cells],
            closed: vec![false; cells],
            open: Vec::new(),
        }
    }

    /// Remove and return the open cell with the lowest f, ties going to the
    /// lowest h, then to the earliest inserted
    fn pop_best(&mut self) -> Option<usize> {
        let mut best: Option<(usize, f32, f32)> = None;

        for (slot, &cell) in self.open.iter().enumerate() {
            let h = self.h[cell];
            let f = self.g[cell] + h;
            let better = match best {
                None => true,
                Some((_, best_f, best_h)) => f < best_f || (f == best_f && h < best_h),
            };
            if better {
                best = Some((slot, f, h));
            }
        }

        let (slot, _, _) = best?;
        let cell = self.open.remove(slot);
        self.in_open[cell] = false;
        Some(cell)
    }

    fn push_open(&mut self, cell: usize) {
        if !self.in_open[cell] {
            self.in_open[cell] = true;
            self.open.push(cell);
        }
    }
}

fn manhattan(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Finds waypoint paths across a grid.
///
/// Holds no mutable state, so any number of searches may run at once over
/// the same grid.
#[derive(Debug, Clone, Copy)]
pub struct Pathfinder<'a> {
    grid: &'a Grid,
}

impl<'a> Pathfinder<'a> {
    #[must_use]
    pub const fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// The grid being searched
    #[must_use]
    pub const fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Find a path between two world positions.
    ///
    /// The path runs from the centre of the start cell to the centre of the
    /// goal cell. It is empty when either point lies outside the grid, the
    /// goal cell is blocked, both points share a cell, or no route exists.
    #[must_use]
    pub fn find_path(&self, start: Vec2, end: Vec2) -> Path {
        let grid = self.grid;

        let (Some(start_cell), Some(goal_cell)) = (grid.world_to_grid(start), grid.world_to_grid(end))
        else {
            log::debug!("Path request {start} -> {end} leaves the grid");
            return Path::new();
        };

        if start_cell == goal_cell {
            return Path::new();
        }
        if !grid.is_walkable(goal_cell.0, goal_cell.1) {
            log::debug!("Path goal {goal_cell:?} is not walkable");
            return Path::new();
        }

        let start_index = grid.index(start_cell.0, start_cell.1);
        let goal_index = grid.index(goal_cell.0, goal_cell.1);
        let Some(goal_position) = grid.node_at_index(goal_index).map(|n| n.world_position) else {
            return Path::new();
        };

        let mut state = SearchState::new(grid.len());
        state.g[start_index] = 0.0;
        if let Some(node) = grid.node_at_index(start_index) {
            state.h[start_index] = manhattan(node.world_position, goal_position);
        }
        state.push_open(start_index);

        let mut expanded = 0usize;
        while let Some(current) = state.pop_best() {
            state.closed[current] = true;
            expanded += 1;

            if current == goal_index {
                let path = self.reconstruct(&state, goal_index);
                log::debug!(
                    "Path {start_cell:?} -> {goal_cell:?}: {} waypoints, {expanded} cells expanded",
                    path.len()
                );
                return path;
            }

            let Some(current_node) = grid.node_at_index(current).copied() else {
                continue;
            };

            for (nx, ny) in grid.neighbours(current_node.gx, current_node.gy) {
                let Some(neighbour) = grid.node(nx, ny) else {
                    continue;
                };
                let index = grid.index(nx, ny);
                if !neighbour.walkable || state.closed[index] {
                    continue;
                }

                let tentative = state.g[current]
                    + manhattan(current_node.world_position, neighbour.world_position);
                if tentative < state.g[index] || !state.in_open[index] {
                    state.g[index] = tentative;
                    state.h[index] = manhattan(neighbour.world_position, goal_position);
                    state.parent[index] = Some(current);
                    state.push_open(index);
                }
            }
        }

        log::debug!("No path {start_cell:?} -> {goal_cell:?} after {expanded} cells");
        Path::new()
    }

    fn reconstruct(&self, state: &SearchState, goal: usize) -> Path {
        let mut waypoints = Vec::new();
        let mut cursor = Some(goal);

        while let Some(index) = cursor {
            if let Some(node) = self.grid.node_at_index(index) {
                waypoints.push(node.world_position);
            }
            cursor = state.parent[index];
        }

        waypoints.reverse();
        Path::from(waypoints)
    }
}

/// Find a path on a grid
#[must_use]
pub fn find_path(grid: &Grid, start: Vec2, end: Vec2) -> Path {
    Pathfinder::new(grid).find_path(start, end)
}
