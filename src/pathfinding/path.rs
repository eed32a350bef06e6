//! Waypoint path produced by the pathfinder

use glam::Vec2;

/// Ordered world-space waypoints, first to last.
///
/// Empty when no route exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Create an empty path
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the path has no waypoints
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Waypoint at an index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// Last waypoint
    #[must_use]
    pub fn last(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }

    /// All waypoints
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Total length along the waypoints
    #[must_use]
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}

impl From<Vec<Vec2>> for Path {
    fn from(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_length() {
        let path = Path::from(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 4.0),
            Vec2::new(3.0, 10.0),
        ]);

        assert!((path.length() - 11.0).abs() < 1e-5);
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(Vec2::new(3.0, 10.0)));
    }

    #[test]
    fn test_empty_path() {
        let path = Path::new();

        assert!(path.is_empty());
        assert_eq!(path.length(), 0.0);
        assert!(path.get(0).is_none());
    }
}
