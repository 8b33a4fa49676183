//! Route polylines produced by the network builder.

use glam::{IVec2, Vec3};

use crate::heightmap::grid::{GridToWorld, HeightMap};

/// An ordered, non-empty waypoint polyline in grid and world space.
///
/// Paths are addressed by their index in the chunk's path list plus a
/// waypoint index; spatial-index payloads use that pair to point back here.
#[derive(Clone, Debug)]
pub struct NavigationPath {
    pub waypoints: Vec<IVec2>,
    pub world_waypoints: Vec<Vec3>,
}

impl NavigationPath {
    /// Build a path from grid waypoints, deriving world positions from the
    /// carved height grid.
    pub fn from_waypoints(
        waypoints: Vec<IVec2>,
        heights: &HeightMap,
        to_world: &GridToWorld,
    ) -> Self {
        debug_assert!(!waypoints.is_empty(), "paths must have at least one waypoint");
        let world_waypoints = waypoints
            .iter()
            .map(|&cell| to_world.world_point(cell, heights.at(cell)))
            .collect();
        Self {
            waypoints,
            world_waypoints,
        }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}
