//! Route-network construction between chunk boundary seeds.

use glam::IVec2;

use crate::config::Settings;
use crate::core::types::Result;
use crate::heightmap::grid::{Grid, GridToWorld, HeightMap};
use crate::nav::astar::{AStarSearch, StepCost};
use crate::nav::connectivity::ConnectivityLabels;
use crate::nav::path::NavigationPath;
use crate::nav::walkable::WalkableCache;
use crate::spatial::{EntryKind, PathHandle, QuadTree};

/// The finished route network of one chunk.
pub struct RouteNetwork {
    pub paths: Vec<NavigationPath>,
    /// Per-cell street occupancy: the index of the owning path, `-1` free.
    pub street_map: Grid<i32>,
}

/// Connect the boundary seed points pairwise and bake the results.
///
/// Seed pairs in different connectivity components are skipped before any
/// search runs; pairs the search cannot connect are skipped silently.
/// Every found path is carved into `heights`, recorded in the street map,
/// and registered waypoint by waypoint in the spatial index.
pub fn build_network(
    settings: &Settings,
    heights: &mut HeightMap,
    walkable: &mut WalkableCache,
    connectivity: &ConnectivityLabels,
    seeds: &[IVec2],
    to_world: &GridToWorld,
    index: &mut QuadTree,
) -> Result<RouteNetwork> {
    let resolution = settings.resolution;
    let mut street_map: Grid<i32> = Grid::filled(resolution, -1);
    let mut paths: Vec<NavigationPath> = Vec::new();

    let mut search = AStarSearch::new(settings.heuristic_weight);
    search.prepare(resolution * resolution);

    let mut attempted = 0usize;
    for i in 0..seeds.len() {
        for j in (i + 1)..seeds.len() {
            let (start, goal) = (seeds[i], seeds[j]);
            if start == goal {
                continue;
            }
            if !connectivity.same_component(start, goal) {
                continue;
            }
            attempted += 1;

            let found = {
                let step_cost = StepCost {
                    heights: &*heights,
                    street: Some(&street_map),
                    cardinal: settings.cardinal_cost,
                    diagonal: settings.diagonal_cost,
                    slope_weight: settings.slope_cost_weight,
                    road_discount: settings.road_discount,
                };
                search.search(walkable, &step_cost, start, goal)
            };
            let Some(waypoints) = found else {
                log::debug!("no route between {:?} and {:?}", start, goal);
                continue;
            };

            let path_index = paths.len();
            carve_street(settings, heights, &mut street_map, &waypoints, path_index);
            let path = NavigationPath::from_waypoints(waypoints, heights, to_world);
            for (label, &cell) in path.waypoints.iter().enumerate() {
                index.insert(
                    to_world.world_xz(cell),
                    EntryKind::Street,
                    PathHandle {
                        collection: path_index,
                        label,
                    },
                )?;
            }
            paths.push(path);
        }
    }
    search.clean_up();

    log::debug!(
        "route network: {} paths from {} connected seed pairs ({} seeds)",
        paths.len(),
        attempted,
        seeds.len()
    );

    Ok(RouteNetwork { paths, street_map })
}

/// Flatten the terrain along a path and mark its cells as street.
///
/// Waypoint heights are smoothed with a small moving average, then cells
/// within the street radius blend toward the smoothed height, hardest at
/// the path center.
fn carve_street(
    settings: &Settings,
    heights: &mut HeightMap,
    street_map: &mut Grid<i32>,
    waypoints: &[IVec2],
    path_index: usize,
) {
    let smoothed = smoothed_heights(heights, waypoints);
    let radius_cells = (settings.street_radius / settings.cell_size()).ceil().max(1.0) as i32;
    let radius_sq = radius_cells * radius_cells;

    for (i, &wp) in waypoints.iter().enumerate() {
        for dy in -radius_cells..=radius_cells {
            for dx in -radius_cells..=radius_cells {
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }
                let cell = wp + IVec2::new(dx, dy);
                if !heights.in_bounds(cell) {
                    continue;
                }
                let dist = ((dx * dx + dy * dy) as f32).sqrt();
                let blend = 1.0 - dist / (radius_cells as f32 + 1.0);
                let current = heights.at(cell);
                heights.set_at(cell, current + (smoothed[i] - current) * blend);
                street_map.set_at(cell, path_index as i32);
            }
        }
    }
}

fn smoothed_heights(heights: &HeightMap, waypoints: &[IVec2]) -> Vec<f32> {
    const WINDOW: isize = 2;
    (0..waypoints.len() as isize)
        .map(|i| {
            let lo = (i - WINDOW).max(0) as usize;
            let hi = ((i + WINDOW) as usize).min(waypoints.len() - 1);
            let sum: f32 = waypoints[lo..=hi].iter().map(|&wp| heights.at(wp)).sum();
            sum / (hi - lo + 1) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use crate::heightmap::grid::NormalMap;
    use crate::heightmap::generate_normals;
    use crate::spatial::{CircleBound, Rect};

    fn test_settings(resolution: usize) -> Settings {
        Settings {
            resolution,
            chunk_size: resolution as f32 * 2.0,
            street_radius: 2.0,
            heuristic_weight: 1.0,
            ..Default::default()
        }
    }

    fn flat_world(settings: &Settings) -> (HeightMap, NormalMap, GridToWorld) {
        let heights = HeightMap::filled(settings.resolution, 0.4);
        let normals = generate_normals(&heights, settings.depth, settings.cell_size());
        let to_world = GridToWorld::new(
            IVec2::ZERO,
            settings.chunk_size,
            settings.resolution,
            settings.depth,
        );
        (heights, normals, to_world)
    }

    fn world_index(settings: &Settings) -> QuadTree {
        QuadTree::new(
            Rect::new(Vec2::ZERO, Vec2::splat(settings.chunk_size)).inflated(8.0),
        )
    }

    #[test]
    fn test_connects_seeds_and_registers_waypoints() {
        let settings = test_settings(16);
        let (mut heights, normals, to_world) = flat_world(&settings);
        let mut walkable = WalkableCache::new(&normals, settings.walkable_min_up());
        let connectivity = ConnectivityLabels::compute(&mut walkable);
        let mut index = world_index(&settings);

        let seeds = [IVec2::new(0, 8), IVec2::new(15, 8)];
        let network = build_network(
            &settings,
            &mut heights,
            &mut walkable,
            &connectivity,
            &seeds,
            &to_world,
            &mut index,
        )
        .unwrap();

        assert_eq!(network.paths.len(), 1);
        let path = &network.paths[0];
        assert_eq!(path.waypoints.first(), Some(&seeds[0]));
        assert_eq!(path.waypoints.last(), Some(&seeds[1]));
        assert_eq!(index.len(), path.len());

        // Every waypoint is findable as street geometry.
        for &cell in &path.waypoints {
            let pos = to_world.world_xz(cell);
            assert!(index.collides_circle(
                CircleBound::new(pos, 0.5),
                Some(EntryKind::Street)
            ));
        }
    }

    #[test]
    fn test_street_map_marks_route_cells() {
        let settings = test_settings(16);
        let (mut heights, normals, to_world) = flat_world(&settings);
        let mut walkable = WalkableCache::new(&normals, settings.walkable_min_up());
        let connectivity = ConnectivityLabels::compute(&mut walkable);
        let mut index = world_index(&settings);

        let seeds = [IVec2::new(0, 8), IVec2::new(15, 8)];
        let network = build_network(
            &settings,
            &mut heights,
            &mut walkable,
            &connectivity,
            &seeds,
            &to_world,
            &mut index,
        )
        .unwrap();

        for &cell in &network.paths[0].waypoints {
            assert_eq!(network.street_map.at(cell), 0);
        }
        // Far corner stays free.
        assert_eq!(network.street_map.get(15, 0), -1);
    }

    #[test]
    fn test_disconnected_seeds_are_skipped_silently() {
        let settings = test_settings(12);
        let (mut heights, _, to_world) = flat_world(&settings);

        // Wall of cliffs down the middle splits the chunk in two.
        let mut normals = NormalMap::filled(settings.resolution, Vec3::Y);
        for y in 0..settings.resolution {
            normals.set(6, y, Vec3::X);
        }
        let mut walkable = WalkableCache::new(&normals, settings.walkable_min_up());
        let connectivity = ConnectivityLabels::compute(&mut walkable);
        assert_eq!(connectivity.num_labels(), 2);

        let mut index = world_index(&settings);
        let seeds = [IVec2::new(0, 6), IVec2::new(11, 6)];
        let network = build_network(
            &settings,
            &mut heights,
            &mut walkable,
            &connectivity,
            &seeds,
            &to_world,
            &mut index,
        )
        .unwrap();

        assert!(network.paths.is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_carve_flattens_toward_path() {
        let settings = test_settings(16);
        let mut heights = HeightMap::filled(settings.resolution, 0.4);
        // A bump next to the path gets pulled toward the street height.
        heights.set(5, 8, 0.9);
        let mut street_map = Grid::filled(settings.resolution, -1);
        let waypoints: Vec<IVec2> = (0..16).map(|x| IVec2::new(x, 8)).collect();

        carve_street(&settings, &mut heights, &mut street_map, &waypoints, 3);

        let carved = heights.get(5, 8);
        assert!(carved < 0.9, "bump not flattened: {}", carved);
        assert_eq!(street_map.get(5, 8), 3);
    }
}
