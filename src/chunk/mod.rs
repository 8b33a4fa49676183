//! Terrain chunk build orchestration.
//!
//! One build runs the whole pipeline in order: height and moisture
//! composition, normals, walkability, connectivity, route network, jump
//! discovery and texture labeling. Builds are deterministic in (settings,
//! coords) and independent across chunks.

pub mod edge;

use std::time::Instant;

use glam::{IVec2, Vec2};
use rayon::prelude::*;

use crate::config::Settings;
use crate::core::types::Result;
use crate::heightmap::{generate_normals, ComposedHeightMap, GridToWorld, HeightMap, NormalMap};
use crate::jump::{find_jumps, JumpData};
use crate::label::{map_terrain, SplatMap};
use crate::nav::{build_network, ConnectivityLabels, RouteNetwork, WalkableCache};
use crate::spatial::{QuadTree, Rect};

pub use edge::ChunkEdge;

/// Everything one chunk build produces, handed off read-only.
pub struct TerrainChunk {
    pub coords: IVec2,
    pub chunk_seed: u32,
    pub edges: [ChunkEdge; 4],
    /// Height field with streets carved in.
    pub heights: HeightMap,
    /// Normals of the uncarved surface, as the labeler sees them.
    pub normals: NormalMap,
    pub moisture: HeightMap,
    pub connectivity: ConnectivityLabels,
    pub network: RouteNetwork,
    pub jumps: Vec<JumpData>,
    pub splat: SplatMap,
    /// Spatial index of all placed route and jump geometry.
    pub objects: QuadTree,
}

impl TerrainChunk {
    /// Run the full build pipeline for the chunk at `coords`.
    pub fn build(settings: &Settings, coords: IVec2) -> Result<Self> {
        settings.validate()?;
        let total = Instant::now();
        let resolution = settings.resolution;
        let chunk_seed = chunk_seed(coords, settings.world_seed);

        let edges = [
            ChunkEdge::new(coords, coords + IVec2::new(0, -1), settings.world_seed, resolution, settings.edge_seed_points),
            ChunkEdge::new(coords, coords + IVec2::new(1, 0), settings.world_seed, resolution, settings.edge_seed_points),
            ChunkEdge::new(coords, coords + IVec2::new(0, 1), settings.world_seed, resolution, settings.edge_seed_points),
            ChunkEdge::new(coords, coords + IVec2::new(-1, 0), settings.world_seed, resolution, settings.edge_seed_points),
        ];

        let stage = Instant::now();
        let offset = coords * resolution as i32;
        let mut heights = HeightMap::new(resolution);
        ComposedHeightMap::from_settings(settings).fill(&mut heights, offset);
        let mut moisture = HeightMap::new(resolution);
        ComposedHeightMap::moisture_from_settings(settings).fill(&mut moisture, offset);
        let normals = generate_normals(&heights, settings.depth, settings.cell_size());
        log::debug!("chunk {:?}: fields in {:.1}ms", coords, stage.elapsed().as_secs_f64() * 1e3);

        let stage = Instant::now();
        let mut walkable = WalkableCache::new(&normals, settings.walkable_min_up());
        let connectivity = ConnectivityLabels::compute(&mut walkable);
        log::debug!(
            "chunk {:?}: {} components in {:.1}ms",
            coords,
            connectivity.num_labels(),
            stage.elapsed().as_secs_f64() * 1e3
        );

        let to_world = GridToWorld::new(coords, settings.chunk_size, resolution, settings.depth);
        // Inflate the index region so takeoff footprints just beyond the
        // chunk border remain insertable.
        let margin = settings.street_radius + settings.jump_offset_lateral + 1.0;
        let region = Rect::new(
            to_world.origin,
            to_world.origin + Vec2::splat(settings.chunk_size),
        )
        .inflated(margin);
        let mut objects = QuadTree::new(region);

        let stage = Instant::now();
        let seeds: Vec<IVec2> = edges.iter().flat_map(|e| e.seed_cells()).collect();
        let network = build_network(
            settings,
            &mut heights,
            &mut walkable,
            &connectivity,
            &seeds,
            &to_world,
            &mut objects,
        )?;
        log::debug!(
            "chunk {:?}: {} paths in {:.1}ms",
            coords,
            network.paths.len(),
            stage.elapsed().as_secs_f64() * 1e3
        );

        let stage = Instant::now();
        let jumps = find_jumps(settings, &network.paths, &mut objects)?;
        log::debug!(
            "chunk {:?}: {} jumps in {:.1}ms",
            coords,
            jumps.len(),
            stage.elapsed().as_secs_f64() * 1e3
        );

        let splat = map_terrain(settings, &heights, &moisture, &normals, &objects, &to_world)?;

        log::info!(
            "built chunk {:?}: {} paths, {} jumps, {} components in {:.1}ms",
            coords,
            network.paths.len(),
            jumps.len(),
            connectivity.num_labels(),
            total.elapsed().as_secs_f64() * 1e3
        );

        Ok(Self {
            coords,
            chunk_seed,
            edges,
            heights,
            normals,
            moisture,
            connectivity,
            network,
            jumps,
            splat,
            objects,
        })
    }
}

/// Deterministic per-chunk seed from grid coordinates and the world seed.
pub fn chunk_seed(coords: IVec2, world_seed: u32) -> u32 {
    let mut hash = coords.x;
    hash = coords.y.wrapping_add(hash.wrapping_mul(881));
    (hash.wrapping_mul(2719) as u32).wrapping_add(world_seed)
}

/// Build several chunks in parallel.
///
/// Each build owns its grids, paths and index; `settings` is shared
/// read-only, so no synchronization is needed.
pub fn build_many(settings: &Settings, coords: &[IVec2]) -> Result<Vec<TerrainChunk>> {
    settings.validate()?;
    let start = Instant::now();
    let chunks = coords
        .par_iter()
        .map(|&c| TerrainChunk::build(settings, c))
        .collect::<Result<Vec<_>>>()?;
    log::info!(
        "built {} chunks in {:.1}s",
        chunks.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;

    fn small_settings() -> Settings {
        Settings {
            resolution: 33,
            splat_resolution: 33,
            chunk_size: 66.0,
            // Coarse grids sample the noise at wider steps; a lower depth
            // keeps typical slopes inside the walkable threshold.
            depth: 16.0,
            edge_seed_points: 1,
            jump_stride: 2,
            heuristic_weight: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_produces_consistent_grids() {
        let settings = small_settings();
        let chunk = TerrainChunk::build(&settings, IVec2::new(1, -2)).unwrap();

        assert_eq!(chunk.heights.size(), 33);
        assert_eq!(chunk.normals.size(), 33);
        assert_eq!(chunk.moisture.size(), 33);
        assert_eq!(chunk.splat.resolution(), 33);
        assert_eq!(chunk.splat.layers(), settings.texture_layers);
        for &h in chunk.heights.cells() {
            assert!((0.0..=1.0).contains(&h), "height {} out of range", h);
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let settings = small_settings();
        let a = TerrainChunk::build(&settings, IVec2::new(0, 0)).unwrap();
        let b = TerrainChunk::build(&settings, IVec2::new(0, 0)).unwrap();

        assert_eq!(a.chunk_seed, b.chunk_seed);
        assert_eq!(a.heights.cells(), b.heights.cells());
        assert_eq!(a.network.paths.len(), b.network.paths.len());
        for (pa, pb) in a.network.paths.iter().zip(&b.network.paths) {
            assert_eq!(pa.waypoints, pb.waypoints);
        }
        assert_eq!(a.jumps.len(), b.jumps.len());
    }

    #[test]
    fn test_paths_are_nonempty_and_parallel() {
        let settings = small_settings();
        let chunk = TerrainChunk::build(&settings, IVec2::ZERO).unwrap();
        for path in &chunk.network.paths {
            assert!(!path.is_empty());
            assert_eq!(path.waypoints.len(), path.world_waypoints.len());
        }
        for jump in &chunk.jumps {
            assert!(jump.speed >= settings.min_jump_speed);
            assert!(jump.speed <= settings.max_jump_speed);
        }
    }

    #[test]
    fn test_splat_rows_normalized_after_full_build() {
        let settings = small_settings();
        let chunk = TerrainChunk::build(&settings, IVec2::ZERO).unwrap();
        for y in 0..chunk.splat.resolution() {
            for x in 0..chunk.splat.resolution() {
                let sum: f32 = chunk.splat.weights_at(x, y).iter().sum();
                assert!((sum - 1.0).abs() < 1e-5, "cell ({}, {}) sums to {}", x, y, sum);
            }
        }
    }

    #[test]
    fn test_invalid_settings_fail_before_building() {
        let settings = Settings {
            resolution: 1,
            ..small_settings()
        };
        assert!(matches!(
            TerrainChunk::build(&settings, IVec2::ZERO),
            Err(Error::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_build_many_matches_single_builds() {
        let settings = small_settings();
        let coords = [IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(0, 1)];
        let chunks = build_many(&settings, &coords).unwrap();
        assert_eq!(chunks.len(), 3);
        for (chunk, &c) in chunks.iter().zip(&coords) {
            let single = TerrainChunk::build(&settings, c).unwrap();
            assert_eq!(chunk.coords, c);
            assert_eq!(chunk.heights.cells(), single.heights.cells());
            assert_eq!(chunk.jumps.len(), single.jumps.len());
        }
    }

    #[test]
    fn test_chunk_seed_varies_with_coords_and_world() {
        let a = chunk_seed(IVec2::new(0, 0), 42);
        let b = chunk_seed(IVec2::new(1, 0), 42);
        let c = chunk_seed(IVec2::new(0, 1), 42);
        let d = chunk_seed(IVec2::new(0, 0), 43);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
        assert_ne!(a, d);
    }
}
