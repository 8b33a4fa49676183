//! Per-cell texture-weight labeling from height, moisture and steepness.
//!
//! Route occupancy overrides everything: cells inside a street circle get
//! the dedicated street layer at full weight. All other cells blend the
//! terrain layers by proximity in a quantized (height, moisture,
//! steepness) bin cube.

use glam::Vec3;

use crate::config::Settings;
use crate::core::types::Result;
use crate::core::Error;
use crate::heightmap::grid::{GridToWorld, HeightMap, NormalMap};
use crate::spatial::{CircleBound, EntryKind, QuadTree};

/// Height band inverse-lerped into [0, 1] before quantization.
const HEIGHT_BAND: (f32, f32) = (0.1, 0.9);

/// Texture-weight volume: `resolution × resolution` cells, `layers`
/// weights per cell, each cell summing to one.
pub struct SplatMap {
    resolution: usize,
    layers: usize,
    weights: Vec<f32>,
}

impl SplatMap {
    fn new(resolution: usize, layers: usize) -> Self {
        Self {
            resolution,
            layers,
            weights: vec![0.0; resolution * resolution * layers],
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Index of the dedicated street layer.
    pub fn street_layer(&self) -> usize {
        self.layers - 1
    }

    pub fn weight(&self, x: usize, y: usize, layer: usize) -> f32 {
        self.weights[(y * self.resolution + x) * self.layers + layer]
    }

    pub fn weights_at(&self, x: usize, y: usize) -> &[f32] {
        let base = (y * self.resolution + x) * self.layers;
        &self.weights[base..base + self.layers]
    }

    fn weights_at_mut(&mut self, x: usize, y: usize) -> &mut [f32] {
        let base = (y * self.resolution + x) * self.layers;
        &mut self.weights[base..base + self.layers]
    }
}

/// Label every splat cell of a chunk.
///
/// The three grids must share the configured resolution; a mismatch is a
/// fatal configuration error.
pub fn map_terrain(
    settings: &Settings,
    heights: &HeightMap,
    moisture: &HeightMap,
    normals: &NormalMap,
    index: &QuadTree,
    to_world: &GridToWorld,
) -> Result<SplatMap> {
    let resolution = settings.resolution;
    for actual in [heights.size(), moisture.size(), normals.size()] {
        if actual != resolution {
            return Err(Error::GridDimensionMismatch {
                expected: resolution,
                actual,
            });
        }
    }

    let layers = settings.texture_layers;
    let terrain_layers = layers - 1;
    let street_layer = layers - 1;
    // Bin cube side: c³ bins address the first c³ terrain layers.
    let c = (terrain_layers as f32).cbrt().floor().max(1.0) as usize;
    let bin_centers: Vec<Vec3> = (0..terrain_layers)
        .map(|i| {
            Vec3::new(
                (i % c) as f32 + 0.5,
                ((i / c) % c) as f32 + 0.5,
                (i / (c * c)) as f32 + 0.5,
            )
        })
        .collect();

    let trigger = settings.splat_trigger;
    let mut splat = SplatMap::new(settings.splat_resolution, layers);

    for y in 0..settings.splat_resolution {
        let y01 = y as f32 / (settings.splat_resolution - 1) as f32;
        let y_hm = ((y01 * (resolution - 1) as f32).ceil() as usize).min(resolution - 1);
        for x in 0..settings.splat_resolution {
            let x01 = x as f32 / (settings.splat_resolution - 1) as f32;
            let x_hm = ((x01 * (resolution - 1) as f32).ceil() as usize).min(resolution - 1);

            let world = to_world.world_xz_normalized(x01, y01);
            let street = index.collides_circle(
                CircleBound::new(world, settings.street_radius),
                Some(EntryKind::Street),
            );

            let weights = splat.weights_at_mut(x, y);
            if street {
                weights[street_layer] = 1.0;
            } else {
                let normal = normals.get(x_hm, y_hm);
                let height = inverse_lerp(HEIGHT_BAND.0, HEIGHT_BAND.1, heights.get(x_hm, y_hm));
                let moist = moisture.get(x_hm, y_hm);
                let steepness = 1.0 - normal.y * normal.y;
                let data = Vec3::new(
                    quantize(height, c),
                    quantize(moist, c),
                    quantize(steepness, c),
                );

                for (i, center) in bin_centers.iter().enumerate() {
                    let d = data.distance(*center);
                    if d + settings.splat_mixing > trigger {
                        continue;
                    }
                    let w = (trigger - d) / trigger;
                    // Squared falloff biases toward the nearest bin.
                    weights[i] = w * w;
                }
            }

            let z: f32 = weights.iter().sum();
            if z == 0.0 {
                // No bin within the trigger band; the nearest bin takes
                // everything rather than dividing by zero.
                let nearest = nearest_bin(&bin_centers, heights.get(x_hm, y_hm), moisture.get(x_hm, y_hm), normals.get(x_hm, y_hm), c);
                weights[nearest] = 1.0;
            } else {
                for w in weights.iter_mut() {
                    *w /= z;
                }
            }
        }
    }

    Ok(splat)
}

fn inverse_lerp(lo: f32, hi: f32, v: f32) -> f32 {
    ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Scale a unit value into the bin cube, clamping the top edge inside.
fn quantize(v: f32, c: usize) -> f32 {
    let scaled = v * c as f32;
    if scaled >= c as f32 {
        (c - 1) as f32
    } else {
        scaled
    }
}

fn nearest_bin(bin_centers: &[Vec3], height: f32, moist: f32, normal: Vec3, c: usize) -> usize {
    let height = inverse_lerp(HEIGHT_BAND.0, HEIGHT_BAND.1, height);
    let steepness = 1.0 - normal.y * normal.y;
    let data = Vec3::new(quantize(height, c), quantize(moist, c), quantize(steepness, c));
    let mut nearest = 0;
    let mut nearest_d = f32::INFINITY;
    for (i, center) in bin_centers.iter().enumerate() {
        let d = data.distance_squared(*center);
        if d < nearest_d {
            nearest_d = d;
            nearest = i;
        }
    }
    nearest
}
