//! Noise-backed height sources and scalar post-processing.

use glam::Vec2;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::config::NoiseLayer;

/// A scalar field sampled in normalized chunk coordinates.
pub trait HeightSource {
    /// Sample the raw field value in [0, 1] at `pos`.
    fn sample(&self, pos: Vec2) -> f32;
}

/// Pure scalar transform applied to weighted height samples.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostProcess {
    /// Raise the sample to a power, steepening low values.
    Exponent { exponent: f32 },
    /// Linearly map [0, 1] onto [min, max].
    Rescale { min: f32, max: f32 },
    /// Pull samples toward multiples of `step`; `strength` in [0, 1].
    Terrace { step: f32, strength: f32 },
}

impl PostProcess {
    pub fn apply(&self, value: f32) -> f32 {
        match *self {
            PostProcess::Exponent { exponent } => value.max(0.0).powf(exponent),
            PostProcess::Rescale { min, max } => min + value * (max - min),
            PostProcess::Terrace { step, strength } => {
                let snapped = (value / step).round() * step;
                value + (snapped - value) * strength
            }
        }
    }
}

/// Apply a transform chain in order.
pub fn apply_chain(chain: &[PostProcess], value: f32) -> f32 {
    chain.iter().fold(value, |v, p| p.apply(v))
}

/// Fractal height source (FBM over Perlin), one per configured layer.
pub struct NoiseHeightMap {
    noise: Fbm<Perlin>,
    frequency: f32,
}

impl NoiseHeightMap {
    /// Create a source for `layer`, decorrelated from the world seed.
    pub fn new(layer: &NoiseLayer, world_seed: u32) -> Self {
        let noise = Fbm::<Perlin>::new(world_seed.wrapping_add(layer.seed_offset))
            .set_octaves(layer.octaves as usize)
            .set_persistence(layer.persistence as f64)
            .set_lacunarity(layer.lacunarity as f64);
        Self {
            noise,
            frequency: layer.frequency,
        }
    }
}

impl HeightSource for NoiseHeightMap {
    fn sample(&self, pos: Vec2) -> f32 {
        let nx = (pos.x * self.frequency) as f64;
        let ny = (pos.y * self.frequency) as f64;
        // FBM output is in [-1, 1]; heights live in [0, 1].
        let raw = self.noise.get([nx, ny]) as f32;
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}
