//! Weighted composition of height sources into a grid.

use glam::{IVec2, Vec2};

use crate::config::Settings;
use crate::core::types::Result;
use crate::core::Error;
use crate::heightmap::grid::HeightMap;
use crate::heightmap::source::{apply_chain, HeightSource, NoiseHeightMap, PostProcess};

/// Sums weighted height sources, each with its own post-processing chain.
///
/// The weight applies to the raw sample; a source's chain runs on the
/// weighted value, and the optional composition chain runs on the sum.
pub struct ComposedHeightMap {
    sources: Vec<Box<dyn HeightSource>>,
    weights: Vec<f32>,
    chains: Vec<Vec<PostProcess>>,
    post: Vec<PostProcess>,
}

impl ComposedHeightMap {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            weights: Vec::new(),
            chains: Vec::new(),
            post: Vec::new(),
        }
    }

    /// Build the composed height field described by `settings.height_layers`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut composed = Self::new();
        for layer in &settings.height_layers {
            composed.add_source(
                Box::new(NoiseHeightMap::new(layer, settings.world_seed)),
                layer.weight,
                layer.post.clone(),
            );
        }
        composed.post = settings.height_post.clone();
        composed
    }

    /// Build the moisture field from its single configured layer.
    pub fn moisture_from_settings(settings: &Settings) -> Self {
        let layer = &settings.moisture_layer;
        let mut composed = Self::new();
        composed.add_source(
            Box::new(NoiseHeightMap::new(layer, settings.world_seed)),
            layer.weight,
            layer.post.clone(),
        );
        composed
    }

    /// Assemble from parallel source/weight lists.
    ///
    /// Mismatched lengths are a programming error, reported immediately.
    pub fn from_parts(sources: Vec<Box<dyn HeightSource>>, weights: Vec<f32>) -> Result<Self> {
        if sources.len() != weights.len() {
            return Err(Error::SourceWeightMismatch {
                sources: sources.len(),
                weights: weights.len(),
            });
        }
        let chains = vec![Vec::new(); sources.len()];
        Ok(Self {
            sources,
            weights,
            chains,
            post: Vec::new(),
        })
    }

    pub fn add_source(&mut self, source: Box<dyn HeightSource>, weight: f32, chain: Vec<PostProcess>) {
        self.sources.push(source);
        self.weights.push(weight);
        self.chains.push(chain);
    }

    pub fn set_post(&mut self, post: Vec<PostProcess>) {
        self.post = post;
    }

    /// Composed sample at a normalized position.
    pub fn sample(&self, pos: Vec2) -> f32 {
        let mut value = 0.0;
        for i in 0..self.sources.len() {
            let weighted = self.weights[i] * self.sources[i].sample(pos);
            value += apply_chain(&self.chains[i], weighted);
        }
        apply_chain(&self.post, value)
    }

    /// Fill `grid` by scanning normalized coordinates offset by
    /// `offset` grid cells, stepping `1 / (resolution - 1)` per cell.
    pub fn fill(&self, grid: &mut HeightMap, offset: IVec2) {
        let resolution = grid.size();
        let step = 1.0 / (resolution - 1) as f32;
        let mut y_pos = offset.y as f32 * step;
        for y in 0..resolution {
            let mut x_pos = offset.x as f32 * step;
            for x in 0..resolution {
                grid.set(x, y, self.sample(Vec2::new(x_pos, y_pos)));
                x_pos += step;
            }
            y_pos += step;
        }
    }
}

impl Default for ComposedHeightMap {
    fn default() -> Self {
        Self::new()
    }
}
