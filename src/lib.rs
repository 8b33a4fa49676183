//! Ridgeline - procedural terrain chunk synthesis.
//!
//! Builds traversable terrain chunks from deterministic inputs: composed
//! noise height fields, walkability and connectivity labeling, an A*-built
//! route network, a quad-tree spatial index, ballistic jump discovery and
//! per-cell texture weights. See [`chunk::TerrainChunk::build`].

pub mod chunk;
pub mod config;
pub mod core;
pub mod heightmap;
pub mod jump;
pub mod label;
pub mod nav;
pub mod spatial;
