//! Error types for the chunk build pipeline

use thiserror::Error;

/// Main error type for the crate.
///
/// Only structural configuration mismatches surface as errors; data-driven
/// failures (no path, no ballistic solution) are reported as absent results.
#[derive(Debug, Error)]
pub enum Error {
    #[error("height sources and weights differ in length: {sources} sources, {weights} weights")]
    SourceWeightMismatch { sources: usize, weights: usize },

    #[error("grid dimension mismatch: expected {expected} cells, got {actual}")]
    GridDimensionMismatch { expected: usize, actual: usize },

    #[error("insertion at ({x}, {y}) lies outside the index extent")]
    OutOfExtent { x: f32, y: f32 },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
