//! Height, moisture and normal field synthesis.

pub mod compose;
pub mod grid;
pub mod normals;
pub mod source;

pub use compose::ComposedHeightMap;
pub use grid::{Grid, GridToWorld, HeightMap, NormalMap};
pub use normals::generate_normals;
pub use source::{HeightSource, NoiseHeightMap, PostProcess};
