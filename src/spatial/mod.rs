//! Spatial indexing of placed route and jump geometry.

pub mod bounds;
pub mod quadtree;

pub use bounds::{CircleBound, Rect};
pub use quadtree::{Entry, EntryKind, PathHandle, QuadTree};
