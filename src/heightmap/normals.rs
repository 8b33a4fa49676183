//! Surface normals derived from a height grid.

use glam::Vec3;

use crate::heightmap::grid::{HeightMap, NormalMap};

/// Generate per-cell normals via central differences.
///
/// Heights in [0, 1] are scaled by `depth` into world units; `cell_size`
/// is the world-space grid spacing. Border cells fall back to one-sided
/// differences.
pub fn generate_normals(heights: &HeightMap, depth: f32, cell_size: f32) -> NormalMap {
    let size = heights.size();
    let mut normals = NormalMap::new(size);
    for y in 0..size {
        for x in 0..size {
            let (x0, x1) = neighbor_span(x, size);
            let (y0, y1) = neighbor_span(y, size);
            let dx = (heights.get(x1, y) - heights.get(x0, y)) * depth
                / ((x1 - x0) as f32 * cell_size);
            let dy = (heights.get(x, y1) - heights.get(x, y0)) * depth
                / ((y1 - y0) as f32 * cell_size);
            normals.set(x, y, Vec3::new(-dx, 1.0, -dy).normalize());
        }
    }
    normals
}

fn neighbor_span(i: usize, size: usize) -> (usize, usize) {
    (i.saturating_sub(1), (i + 1).min(size - 1))
}
