//! Deterministic seed metadata for chunk boundaries.

use glam::IVec2;

/// Seed metadata for one of the four boundary edges of a chunk.
///
/// The edge hashes both adjacent chunk coordinates in canonical order with
/// the world seed, so the neighboring chunk derives the exact same seed
/// points and the route networks stay stitchable across the boundary.
#[derive(Clone, Debug)]
pub struct ChunkEdge {
    pub chunk: IVec2,
    pub neighbor: IVec2,
    /// Seed point offsets along the edge, in grid cells.
    pub points: Vec<i32>,
    resolution: usize,
}

impl ChunkEdge {
    /// Generate the edge toward a cardinal `neighbor`.
    pub fn new(
        chunk: IVec2,
        neighbor: IVec2,
        world_seed: u32,
        resolution: usize,
        count: usize,
    ) -> Self {
        let mut state = edge_seed(chunk, neighbor, world_seed).max(1);
        // Keep seed points away from the corners so carved streets do not
        // clip the adjacent edges.
        let margin = (resolution as i32 / 8).max(1);
        let span = (resolution as i32 - 2 * margin).max(1);
        let points = (0..count)
            .map(|_| {
                state = xorshift(state);
                margin + (state % span as u32) as i32
            })
            .collect();
        Self {
            chunk,
            neighbor,
            points,
            resolution,
        }
    }

    /// Grid cells of the seed points on this chunk's side of the edge.
    pub fn seed_cells(&self) -> Vec<IVec2> {
        let last = self.resolution as i32 - 1;
        let delta = self.neighbor - self.chunk;
        self.points
            .iter()
            .map(|&offset| match (delta.x, delta.y) {
                (0, -1) => IVec2::new(offset, 0),
                (1, 0) => IVec2::new(last, offset),
                (0, 1) => IVec2::new(offset, last),
                (-1, 0) => IVec2::new(0, offset),
                _ => unreachable!("edges connect cardinal neighbors only"),
            })
            .collect()
    }
}

/// Order-independent hash of the two chunk coordinates and the world seed.
fn edge_seed(a: IVec2, b: IVec2, world_seed: u32) -> u32 {
    let (lo, hi) = if (a.x, a.y) <= (b.x, b.y) { (a, b) } else { (b, a) };
    let mut h = (lo.x as u32)
        .wrapping_mul(374761393)
        .wrapping_add((lo.y as u32).wrapping_mul(668265263))
        .wrapping_add((hi.x as u32).wrapping_mul(2246822519))
        .wrapping_add((hi.y as u32).wrapping_mul(3266489917))
        .wrapping_add(world_seed.wrapping_mul(1274126177));
    h = (h ^ (h >> 13)).wrapping_mul(1103515245);
    h ^ (h >> 16)
}

fn xorshift(mut state: u32) -> u32 {
    state ^= state << 13;
    state ^= state >> 17;
    state ^= state << 5;
    state
}
