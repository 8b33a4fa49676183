//! Slope-threshold walkability with per-cell memoization.

use glam::IVec2;

use crate::heightmap::grid::NormalMap;

const UNKNOWN: u8 = 0;
const WALKABLE: u8 = 1;
const BLOCKED: u8 = 2;

/// Memoized predicate: a cell is walkable iff its surface normal's up
/// component reaches `min_up` (the cosine of the slope threshold).
///
/// The cache lives for one chunk build; a rebuild starts from a fresh one.
/// Callers must pass in-bounds coordinates; bounds are enforced by the
/// neighbor enumeration, not here.
pub struct WalkableCache<'a> {
    normals: &'a NormalMap,
    min_up: f32,
    cache: Vec<u8>,
}

impl<'a> WalkableCache<'a> {
    pub fn new(normals: &'a NormalMap, min_up: f32) -> Self {
        Self {
            normals,
            min_up,
            cache: vec![UNKNOWN; normals.len()],
        }
    }

    pub fn size(&self) -> usize {
        self.normals.size()
    }

    pub fn is_walkable(&mut self, p: IVec2) -> bool {
        debug_assert!(self.normals.in_bounds(p));
        let index = self.normals.index(p);
        match self.cache[index] {
            WALKABLE => true,
            BLOCKED => false,
            _ => {
                let walkable = self.normals.at(p).y >= self.min_up;
                self.cache[index] = if walkable { WALKABLE } else { BLOCKED };
                walkable
            }
        }
    }
}

/// In-bounds 8-neighborhood of a cell, in fixed scan order.
pub fn neighbors_8(p: IVec2, size: usize) -> impl Iterator<Item = IVec2> {
    const OFFSETS: [IVec2; 8] = [
        IVec2::new(-1, -1),
        IVec2::new(0, -1),
        IVec2::new(1, -1),
        IVec2::new(-1, 0),
        IVec2::new(1, 0),
        IVec2::new(-1, 1),
        IVec2::new(0, 1),
        IVec2::new(1, 1),
    ];
    let size = size as i32;
    OFFSETS.into_iter().map(move |o| p + o).filter(move |n| {
        n.x >= 0 && n.y >= 0 && n.x < size && n.y < size
    })
}
