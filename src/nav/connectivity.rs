//! Connected-component labeling of walkable cells.

use glam::IVec2;

use crate::heightmap::grid::Grid;
use crate::nav::walkable::{neighbors_8, WalkableCache};

/// Component label per cell: `-1` for unwalkable cells, otherwise a label
/// in `0..num_labels`. Two cells share a label iff an 8-neighbor chain of
/// walkable cells connects them.
pub struct ConnectivityLabels {
    labels: Grid<i32>,
    num_labels: usize,
}

impl ConnectivityLabels {
    /// Label all components with an iterative flood fill.
    pub fn compute(walkable: &mut WalkableCache) -> Self {
        let size = walkable.size();
        let mut labels = Grid::filled(size, -1i32);
        let mut num_labels = 0usize;
        // Explicit stack keeps the fill depth bounded on large components.
        let mut stack: Vec<IVec2> = Vec::new();

        for y in 0..size as i32 {
            for x in 0..size as i32 {
                let seed = IVec2::new(x, y);
                if labels.at(seed) != -1 || !walkable.is_walkable(seed) {
                    continue;
                }
                let label = num_labels as i32;
                num_labels += 1;
                labels.set_at(seed, label);
                stack.push(seed);
                while let Some(cell) = stack.pop() {
                    for n in neighbors_8(cell, size) {
                        if labels.at(n) == -1 && walkable.is_walkable(n) {
                            labels.set_at(n, label);
                            stack.push(n);
                        }
                    }
                }
            }
        }

        Self { labels, num_labels }
    }

    pub fn label(&self, p: IVec2) -> i32 {
        self.labels.at(p)
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    pub fn labels(&self) -> &Grid<i32> {
        &self.labels
    }

    /// True when both cells are walkable and share a component.
    pub fn same_component(&self, a: IVec2, b: IVec2) -> bool {
        let la = self.labels.at(a);
        la != -1 && la == self.labels.at(b)
    }
}
