//! Slope-weighted A* over the 8-connected grid.
//!
//! The search arena is pre-sized once per chunk build and reused across
//! path queries; a generation stamp resets per-cell state between queries
//! so reuse never changes results.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::IVec2;

use crate::heightmap::grid::{Grid, HeightMap};
use crate::nav::walkable::{neighbors_8, WalkableCache};

/// Octile distance under configured cardinal/diagonal step costs.
pub fn octile_distance(a: IVec2, b: IVec2, cardinal: f32, diagonal: f32) -> f32 {
    let dx = (a.x - b.x).abs() as f32;
    let dy = (a.y - b.y).abs() as f32;
    cardinal * (dx + dy) + (diagonal - 2.0 * cardinal) * dx.min(dy)
}

/// Step cost between adjacent cells: a cardinal/diagonal base plus a
/// weighted height difference, discounted on existing street cells.
pub struct StepCost<'a> {
    pub heights: &'a HeightMap,
    /// Street occupancy by path index, `-1` for free cells.
    pub street: Option<&'a Grid<i32>>,
    pub cardinal: f32,
    pub diagonal: f32,
    pub slope_weight: f32,
    pub road_discount: f32,
}

impl StepCost<'_> {
    pub fn cost(&self, from: IVec2, to: IVec2) -> f32 {
        let base = if from.x != to.x && from.y != to.y {
            self.diagonal
        } else {
            self.cardinal
        };
        let slope = (self.heights.at(to) - self.heights.at(from)).abs() * self.slope_weight;
        let mut cost = base + slope;
        if let Some(street) = self.street {
            if street.at(to) >= 0 {
                cost *= self.road_discount;
            }
        }
        cost
    }

    fn heuristic(&self, from: IVec2, goal: IVec2) -> f32 {
        octile_distance(from, goal, self.cardinal, self.diagonal)
    }
}

#[derive(Clone, Copy, Debug)]
struct OpenNode {
    f: f32,
    index: u32,
}

impl Eq for OpenNode {}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.index == other.index
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert for lowest-f-first. Ties break
        // on the cell index so pop order is deterministic.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const NO_PARENT: u32 = u32::MAX;

/// A* search state sized for one grid and reused across queries.
pub struct AStarSearch {
    heuristic_weight: f32,
    g: Vec<f32>,
    parent: Vec<u32>,
    closed: Vec<bool>,
    stamp: Vec<u32>,
    generation: u32,
    open: BinaryHeap<OpenNode>,
}

impl AStarSearch {
    pub fn new(heuristic_weight: f32) -> Self {
        Self {
            heuristic_weight,
            g: Vec::new(),
            parent: Vec::new(),
            closed: Vec::new(),
            stamp: Vec::new(),
            generation: 0,
            open: BinaryHeap::new(),
        }
    }

    /// Pre-size the arena for `cell_count` cells. Purely a performance
    /// contract; searches auto-size if this is skipped.
    pub fn prepare(&mut self, cell_count: usize) {
        self.g.resize(cell_count, f32::INFINITY);
        self.parent.resize(cell_count, NO_PARENT);
        self.closed.resize(cell_count, false);
        self.stamp.resize(cell_count, 0);
        self.open.reserve(cell_count / 4);
    }

    /// Invalidate all per-cell state from the previous query.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.open.clear();
    }

    /// Release the arena buffers after the last query of a build.
    pub fn clean_up(&mut self) {
        self.g = Vec::new();
        self.parent = Vec::new();
        self.closed = Vec::new();
        self.stamp = Vec::new();
        self.generation = 0;
        self.open = BinaryHeap::new();
    }

    fn touch(&mut self, index: usize) {
        if self.stamp[index] != self.generation {
            self.stamp[index] = self.generation;
            self.g[index] = f32::INFINITY;
            self.parent[index] = NO_PARENT;
            self.closed[index] = false;
        }
    }

    /// Find the cheapest walkable path from `start` to `goal`, inclusive.
    ///
    /// Returns `None` when the goal is unreachable; that is a data
    /// condition, not an error.
    pub fn search(
        &mut self,
        walkable: &mut WalkableCache,
        step_cost: &StepCost,
        start: IVec2,
        goal: IVec2,
    ) -> Option<Vec<IVec2>> {
        let size = walkable.size();
        let cell_count = size * size;
        if self.g.len() < cell_count {
            self.prepare(cell_count);
        }
        self.reset();

        if !walkable.is_walkable(start) || !walkable.is_walkable(goal) {
            return None;
        }

        let grid = step_cost.heights;
        let start_index = grid.index(start);
        self.touch(start_index);
        self.g[start_index] = 0.0;
        self.open.push(OpenNode {
            f: self.heuristic_weight * step_cost.heuristic(start, goal),
            index: start_index as u32,
        });

        while let Some(node) = self.open.pop() {
            let index = node.index as usize;
            self.touch(index);
            if self.closed[index] {
                continue;
            }
            self.closed[index] = true;

            let cell = grid.coords(index);
            if cell == goal {
                return Some(self.reconstruct(grid, index));
            }

            for neighbor in neighbors_8(cell, size) {
                if !walkable.is_walkable(neighbor) {
                    continue;
                }
                let neighbor_index = grid.index(neighbor);
                self.touch(neighbor_index);
                if self.closed[neighbor_index] {
                    continue;
                }
                let tentative = self.g[index] + step_cost.cost(cell, neighbor);
                if tentative < self.g[neighbor_index] {
                    self.g[neighbor_index] = tentative;
                    self.parent[neighbor_index] = index as u32;
                    self.open.push(OpenNode {
                        f: tentative + self.heuristic_weight * step_cost.heuristic(neighbor, goal),
                        index: neighbor_index as u32,
                    });
                }
            }
        }
        None
    }

    fn reconstruct(&self, grid: &HeightMap, goal_index: usize) -> Vec<IVec2> {
        let mut cells = Vec::new();
        let mut index = goal_index;
        loop {
            cells.push(grid.coords(index));
            match self.parent[index] {
                NO_PARENT => break,
                parent => index = parent as usize,
            }
        }
        cells.reverse();
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use crate::heightmap::grid::NormalMap;

    fn flat_heights(size: usize) -> HeightMap {
        HeightMap::new(size)
    }

    fn walkable_mask(size: usize, blocked: &[(i32, i32)]) -> NormalMap {
        let mut normals = NormalMap::filled(size, Vec3::Y);
        for &(x, y) in blocked {
            normals.set(x as usize, y as usize, Vec3::X);
        }
        normals
    }

    fn step_cost(heights: &HeightMap) -> StepCost<'_> {
        StepCost {
            heights,
            street: None,
            cardinal: 10.0,
            diagonal: 14.0,
            slope_weight: 0.0,
            road_discount: 1.0,
        }
    }

    fn path_cost(path: &[IVec2], cost: &StepCost) -> f32 {
        path.windows(2).map(|w| cost.cost(w[0], w[1])).sum()
    }

    #[test]
    fn test_straight_line_on_open_grid() {
        let heights = flat_heights(8);
        let normals = walkable_mask(8, &[]);
        let mut walkable = WalkableCache::new(&normals, 0.5);
        let mut search = AStarSearch::new(1.0);
        search.prepare(64);

        let path = search
            .search(&mut walkable, &step_cost(&heights), IVec2::new(0, 3), IVec2::new(7, 3))
            .unwrap();
        assert_eq!(path.first(), Some(&IVec2::new(0, 3)));
        assert_eq!(path.last(), Some(&IVec2::new(7, 3)));
        assert_eq!(path.len(), 8);
    }

    #[test]
    fn test_no_path_through_wall() {
        let heights = flat_heights(6);
        let blocked: Vec<(i32, i32)> = (0..6).map(|y| (3, y)).collect();
        let normals = walkable_mask(6, &blocked);
        let mut walkable = WalkableCache::new(&normals, 0.5);
        let mut search = AStarSearch::new(1.0);

        let path = search.search(
            &mut walkable,
            &step_cost(&heights),
            IVec2::new(0, 2),
            IVec2::new(5, 2),
        );
        assert!(path.is_none());
    }

    #[test]
    fn test_admissible_heuristic_matches_exhaustive_search() {
        // Exhaustive DFS over all simple paths on a small grid; the A*
        // result must never cost more than any of them.
        fn exhaustive_best(
            cost: &StepCost,
            walkable_cells: &dyn Fn(IVec2) -> bool,
            size: usize,
            current: IVec2,
            goal: IVec2,
            visited: &mut Vec<IVec2>,
            so_far: f32,
            best: &mut f32,
        ) {
            if so_far >= *best {
                return;
            }
            if current == goal {
                *best = so_far;
                return;
            }
            for n in neighbors_8(current, size) {
                if !walkable_cells(n) || visited.contains(&n) {
                    continue;
                }
                visited.push(n);
                exhaustive_best(
                    cost,
                    walkable_cells,
                    size,
                    n,
                    goal,
                    visited,
                    so_far + cost.cost(current, n),
                    best,
                );
                visited.pop();
            }
        }

        let size = 5;
        let mut heights = flat_heights(size);
        for y in 0..size {
            for x in 0..size {
                heights.set(x, y, ((x * 3 + y * 5) % 7) as f32 * 0.1);
            }
        }
        let blocked = [(2, 1), (2, 2)];
        let normals = walkable_mask(size, &blocked);
        let cost = StepCost {
            heights: &heights,
            street: None,
            cardinal: 10.0,
            diagonal: 14.0,
            slope_weight: 50.0,
            road_discount: 1.0,
        };

        let mut walkable = WalkableCache::new(&normals, 0.5);
        let mut search = AStarSearch::new(1.0);
        let start = IVec2::new(0, 0);
        let goal = IVec2::new(4, 3);
        let path = search.search(&mut walkable, &cost, start, goal).unwrap();
        let astar_cost = path_cost(&path, &cost);

        // Seed the bound with the A* cost: the DFS then only explores
        // prefixes that could still beat it, and `best` drops below the
        // seed iff some path is strictly cheaper.
        let is_walkable = |p: IVec2| !blocked.contains(&(p.x, p.y));
        let mut best = astar_cost;
        let mut visited = vec![start];
        exhaustive_best(&cost, &is_walkable, size, start, goal, &mut visited, 0.0, &mut best);

        assert!(
            astar_cost <= best + 1e-4,
            "A* cost {} exceeds exhaustive best {}",
            astar_cost,
            best
        );
    }

    #[test]
    fn test_arena_reuse_matches_fresh_search() {
        let size = 7;
        let mut heights = flat_heights(size);
        for y in 0..size {
            for x in 0..size {
                heights.set(x, y, ((x + 2 * y) % 4) as f32 * 0.15);
            }
        }
        let normals = walkable_mask(size, &[(3, 3), (3, 4)]);
        let cost = StepCost {
            heights: &heights,
            street: None,
            cardinal: 10.0,
            diagonal: 14.0,
            slope_weight: 100.0,
            road_discount: 1.0,
        };

        let queries = [
            (IVec2::new(0, 0), IVec2::new(6, 6)),
            (IVec2::new(6, 0), IVec2::new(0, 6)),
            (IVec2::new(1, 5), IVec2::new(5, 1)),
        ];

        let mut walkable = WalkableCache::new(&normals, 0.5);
        let mut reused = AStarSearch::new(1.0);
        reused.prepare(size * size);
        let reused_paths: Vec<_> = queries
            .iter()
            .map(|&(s, g)| reused.search(&mut walkable, &cost, s, g))
            .collect();

        for (i, &(s, g)) in queries.iter().enumerate() {
            let mut fresh = AStarSearch::new(1.0);
            let mut fresh_walkable = WalkableCache::new(&normals, 0.5);
            let fresh_path = fresh.search(&mut fresh_walkable, &cost, s, g);
            assert_eq!(reused_paths[i], fresh_path, "query {} diverged after reuse", i);
        }
    }

    #[test]
    fn test_road_discount_prefers_street_cells() {
        let size = 7;
        let heights = flat_heights(size);
        // A street runs along y == 4; the discounted route through it
        // must beat the direct diagonal when the discount is strong.
        let mut street = Grid::filled(size, -1i32);
        for x in 0..size {
            street.set(x, 4, 0);
        }
        let cost = StepCost {
            heights: &heights,
            street: Some(&street),
            cardinal: 10.0,
            diagonal: 14.0,
            slope_weight: 0.0,
            road_discount: 0.1,
        };
        let normals = walkable_mask(size, &[]);
        let mut walkable = WalkableCache::new(&normals, 0.5);
        let mut search = AStarSearch::new(1.0);

        let path = search
            .search(&mut walkable, &cost, IVec2::new(0, 4), IVec2::new(6, 4))
            .unwrap();
        // Stays on the street row end to end.
        assert!(path.iter().all(|p| p.y == 4), "path left the street: {:?}", path);
    }
}
