//! Region quad-tree storing typed route/jump geometry.
//!
//! Entries are append-only during a chunk build: they are never mutated or
//! removed once inserted, and queries are read-only. Node splits only
//! redistribute storage; position, payload and insertion sequence are
//! preserved. Both the route builder and the jump finder share one tree
//! per chunk.

use glam::Vec2;

use crate::core::types::Result;
use crate::core::Error;
use crate::spatial::bounds::{CircleBound, Rect};

/// Leaf bucket size before a node splits.
const BUCKET_SIZE: usize = 8;
/// Subdivision limit; buckets may overflow at this depth.
const MAX_DEPTH: u8 = 12;

/// What a stored entry represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// A route waypoint baked into the terrain.
    Street,
    /// A validated jump takeoff.
    Jump,
}

/// Back-reference into the chunk's path or jump lists.
///
/// For street entries: `collection` is the path index, `label` the
/// waypoint index. For jump entries: `label` is the jump index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathHandle {
    pub collection: usize,
    pub label: usize,
}

/// One stored point with its type tag and payload.
#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub position: Vec2,
    pub kind: EntryKind,
    pub payload: PathHandle,
    /// Insertion sequence; resolves equal-distance raycast ties.
    pub seq: u32,
}

struct Node {
    rect: Rect,
    /// Index of the first of four children, `u32::MAX` for leaves.
    first_child: u32,
    depth: u8,
    entries: Vec<Entry>,
}

/// 2D region quad-tree over one chunk's world-space rectangle.
pub struct QuadTree {
    nodes: Vec<Node>,
    next_seq: u32,
    len: usize,
}

impl QuadTree {
    /// Create an empty tree covering `region`.
    pub fn new(region: Rect) -> Self {
        Self {
            nodes: vec![Node {
                rect: region,
                first_child: u32::MAX,
                depth: 0,
                entries: Vec::new(),
            }],
            next_seq: 0,
            len: 0,
        }
    }

    /// Region covered by the tree.
    pub fn region(&self) -> Rect {
        self.nodes[0].rect
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append an entry. Fails only when `position` lies outside the tree
    /// region, which indicates a configuration error.
    pub fn insert(&mut self, position: Vec2, kind: EntryKind, payload: PathHandle) -> Result<()> {
        if !self.nodes[0].rect.contains_point(position) {
            return Err(Error::OutOfExtent {
                x: position.x,
                y: position.y,
            });
        }
        let entry = Entry {
            position,
            kind,
            payload,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.len += 1;

        let mut node = 0usize;
        loop {
            if self.nodes[node].first_child != u32::MAX {
                let quadrant = self.nodes[node].rect.quadrant_of(position);
                node = self.nodes[node].first_child as usize + quadrant as usize;
                continue;
            }
            self.nodes[node].entries.push(entry);
            if self.nodes[node].entries.len() > BUCKET_SIZE && self.nodes[node].depth < MAX_DEPTH {
                self.split(node);
            }
            return Ok(());
        }
    }

    fn split(&mut self, node: usize) {
        let first_child = self.nodes.len() as u32;
        let rect = self.nodes[node].rect;
        let depth = self.nodes[node].depth;
        for quadrant in 0..4u8 {
            self.nodes.push(Node {
                rect: rect.child_quadrant(quadrant),
                first_child: u32::MAX,
                depth: depth + 1,
                entries: Vec::new(),
            });
        }
        let entries = std::mem::take(&mut self.nodes[node].entries);
        self.nodes[node].first_child = first_child;
        for entry in entries {
            let quadrant = rect.quadrant_of(entry.position);
            let child = first_child as usize + quadrant as usize;
            self.nodes[child].entries.push(entry);
        }
    }

    /// True when any stored entry (optionally restricted to `kind`) lies
    /// within the circle.
    pub fn collides_circle(&self, circle: CircleBound, kind: Option<EntryKind>) -> bool {
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            let n = &self.nodes[node];
            if !circle.intersects_rect(&n.rect) {
                continue;
            }
            if n.first_child != u32::MAX {
                for quadrant in 0..4usize {
                    stack.push(n.first_child as usize + quadrant);
                }
                continue;
            }
            for entry in &n.entries {
                if kind.is_some_and(|k| k != entry.kind) {
                    continue;
                }
                if circle.contains(entry.position) {
                    return true;
                }
            }
        }
        false
    }

    /// Nearest entry along the ray segment `[origin, origin + dir * max_dist]`
    /// whose perpendicular distance to the segment is within `tolerance`.
    ///
    /// Entries beyond `max_dist` are never returned; exact distance ties
    /// resolve to the earliest-inserted entry.
    pub fn raycast(
        &self,
        origin: Vec2,
        dir: Vec2,
        max_dist: f32,
        kind: Option<EntryKind>,
        tolerance: f32,
    ) -> Option<Entry> {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO || max_dist <= 0.0 {
            return None;
        }
        let end = origin + dir * max_dist;
        let segment_rect = Rect::new(origin.min(end), origin.max(end)).inflated(tolerance);

        let mut best: Option<(f32, u32, Entry)> = None;
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            let n = &self.nodes[node];
            if !n.rect.intersects(&segment_rect) {
                continue;
            }
            if n.first_child != u32::MAX {
                for quadrant in 0..4usize {
                    stack.push(n.first_child as usize + quadrant);
                }
                continue;
            }
            for entry in &n.entries {
                if kind.is_some_and(|k| k != entry.kind) {
                    continue;
                }
                let to = entry.position - origin;
                let t = to.dot(dir).clamp(0.0, max_dist);
                let dist_sq = (to - dir * t).length_squared();
                if dist_sq > tolerance * tolerance {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some((best_t, best_seq, _)) => {
                        t < *best_t || (t == *best_t && entry.seq < *best_seq)
                    }
                };
                if better {
                    best = Some((t, entry.seq, *entry));
                }
            }
        }
        best.map(|(_, _, entry)| entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> QuadTree {
        QuadTree::new(Rect::new(Vec2::ZERO, Vec2::splat(100.0)))
    }

    fn handle(label: usize) -> PathHandle {
        PathHandle { collection: 0, label }
    }

    #[test]
    fn test_insert_out_of_extent_fails() {
        let mut tree = tree();
        let result = tree.insert(Vec2::new(150.0, 10.0), EntryKind::Street, handle(0));
        assert!(matches!(result, Err(Error::OutOfExtent { .. })));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_split_preserves_entries() {
        let mut tree = tree();
        for i in 0..40 {
            let p = Vec2::new((i % 10) as f32 * 9.0 + 1.0, (i / 10) as f32 * 22.0 + 3.0);
            tree.insert(p, EntryKind::Street, handle(i)).unwrap();
        }
        assert_eq!(tree.len(), 40);
        for i in 0..40 {
            let p = Vec2::new((i % 10) as f32 * 9.0 + 1.0, (i / 10) as f32 * 22.0 + 3.0);
            assert!(tree.collides_circle(CircleBound::new(p, 0.1), None), "lost entry {}", i);
        }
    }

    #[test]
    fn test_collides_circle_respects_kind() {
        let mut tree = tree();
        tree.insert(Vec2::new(50.0, 50.0), EntryKind::Street, handle(0)).unwrap();
        let circle = CircleBound::new(Vec2::new(51.0, 50.0), 2.0);
        assert!(tree.collides_circle(circle, None));
        assert!(tree.collides_circle(circle, Some(EntryKind::Street)));
        assert!(!tree.collides_circle(circle, Some(EntryKind::Jump)));
    }

    #[test]
    fn test_collides_circle_radius_boundary() {
        let mut tree = tree();
        tree.insert(Vec2::new(50.0, 50.0), EntryKind::Street, handle(0)).unwrap();
        assert!(tree.collides_circle(CircleBound::new(Vec2::new(48.0, 50.0), 2.0), None));
        assert!(!tree.collides_circle(CircleBound::new(Vec2::new(47.0, 50.0), 2.0), None));
    }

    #[test]
    fn test_raycast_hits_nearest() {
        let mut tree = tree();
        tree.insert(Vec2::new(30.0, 50.0), EntryKind::Street, handle(0)).unwrap();
        tree.insert(Vec2::new(20.0, 50.0), EntryKind::Street, handle(1)).unwrap();
        let hit = tree
            .raycast(Vec2::new(5.0, 50.0), Vec2::X, 60.0, Some(EntryKind::Street), 0.5)
            .unwrap();
        assert_eq!(hit.payload.label, 1);
    }

    #[test]
    fn test_raycast_never_beyond_max_dist() {
        let mut tree = tree();
        tree.insert(Vec2::new(80.0, 50.0), EntryKind::Street, handle(0)).unwrap();
        assert!(tree.raycast(Vec2::new(5.0, 50.0), Vec2::X, 60.0, None, 0.5).is_none());
        assert!(tree.raycast(Vec2::new(5.0, 50.0), Vec2::X, 80.0, None, 0.5).is_some());
    }

    #[test]
    fn test_raycast_respects_tolerance() {
        let mut tree = tree();
        tree.insert(Vec2::new(40.0, 52.0), EntryKind::Street, handle(0)).unwrap();
        assert!(tree.raycast(Vec2::new(5.0, 50.0), Vec2::X, 60.0, None, 1.0).is_none());
        assert!(tree.raycast(Vec2::new(5.0, 50.0), Vec2::X, 60.0, None, 2.5).is_some());
    }

    #[test]
    fn test_raycast_tie_resolves_to_first_inserted() {
        // Two entries mirrored across the ray project to the same distance.
        let mut tree1 = tree();
        tree1.insert(Vec2::new(40.0, 51.0), EntryKind::Street, handle(7)).unwrap();
        tree1.insert(Vec2::new(40.0, 49.0), EntryKind::Street, handle(8)).unwrap();
        let hit = tree1
            .raycast(Vec2::new(5.0, 50.0), Vec2::X, 60.0, None, 2.0)
            .unwrap();
        assert_eq!(hit.payload.label, 7);

        // Insertion order decides, not position.
        let mut tree2 = tree();
        tree2.insert(Vec2::new(40.0, 49.0), EntryKind::Street, handle(8)).unwrap();
        tree2.insert(Vec2::new(40.0, 51.0), EntryKind::Street, handle(7)).unwrap();
        let hit = tree2
            .raycast(Vec2::new(5.0, 50.0), Vec2::X, 60.0, None, 2.0)
            .unwrap();
        assert_eq!(hit.payload.label, 8);
    }

    #[test]
    fn test_raycast_kind_filter() {
        let mut tree = tree();
        tree.insert(Vec2::new(20.0, 50.0), EntryKind::Jump, handle(0)).unwrap();
        tree.insert(Vec2::new(30.0, 50.0), EntryKind::Street, handle(1)).unwrap();
        let hit = tree
            .raycast(Vec2::new(5.0, 50.0), Vec2::X, 60.0, Some(EntryKind::Street), 0.5)
            .unwrap();
        assert_eq!(hit.payload.label, 1);
    }
}
