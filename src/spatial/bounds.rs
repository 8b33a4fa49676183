//! 2D bounding volumes for spatial index queries.

use glam::Vec2;

/// Axis-aligned rectangle defined by min and max corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extent(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn inflated(&self, amount: f32) -> Rect {
        Rect {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    /// Squared distance from `p` to the closest point of the rectangle.
    pub fn dist_sq_to_point(&self, p: Vec2) -> f32 {
        let clamped = p.clamp(self.min, self.max);
        clamped.distance_squared(p)
    }

    /// Child quadrant for quad-tree subdivision.
    /// index: 0-3 representing xy quadrant (bit 0 = x, bit 1 = y).
    pub fn child_quadrant(&self, index: u8) -> Rect {
        let center = self.center();
        let half = self.size() * 0.25;
        let offset = Vec2::new(
            if index & 1 != 0 { half.x } else { -half.x },
            if index & 2 != 0 { half.y } else { -half.y },
        );
        Rect::from_center_half_extent(center + offset, half)
    }

    /// Quadrant index of `p` relative to the rectangle center.
    pub fn quadrant_of(&self, p: Vec2) -> u8 {
        let center = self.center();
        (p.x >= center.x) as u8 | (((p.y >= center.y) as u8) << 1)
    }
}

/// Circle used for occupancy and footprint tests.
#[derive(Clone, Copy, Debug)]
pub struct CircleBound {
    pub center: Vec2,
    pub radius: f32,
}

impl CircleBound {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.center.distance_squared(p) <= self.radius * self.radius
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        rect.dist_sq_to_point(self.center) <= self.radius * self.radius
    }
}
