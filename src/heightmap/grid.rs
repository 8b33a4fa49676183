//! Dense square grids and grid-to-world coordinate mapping.

use glam::{IVec2, Vec2, Vec3};

/// Dense row-major grid sized `size × size`.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// Create a grid filled with the default value.
    pub fn new(size: usize) -> Self {
        Self::filled(size, T::default())
    }

    /// Create a grid filled with `value`.
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total cell count.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, p: IVec2) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.size && (p.y as usize) < self.size
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.cells[y * self.size + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.cells[y * self.size + x] = value;
    }

    pub fn at(&self, p: IVec2) -> T {
        self.get(p.x as usize, p.y as usize)
    }

    pub fn set_at(&mut self, p: IVec2, value: T) {
        self.set(p.x as usize, p.y as usize, value);
    }

    /// Flat cell index for `(x, y)`.
    pub fn index(&self, p: IVec2) -> usize {
        p.y as usize * self.size + p.x as usize
    }

    /// Inverse of [`Grid::index`].
    pub fn coords(&self, index: usize) -> IVec2 {
        IVec2::new((index % self.size) as i32, (index / self.size) as i32)
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}

/// Scalar height/moisture field with values in [0, 1].
pub type HeightMap = Grid<f32>;

/// Per-cell surface normals.
pub type NormalMap = Grid<Vec3>;

/// Maps grid coordinates of one chunk into world space.
///
/// `world = origin + index * cell_size`; heights in [0,1] scale to [0, depth].
#[derive(Clone, Copy, Debug)]
pub struct GridToWorld {
    pub origin: Vec2,
    pub extent: f32,
    pub cell_size: f32,
    pub depth: f32,
}

impl GridToWorld {
    pub fn new(chunk_coords: IVec2, chunk_size: f32, resolution: usize, depth: f32) -> Self {
        Self {
            origin: chunk_coords.as_vec2() * chunk_size,
            extent: chunk_size,
            cell_size: chunk_size / resolution as f32,
            depth,
        }
    }

    /// Horizontal world position of a grid cell.
    pub fn world_xz(&self, cell: IVec2) -> Vec2 {
        self.origin + cell.as_vec2() * self.cell_size
    }

    /// Horizontal world position of normalized chunk coordinates in [0, 1].
    pub fn world_xz_normalized(&self, x01: f32, y01: f32) -> Vec2 {
        self.origin + Vec2::new(x01, y01) * self.extent
    }

    /// Full world position of a grid cell with normalized height `h`.
    pub fn world_point(&self, cell: IVec2, h: f32) -> Vec3 {
        let xz = self.world_xz(cell);
        Vec3::new(xz.x, h * self.depth, xz.y)
    }
}
