//! Dense aggregate grids.
//!
//! A [`Grid`] holds one `f32` per pixel (scalar grids) or one `f32` per pixel
//! per category (categorical grids). Cells are stored row-major with the
//! category axis innermost, so cell `[y][x][k]` lives at
//! `(y * width + x) * depth + k`.

use crate::error::{Error, Result};
use trueno::Vector;

/// Dense per-pixel (optionally per-category) accumulator array.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    depth: usize,
    categorical: bool,
    cells: Vec<f32>,
}

impl Grid {
    /// Create a zero-filled scalar grid of shape `(height, width)`.
    #[must_use]
    pub fn scalar(width: usize, height: usize) -> Self {
        Self::filled(width, height, 1, false, 0.0)
    }

    /// Create a zero-filled categorical grid of shape `(height, width, depth)`.
    #[must_use]
    pub fn categorical(width: usize, height: usize, depth: usize) -> Self {
        Self::filled(width, height, depth, true, 0.0)
    }

    fn filled(width: usize, height: usize, depth: usize, categorical: bool, value: f32) -> Self {
        Self {
            width,
            height,
            depth,
            categorical,
            cells: vec![value; width * height * depth],
        }
    }

    /// Build a scalar grid from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `values.len() != width * height`.
    pub fn from_rows(width: usize, height: usize, values: Vec<f32>) -> Result<Self> {
        Self::from_cells(width, height, 1, false, values)
    }

    /// Build a categorical grid from `[y][x][k]`-ordered values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `values.len() != width * height * depth`.
    pub fn from_planes_interleaved(
        width: usize,
        height: usize,
        depth: usize,
        values: Vec<f32>,
    ) -> Result<Self> {
        Self::from_cells(width, height, depth, true, values)
    }

    /// Build a categorical grid from one scalar grid per category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] for no planes and [`Error::ShapeMismatch`]
    /// if the planes differ in size.
    pub fn from_planes(planes: &[Grid]) -> Result<Self> {
        let first = planes.first().ok_or(Error::EmptyData)?;
        let (width, height) = (first.width, first.height);
        let mut out = Self::categorical(width, height, planes.len());
        for (k, plane) in planes.iter().enumerate() {
            if plane.width != width || plane.height != height || plane.depth != 1 {
                return Err(Error::ShapeMismatch {
                    expected: (height, width, 1),
                    found: plane.shape(),
                });
            }
            for (i, v) in plane.cells.iter().enumerate() {
                out.cells[i * out.depth + k] = *v;
            }
        }
        Ok(out)
    }

    fn from_cells(
        width: usize,
        height: usize,
        depth: usize,
        categorical: bool,
        cells: Vec<f32>,
    ) -> Result<Self> {
        if cells.len() != width * height * depth {
            return Err(Error::ShapeMismatch {
                expected: (height, width, depth),
                found: (cells.len(), 1, 1),
            });
        }
        Ok(Self {
            width,
            height,
            depth,
            categorical,
            cells,
        })
    }

    /// A zero-filled grid with the same shape and rank as `self`.
    #[must_use]
    pub fn zeros_like(&self) -> Self {
        Self::filled(self.width, self.height, self.depth, self.categorical, 0.0)
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of categories (1 for scalar grids).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the grid carries a category axis.
    #[must_use]
    pub const fn is_categorical(&self) -> bool {
        self.categorical
    }

    /// Shape as `(height, width, depth)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.depth)
    }

    /// Raw cell storage in `[y][x][k]` order.
    #[must_use]
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Mutable raw cell storage.
    pub fn cells_mut(&mut self) -> &mut [f32] {
        &mut self.cells
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.depth
    }

    /// Value at `(x, y)` of a scalar grid (category 0 of a categorical one).
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.cells[self.offset(x, y)]
    }

    /// Value of category `k` at `(x, y)`.
    #[must_use]
    pub fn get_category(&self, x: usize, y: usize, k: usize) -> f32 {
        self.cells[self.offset(x, y) + k]
    }

    /// Set the value at `(x, y)` (category 0).
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let i = self.offset(x, y);
        self.cells[i] = value;
    }

    /// Set category `k` at `(x, y)`.
    pub fn set_category(&mut self, x: usize, y: usize, k: usize, value: f32) {
        let i = self.offset(x, y) + k;
        self.cells[i] = value;
    }

    /// All category values at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> &[f32] {
        let i = self.offset(x, y);
        &self.cells[i..i + self.depth]
    }

    /// Mutable category values at `(x, y)`.
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [f32] {
        let i = self.offset(x, y);
        let depth = self.depth;
        &mut self.cells[i..i + depth]
    }

    /// Iterate over pixels in row-major order, yielding each pixel's category values.
    pub fn pixels(&self) -> impl Iterator<Item = &[f32]> {
        self.cells.chunks_exact(self.depth.max(1))
    }

    /// Extract category plane `k` as a scalar grid.
    #[must_use]
    pub fn plane(&self, k: usize) -> Grid {
        let cells = self.pixels().map(|p| p[k]).collect();
        Self {
            width: self.width,
            height: self.height,
            depth: 1,
            categorical: false,
            cells,
        }
    }

    /// Apply `f` to every cell, preserving shape.
    #[must_use]
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Grid {
        Self {
            cells: self.cells.iter().map(|&v| f(v)).collect(),
            ..self.shape_only()
        }
    }

    fn shape_only(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            depth: self.depth,
            categorical: self.categorical,
            cells: Vec::new(),
        }
    }

    /// Element-wise `self += other` using trueno SIMD addition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the grids differ in shape.
    pub fn add_assign(&mut self, other: &Grid) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }

        let lhs = Vector::from_slice(&self.cells);
        let rhs = Vector::from_slice(&other.cells);
        if let Ok(sum) = lhs.add(&rhs) {
            self.cells.copy_from_slice(sum.as_slice());
        } else {
            for (dst, src) in self.cells.iter_mut().zip(&other.cells) {
                *dst += *src;
            }
        }
        Ok(())
    }

    /// `(min, max)` over all cells, or `None` for an empty grid.
    #[must_use]
    pub fn value_range(&self) -> Option<(f32, f32)> {
        if self.cells.is_empty() {
            return None;
        }
        let vec = Vector::from_slice(&self.cells);
        match (vec.min(), vec.max()) {
            (Ok(min), Ok(max)) => Some((min, max)),
            _ => Some(self.cells.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })),
        }
    }

    /// Sum across the category axis at each pixel.
    #[must_use]
    pub fn pixel_totals(&self) -> Grid {
        Self {
            width: self.width,
            height: self.height,
            depth: 1,
            categorical: false,
            cells: self.pixels().map(|p| p.iter().sum()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_allocation() {
        let g = Grid::scalar(10, 5);
        assert_eq!(g.shape(), (5, 10, 1));
        assert!(!g.is_categorical());
        assert!(g.cells().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_categorical_allocation() {
        let g = Grid::categorical(6, 3, 7);
        assert_eq!(g.shape(), (3, 6, 7));
        assert!(g.is_categorical());
        assert_eq!(g.cells().len(), 6 * 3 * 7);
    }

    #[test]
    fn test_get_set_category() {
        let mut g = Grid::categorical(3, 4, 2);
        g.set_category(2, 1, 1, 5.0);
        assert_eq!(g.get_category(2, 1, 1), 5.0);
        assert_eq!(g.get_category(2, 1, 0), 0.0);
        assert_eq!(g.pixel(2, 1), &[0.0, 5.0]);
    }

    #[test]
    fn test_plane_and_from_planes() {
        let ones = Grid::from_rows(2, 2, vec![1.0; 4]).unwrap();
        let twos = Grid::from_rows(2, 2, vec![2.0; 4]).unwrap();
        let cats = Grid::from_planes(&[ones.clone(), twos.clone()]).unwrap();
        assert_eq!(cats.depth(), 2);
        assert_eq!(cats.plane(0), ones);
        assert_eq!(cats.plane(1), twos);
    }

    #[test]
    fn test_from_rows_length_checked() {
        assert!(matches!(
            Grid::from_rows(3, 3, vec![0.0; 8]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_add_assign() {
        let mut a = Grid::from_rows(2, 1, vec![1.0, 2.0]).unwrap();
        let b = Grid::from_rows(2, 1, vec![10.0, 20.0]).unwrap();
        a.add_assign(&b).unwrap();
        assert_eq!(a.cells(), &[11.0, 22.0]);
    }

    #[test]
    fn test_add_assign_shape_mismatch() {
        let mut a = Grid::categorical(2, 2, 3);
        let b = Grid::categorical(2, 2, 2);
        assert!(matches!(a.add_assign(&b), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_value_range() {
        let g = Grid::from_rows(3, 1, vec![4.0, -1.0, 9.0]).unwrap();
        assert_eq!(g.value_range(), Some((-1.0, 9.0)));
        assert_eq!(Grid::scalar(0, 0).value_range(), None);
    }

    #[test]
    fn test_pixel_totals() {
        let g = Grid::from_planes_interleaved(2, 1, 3, vec![1.0, 2.0, 3.0, 0.0, 0.0, 4.0]).unwrap();
        assert_eq!(g.pixel_totals().cells(), &[6.0, 4.0]);
    }

    #[test]
    fn test_map_preserves_shape() {
        let g = Grid::categorical(2, 3, 2).map(|v| v + 1.0);
        assert_eq!(g.shape(), (3, 2, 2));
        assert!(g.is_categorical());
        assert!(g.cells().iter().all(|&v| v == 1.0));
    }
}
