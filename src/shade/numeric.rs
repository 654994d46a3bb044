//! Numeric shaders over scalar and categorical grids.

use super::{cell_shader, grid_shader, require_scalar, CellShader, GridShader};
use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::grid::Grid;

/// Round every cell down.
#[derive(Debug, Clone, Copy, Default)]
pub struct Floor;

impl GridShader for Floor {
    fn shade_grid(&self, grid: &Grid) -> Result<Grid> {
        Ok(grid.map(f32::floor))
    }
}

/// Raise every cell to a fixed power.
#[derive(Debug, Clone, Copy)]
pub struct Power {
    exponent: f32,
}

impl Power {
    /// Create a power shader.
    #[must_use]
    pub const fn new(exponent: f32) -> Self {
        Self { exponent }
    }
}

impl GridShader for Power {
    fn shade_grid(&self, grid: &Grid) -> Result<Grid> {
        let n = self.exponent;
        Ok(grid.map(|v| v.powf(n)))
    }
}

/// Real cube root of every cell (defined for negative values).
#[derive(Debug, Clone, Copy, Default)]
pub struct Cuberoot;

impl GridShader for Cuberoot {
    fn shade_grid(&self, grid: &Grid) -> Result<Grid> {
        Ok(grid.map(f32::cbrt))
    }
}

/// Square root of every cell; negative cells become NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqrt;

impl GridShader for Sqrt {
    fn shade_grid(&self, grid: &Grid) -> Result<Grid> {
        Ok(grid.map(f32::sqrt))
    }
}

/// Two-color threshold: `low` below `threshold`, `high` at or above it.
///
/// Scalar grids only.
#[derive(Debug, Clone, Copy)]
pub struct BinarySegment {
    low: Rgba,
    high: Rgba,
    threshold: f32,
}

impl BinarySegment {
    /// Create a threshold shader.
    #[must_use]
    pub const fn new(low: Rgba, high: Rgba, threshold: f32) -> Self {
        Self { low, high, threshold }
    }
}

impl CellShader for BinarySegment {
    fn shade_cell(&self, pixel: &[f32]) -> Rgba {
        if pixel[0] < self.threshold {
            self.low
        } else {
            self.high
        }
    }

    fn shade_image(&self, grid: &Grid) -> Result<Framebuffer> {
        require_scalar(grid, "BinarySegment")?;
        Framebuffer::from_fn(grid.width(), grid.height(), |x, y| self.shade_cell(&[grid.get(x, y)]))
    }
}

/// Linearly rescale the grid's `[min, max]` onto `[low, high]`.
///
/// A constant grid maps entirely to `low`.
#[derive(Debug, Clone, Copy)]
pub struct Interpolate {
    low: f32,
    high: f32,
}

impl Interpolate {
    /// Create a rescaling shader.
    #[must_use]
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }
}

impl GridShader for Interpolate {
    fn shade_grid(&self, grid: &Grid) -> Result<Grid> {
        let Some((min, max)) = grid.value_range() else {
            return Ok(grid.clone());
        };
        let span = max - min;
        let (low, high) = (self.low, self.high);
        if span == 0.0 {
            return Ok(grid.map(|_| low));
        }
        Ok(grid.map(|v| low + (v - min) / span * (high - low)))
    }
}

/// Map a scalar grid's `[min, max]` onto a color ramp, each channel independently.
#[derive(Debug, Clone, Copy)]
pub struct InterpolateColors {
    low: Rgba,
    high: Rgba,
}

impl InterpolateColors {
    /// Create a color ramp from `low` (at the minimum) to `high` (at the maximum).
    #[must_use]
    pub const fn new(low: Rgba, high: Rgba) -> Self {
        Self { low, high }
    }
}

impl CellShader for InterpolateColors {
    fn shade_cell(&self, pixel: &[f32]) -> Rgba {
        self.low.lerp(self.high, pixel[0])
    }

    fn shade_image(&self, grid: &Grid) -> Result<Framebuffer> {
        require_scalar(grid, "InterpolateColors")?;
        let (min, max) = grid.value_range().unwrap_or((0.0, 0.0));
        let span = max - min;
        Framebuffer::from_fn(grid.width(), grid.height(), |x, y| {
            let t = if span == 0.0 { 0.0 } else { (grid.get(x, y) - min) / span };
            self.shade_cell(&[t])
        })
    }
}

/// Footprint of a [`Spread`] kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpreadShape {
    /// Full square.
    #[default]
    Rect,
    /// Cells within the inscribed circle of the square.
    Circle,
}

/// Dilate cells outward with a square or disk kernel.
///
/// The kernel has side `factor + 1`. Each input cell is added into every
/// output cell the kernel covers when centered on it (offsets run from
/// `-ceil(factor / 2)` to `floor(factor / 2)`); cells spread past the edge
/// are dropped, so the output has the input's shape. Categorical grids are
/// spread one plane at a time.
///
/// With `anti_alias`, contributions are divided by the kernel weight, giving
/// fractional coverage instead of counts.
///
/// # Example
///
/// ```
/// use trueno_ar::grid::Grid;
/// use trueno_ar::shade::{GridShader, Spread};
///
/// let mut grid = Grid::scalar(4, 4);
/// grid.set(1, 1, 1.0);
/// let out = Spread::new(2).shade_grid(&grid).unwrap();
/// assert_eq!(out.cells().iter().sum::<f32>(), 9.0);
/// assert_eq!(out.get(3, 3), 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Spread {
    factor: usize,
    shape: SpreadShape,
    anti_alias: bool,
}

impl Default for Spread {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Spread {
    /// Create a square spread of the given factor.
    #[must_use]
    pub const fn new(factor: usize) -> Self {
        Self {
            factor,
            shape: SpreadShape::Rect,
            anti_alias: false,
        }
    }

    /// Set the kernel shape.
    #[must_use]
    pub const fn shape(mut self, shape: SpreadShape) -> Self {
        self.shape = shape;
        self
    }

    /// Normalize by kernel weight.
    #[must_use]
    pub const fn anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    /// Kernel offsets `(dx, dy)` covered by this spread.
    #[must_use]
    pub fn offsets(&self) -> Vec<(i64, i64)> {
        let side = self.factor as i64 + 1;
        let back = (self.factor as i64 + 1) / 2;
        let center = self.factor as f32 / 2.0;
        let radius_sq = center * center;

        let mut out = Vec::with_capacity((side * side) as usize);
        for j in 0..side {
            for i in 0..side {
                let inside = match self.shape {
                    SpreadShape::Rect => true,
                    SpreadShape::Circle => {
                        let (di, dj) = (i as f32 - center, j as f32 - center);
                        di * di + dj * dj <= radius_sq
                    }
                };
                if inside {
                    out.push((i - back, j - back));
                }
            }
        }
        out
    }
}

impl GridShader for Spread {
    fn shade_grid(&self, grid: &Grid) -> Result<Grid> {
        let offsets = self.offsets();
        let weight = if self.anti_alias { offsets.len().max(1) as f32 } else { 1.0 };
        let (w, h) = (grid.width() as i64, grid.height() as i64);
        let mut out = grid.zeros_like();

        for y in 0..h {
            for x in 0..w {
                let src = grid.pixel(x as usize, y as usize);
                if src.iter().all(|&v| v == 0.0) {
                    continue;
                }
                for &(dx, dy) in &offsets {
                    let (tx, ty) = (x + dx, y + dy);
                    if tx < 0 || ty < 0 || tx >= w || ty >= h {
                        continue;
                    }
                    for (dst, v) in out.pixel_mut(tx as usize, ty as usize).iter_mut().zip(src) {
                        *dst += *v / weight;
                    }
                }
            }
        }
        Ok(out)
    }
}

grid_shader!(Floor, Power, Cuberoot, Sqrt, Interpolate, Spread);
cell_shader!(BinarySegment, InterpolateColors);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::shade::{Raster, Shader};
    use approx::assert_relative_eq;

    fn grid(w: usize, h: usize, v: &[f32]) -> Grid {
        Grid::from_rows(w, h, v.to_vec()).unwrap()
    }

    fn rows(g: &Grid) -> Vec<Vec<f32>> {
        (0..g.height()).map(|y| (0..g.width()).map(|x| g.get(x, y)).collect()).collect()
    }

    #[test]
    fn test_floor() {
        let out = Floor.shade_grid(&grid(3, 1, &[1.7, -0.5, 2.0])).unwrap();
        assert_eq!(out.cells(), &[1.0, -1.0, 2.0]);
    }

    #[test]
    fn test_power_and_roots() {
        let g = grid(3, 1, &[1.0, 8.0, 27.0]);
        assert_eq!(Power::new(2.0).shade_grid(&g).unwrap().cells(), &[1.0, 64.0, 729.0]);
        let cube = Cuberoot.shade_grid(&g).unwrap();
        for (got, want) in cube.cells().iter().zip([1.0, 2.0, 3.0]) {
            assert_relative_eq!(*got, want, epsilon = 1e-5);
        }
        assert_relative_eq!(Cuberoot.shade_grid(&grid(1, 1, &[-8.0])).unwrap().get(0, 0), -2.0, epsilon = 1e-5);

        let sq = Sqrt.shade_grid(&grid(2, 1, &[4.0, 9.0])).unwrap();
        assert_eq!(sq.cells(), &[2.0, 3.0]);
        assert!(Sqrt.shade_grid(&grid(1, 1, &[-1.0])).unwrap().get(0, 0).is_nan());
    }

    #[test]
    fn test_binary_segment() {
        let shader = BinarySegment::new(Rgba::WHITE, Rgba::BLACK, 5.0);
        let img = shader.shade_image(&grid(3, 1, &[0.0, 5.0, 9.0])).unwrap();
        assert_eq!(img.get_pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(img.get_pixel(1, 0), Some(Rgba::BLACK));
        assert_eq!(img.get_pixel(2, 0), Some(Rgba::BLACK));
        assert!(shader.is_terminal());
    }

    #[test]
    fn test_color_shaders_reject_categorical() {
        let mut counts = Grid::categorical(2, 1, 2);
        counts.pixel_mut(1, 0).copy_from_slice(&[0.0, 9.0]);
        let expected = |shader| Error::UnsupportedRaster { shader, found: "categorical grid" };

        let err = BinarySegment::new(Rgba::WHITE, Rgba::BLACK, 1.0).shade_image(&counts).unwrap_err();
        assert_eq!(err.to_string(), expected("BinarySegment").to_string());
        let err = InterpolateColors::new(Rgba::WHITE, Rgba::RED)
            .shade(Raster::Grid(counts))
            .unwrap_err();
        assert_eq!(err.to_string(), expected("InterpolateColors").to_string());
    }

    #[test]
    fn test_interpolate() {
        let out = Interpolate::new(0.0, 10.0).shade_grid(&grid(3, 1, &[2.0, 4.0, 6.0])).unwrap();
        assert_eq!(out.cells(), &[0.0, 5.0, 10.0]);

        let flat = Interpolate::new(3.0, 10.0).shade_grid(&grid(2, 1, &[7.0, 7.0])).unwrap();
        assert_eq!(flat.cells(), &[3.0, 3.0]);
    }

    #[test]
    fn test_interpolate_colors() {
        let values: Vec<f32> = (0..=255).map(|v| v as f32).collect();
        let shader = InterpolateColors::new(Rgba::WHITE, Rgba::RED);
        let img = shader.shade_image(&grid(256, 1, &values)).unwrap();
        for v in 0..=255u32 {
            let c = img.get_pixel(v, 0).unwrap();
            assert_eq!(c.r, 255);
            assert_eq!(u32::from(c.g), 255 - v);
            assert_eq!(u32::from(c.b), 255 - v);
            assert_eq!(c.a, 255);
        }
    }

    #[test]
    fn test_interpolate_colors_via_shader_trait() {
        let out = InterpolateColors::new(Rgba::BLACK, Rgba::WHITE)
            .shade(Raster::Grid(grid(2, 1, &[0.0, 1.0])))
            .unwrap();
        let img = out.as_image().unwrap();
        assert_eq!(img.get_pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(img.get_pixel(1, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_spread_rect_single_seed() {
        let mut g = Grid::scalar(4, 4);
        g.set(1, 1, 1.0);
        let out = Spread::new(2).shade_grid(&g).unwrap();
        let expected = vec![
            vec![1.0, 1.0, 1.0, 0.0],
            vec![1.0, 1.0, 1.0, 0.0],
            vec![1.0, 1.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
        ];
        assert_eq!(rows(&out), expected);
    }

    #[test]
    fn test_spread_clips_at_edges() {
        let mut g = Grid::scalar(3, 3);
        g.set(0, 0, 1.0);
        let out = Spread::new(2).shade_grid(&g).unwrap();
        assert_eq!(out.cells().iter().sum::<f32>(), 4.0);
        assert_eq!(out.shape(), g.shape());
    }

    #[test]
    fn test_spread_overlap_sums() {
        let mut g = Grid::scalar(3, 1);
        g.set(0, 0, 1.0);
        g.set(2, 0, 1.0);
        let out = Spread::new(2).shade_grid(&g).unwrap();
        assert_eq!(out.cells(), &[1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_spread_circle_kernels() {
        let plus = Spread::new(2).shape(SpreadShape::Circle);
        let mut offs = plus.offsets();
        offs.sort_unstable();
        assert_eq!(offs, vec![(-1, 0), (0, -1), (0, 0), (0, 1), (1, 0)]);

        let mut g = Grid::scalar(5, 5);
        g.set(2, 2, 1.0);
        let diamond = Spread::new(4).shape(SpreadShape::Circle).shade_grid(&g).unwrap();
        let expected = vec![
            vec![0.0, 0.0, 1.0, 0.0, 0.0],
            vec![0.0, 1.0, 1.0, 1.0, 0.0],
            vec![1.0, 1.0, 1.0, 1.0, 1.0],
            vec![0.0, 1.0, 1.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0],
        ];
        assert_eq!(rows(&diamond), expected);
    }

    #[test]
    fn test_spread_anti_alias_normalizes() {
        let mut g = Grid::scalar(5, 5);
        g.set(2, 2, 1.0);
        let out = Spread::new(2).anti_alias(true).shade_grid(&g).unwrap();
        assert_relative_eq!(out.get(1, 1), 1.0 / 9.0);
        assert_relative_eq!(out.cells().iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_spread_per_category() {
        let mut g = Grid::categorical(3, 3, 2);
        g.set_category(0, 0, 0, 1.0);
        g.set_category(2, 2, 1, 3.0);
        let out = Spread::new(2).shade_grid(&g).unwrap();
        assert_eq!(out.plane(0).cells().iter().sum::<f32>(), 4.0);
        assert_eq!(out.plane(1).cells().iter().sum::<f32>(), 12.0);
        assert_eq!(out.pixel(1, 1), &[1.0, 3.0]);
        assert_eq!(out.pixel(0, 0), &[1.0, 0.0]);
    }

    #[test]
    fn test_spread_zero_factor_is_identity() {
        let g = grid(2, 2, &[1.0, 0.0, 0.0, 5.0]);
        assert_eq!(Spread::new(0).shade_grid(&g).unwrap(), g);
    }
}
