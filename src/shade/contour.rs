//! Iso-contour shape shader.
//!
//! Tracing itself (marching squares or similar) is delegated to a
//! [`ContourTracer`]; [`Contour`] picks the levels, asks the tracer for each
//! band and maps vertices from grid indices into the requested data ranges.

use super::ShapeShader;
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Ordered vertices of one traced line, in `(x, y)` order.
pub type Polyline = Vec<(f32, f32)>;

/// External contour tracing engine.
pub trait ContourTracer {
    /// Trace the boundaries of the region of `grid` with values in `[low, high]`.
    ///
    /// Vertices are in grid index space: `x` in `[0, width - 1]`, `y` in
    /// `[0, height - 1]`.
    fn trace(&self, grid: &Grid, low: f32, high: f32) -> Vec<Polyline>;
}

impl<F: Fn(&Grid, f32, f32) -> Vec<Polyline>> ContourTracer for F {
    fn trace(&self, grid: &Grid, low: f32, high: f32) -> Vec<Polyline> {
        self(grid, low, high)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Levels {
    Count(usize),
    Explicit(Vec<f32>),
}

/// Iso-lines of a scalar grid, one set of polylines per level.
///
/// Level `levels[i]` is traced as the band `[levels[i], levels[i + 1]]`.
/// Explicit levels yield `n - 1` entries. Counted levels yield `n`: the last
/// one is banded up to the grid maximum.
#[derive(Debug, Clone)]
pub struct Contour<T> {
    tracer: T,
    levels: Levels,
    x_range: Option<(f32, f32)>,
    y_range: Option<(f32, f32)>,
}

impl<T: ContourTracer> Contour<T> {
    /// Five evenly spaced levels, vertices in grid index space.
    pub fn new(tracer: T) -> Self {
        Self {
            tracer,
            levels: Levels::Count(5),
            x_range: None,
            y_range: None,
        }
    }

    /// Use `n` levels picked by [`Contour::nlevels`].
    #[must_use]
    pub fn level_count(mut self, n: usize) -> Self {
        self.levels = Levels::Count(n);
        self
    }

    /// Use these exact levels.
    #[must_use]
    pub fn levels(mut self, levels: Vec<f32>) -> Self {
        self.levels = Levels::Explicit(levels);
        self
    }

    /// Data values at the first and last grid column.
    #[must_use]
    pub fn x_range(mut self, min: f32, max: f32) -> Self {
        self.x_range = Some((min, max));
        self
    }

    /// Data values at the first and last grid row.
    #[must_use]
    pub fn y_range(mut self, min: f32, max: f32) -> Self {
        self.y_range = Some((min, max));
        self
    }

    fn axis(range: Option<(f32, f32)>, cells: usize) -> impl Fn(f32) -> f32 {
        let last = cells.saturating_sub(1) as f32;
        let (lo, hi) = range.unwrap_or((0.0, last));
        move |i| if last == 0.0 { lo } else { lo + i / last * (hi - lo) }
    }
}

impl Contour<()> {
    /// `n` evenly spaced values strictly between the grid's min and max.
    ///
    /// # Example
    ///
    /// ```
    /// use trueno_ar::grid::Grid;
    /// use trueno_ar::shade::Contour;
    ///
    /// let grid = Grid::from_rows(2, 1, vec![0.0, 3.0]).unwrap();
    /// assert_eq!(Contour::nlevels(&grid, 2), vec![1.0, 2.0]);
    /// ```
    #[must_use]
    pub fn nlevels(grid: &Grid, n: usize) -> Vec<f32> {
        let Some((min, max)) = grid.value_range() else {
            return Vec::new();
        };
        let step = (max - min) / (n + 1) as f32;
        (1..=n).map(|i| min + step * i as f32).collect()
    }
}

impl<T: ContourTracer> ShapeShader for Contour<T> {
    type Shape = Vec<(f32, Vec<Polyline>)>;

    fn fuse(&self, grid: &Grid) -> Result<Self::Shape> {
        if grid.is_categorical() {
            return Err(Error::UnsupportedRaster {
                shader: "Contour",
                found: "categorical grid",
            });
        }
        let bounds = match &self.levels {
            Levels::Count(n) => {
                let mut levels = Contour::nlevels(grid, *n);
                match grid.value_range() {
                    Some((_, max)) if !levels.is_empty() => levels.push(max),
                    _ => {}
                }
                levels
            }
            Levels::Explicit(levels) => levels.clone(),
        };
        crate::log::debug!(bands = bounds.len().saturating_sub(1), "tracing contours");

        let fx = Self::axis(self.x_range, grid.width());
        let fy = Self::axis(self.y_range, grid.height());
        Ok(bounds
            .windows(2)
            .map(|band| {
                let lines = self
                    .tracer
                    .trace(grid, band[0], band[1])
                    .into_iter()
                    .map(|line| line.into_iter().map(|(x, y)| (fx(x), fy(y))).collect())
                    .collect();
                (band[0], lines)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    fn pyramid() -> Grid {
        let values = vec![
            0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.5, 0.5, 0.5, 0.0, //
            0.0, 0.5, 1.0, 0.5, 0.0, //
            0.0, 0.5, 0.5, 0.5, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        Grid::from_rows(5, 5, values).unwrap()
    }

    #[test]
    fn test_nlevels() {
        let grid = pyramid();
        assert_eq!(Contour::nlevels(&grid, 1), vec![0.5]);
        let three = Contour::nlevels(&grid, 3);
        for (got, want) in three.iter().zip([0.25, 0.5, 0.75]) {
            assert_relative_eq!(*got, want);
        }
        let tripled = grid.map(|v| v * 3.0);
        assert_eq!(Contour::nlevels(&tripled, 2), vec![1.0, 2.0]);
    }

    #[test]
    fn test_fuse_calls_tracer_per_band() {
        let calls = RefCell::new(Vec::new());
        let tracer = |_: &Grid, low: f32, high: f32| -> Vec<Polyline> {
            calls.borrow_mut().push((low, high));
            vec![vec![(0.0, 0.0), (4.0, 4.0)]]
        };
        let contour = Contour::new(tracer).levels(vec![0.0, 0.5, 1.0]);
        let isos = contour.fuse(&pyramid()).unwrap();
        assert_eq!(calls.borrow().as_slice(), &[(0.0, 0.5), (0.5, 1.0)]);
        assert_eq!(isos.len(), 2);
        assert_eq!(isos[1].0, 0.5);
        assert_eq!(isos[0].1, vec![vec![(0.0, 0.0), (4.0, 4.0)]]);
    }

    #[test]
    fn test_fuse_maps_ranges() {
        let tracer = |_: &Grid, _: f32, _: f32| -> Vec<Polyline> { vec![vec![(0.0, 0.0), (2.0, 4.0)]] };
        let contour = Contour::new(tracer)
            .level_count(2)
            .x_range(-1.0, 1.0)
            .y_range(10.0, 20.0);
        let isos = contour.fuse(&pyramid()).unwrap();
        assert_eq!(isos.len(), 2);
        assert_eq!(isos[0].1[0], vec![(-1.0, 10.0), (0.0, 20.0)]);
    }

    #[test]
    fn test_level_count_gives_one_entry_per_level() {
        let calls = RefCell::new(Vec::new());
        let tracer = |_: &Grid, low: f32, high: f32| -> Vec<Polyline> {
            calls.borrow_mut().push((low, high));
            Vec::new()
        };
        let single = Contour::new(&tracer).level_count(1).fuse(&pyramid()).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].0, 0.5);
        assert_eq!(calls.borrow().as_slice(), &[(0.5, 1.0)]);

        let three = Contour::new(&tracer).level_count(3).fuse(&pyramid()).unwrap();
        let keys: Vec<f32> = three.iter().map(|(level, _)| *level).collect();
        assert_eq!(keys, vec![0.25, 0.5, 0.75]);
        assert_eq!(calls.borrow().last(), Some(&(0.75, 1.0)));
    }

    #[test]
    fn test_level_count_zero() {
        let tracer = |_: &Grid, _: f32, _: f32| -> Vec<Polyline> { Vec::new() };
        let flat = Grid::from_rows(2, 2, vec![1.0; 4]).unwrap();
        assert_eq!(Contour::new(tracer).level_count(0).fuse(&flat).unwrap().len(), 0);
    }

    #[test]
    fn test_fuse_rejects_categorical() {
        let contour = Contour::new(|_: &Grid, _: f32, _: f32| -> Vec<Polyline> { Vec::new() });
        assert!(contour.fuse(&Grid::categorical(2, 2, 2)).is_err());
    }
}
