//! Aggregators: fold glyph footprints into dense grids.
//!
//! Every aggregator follows one protocol:
//!
//! 1. [`Aggregator::allocate`] a zero-filled grid for the screen,
//! 2. [`Aggregator::combine`] each realized glyph and its info value into it,
//! 3. [`Aggregator::rollup`] partial grids from disjoint partitions.
//!
//! Rollup is an element-wise sum, so it is associative and commutative and
//! partitions may be aggregated in any order, including in parallel with the
//! `parallel` feature.
//!
//! # Example
//!
//! ```
//! use trueno_ar::aggregate::{Aggregator, Count};
//! use trueno_ar::geometry::{Glyph, ShapeCode};
//! use trueno_ar::glyphset::Glyphset;
//! use trueno_ar::infos;
//!
//! let glyphs = Glyphset::new(
//!     vec![Glyph::point(1.0, 1.0), Glyph::point(1.0, 1.0), Glyph::point(3.0, 0.0)],
//!     vec![10, 20, 30],
//!     ShapeCode::Point,
//! ).unwrap();
//!
//! let grid = Count.aggregate(&glyphs, &infos::constant(1), (4, 4)).unwrap();
//! assert_eq!(grid.get(1, 1), 2.0);
//! assert_eq!(grid.get(3, 0), 1.0);
//! ```

mod categories;
mod count;

pub use categories::{CategoryOrder, CountCategories};
pub use count::{Count, Sum};

use crate::error::{Error, Result};
use crate::geometry::{Glyph, ShapeCode};
use crate::glyphset::Glyphset;
use crate::grid::Grid;
use crate::render::{draw_line, fill_patch};

/// Allocate / combine / rollup protocol over info values of type `V`.
pub trait Aggregator<V> {
    /// Zero-filled grid for a `(width, height)` screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for an empty screen.
    fn allocate(&self, screen: (u32, u32)) -> Result<Grid>;

    /// Fold one realized glyph (integer pixel coordinates, see
    /// [`Glyphset::pixels`]) and its value into `grid`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be folded into this grid.
    fn combine(&self, grid: &mut Grid, pixel: [i64; 4], shape: ShapeCode, value: &V) -> Result<()>;

    /// Element-wise sum of same-shaped partial grids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] for no grids and [`Error::ShapeMismatch`]
    /// if the grids differ in shape.
    fn rollup(&self, grids: &[Grid]) -> Result<Grid> {
        let (first, rest) = grids.split_first().ok_or(Error::EmptyData)?;
        let mut acc = first.clone();
        for grid in rest {
            acc.add_assign(grid)?;
        }
        crate::log::debug!(partials = grids.len(), "rolled up aggregates");
        Ok(acc)
    }

    /// Allocate a grid and combine every glyph of `glyphs` into it.
    ///
    /// # Errors
    ///
    /// Propagates allocation and combine errors.
    fn aggregate<D, I>(&self, glyphs: &Glyphset<D>, info: &I, screen: (u32, u32)) -> Result<Grid>
    where
        I: Fn(&Glyph, &D) -> V,
    {
        let mut grid = self.allocate(screen)?;
        crate::log::debug!(
            glyphs = glyphs.len(),
            width = screen.0,
            height = screen.1,
            depth = grid.depth(),
            "aggregating glyphset"
        );
        let shape = glyphs.shape_code();
        for ((glyph, data), pixel) in glyphs.iter().zip(glyphs.pixels()) {
            let value = info(&glyph, data);
            self.combine(&mut grid, pixel, shape, &value)?;
        }
        Ok(grid)
    }
}

/// Aggregate `glyphs` in contiguous partitions of `chunk` glyphs and roll the
/// partial grids up.
///
/// Produces the same grid as [`Aggregator::aggregate`] over the whole set.
///
/// # Errors
///
/// Propagates allocation, combine and rollup errors.
pub fn aggregate_chunked<A, V, D, I>(
    agg: &A,
    glyphs: &Glyphset<D>,
    info: &I,
    screen: (u32, u32),
    chunk: usize,
) -> Result<Grid>
where
    A: Aggregator<V>,
    I: Fn(&Glyph, &D) -> V,
{
    let parts = glyphs.split(chunk);
    if parts.is_empty() {
        return agg.allocate(screen);
    }
    crate::log::debug!(partitions = parts.len(), chunk, "chunked aggregation");
    let partials = parts
        .iter()
        .map(|part| agg.aggregate(part, info, screen))
        .collect::<Result<Vec<_>>>()?;
    agg.rollup(&partials)
}

/// Aggregate partitions of `chunk` glyphs on the rayon pool and tree-reduce
/// the partial grids with rollup.
///
/// # Errors
///
/// Propagates allocation, combine and rollup errors.
#[cfg(feature = "parallel")]
pub fn aggregate_parallel<A, V, D, I>(
    agg: &A,
    glyphs: &Glyphset<D>,
    info: &I,
    screen: (u32, u32),
    chunk: usize,
) -> Result<Grid>
where
    A: Aggregator<V> + Sync,
    D: Send + Sync,
    I: Fn(&Glyph, &D) -> V + Sync,
{
    use rayon::prelude::*;

    let parts = glyphs.split(chunk);
    crate::log::debug!(partitions = parts.len(), chunk, "parallel aggregation");
    parts
        .par_iter()
        .map(|part| agg.aggregate(part, info, screen))
        .try_reduce_with(|a, b| agg.rollup(&[a, b]))
        .unwrap_or_else(|| agg.allocate(screen))
}

pub(crate) fn allocate_checked(screen: (u32, u32), depth: Option<usize>) -> Result<Grid> {
    let (width, height) = screen;
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(match depth {
        Some(depth) => Grid::categorical(width as usize, height as usize, depth),
        None => Grid::scalar(width as usize, height as usize),
    })
}

/// Build the patch covering one glyph's bounding box clipped to `grid`:
/// `value` along the footprint and zero elsewhere. Returns the patch origin
/// in grid space.
///
/// Rectangles fill the whole patch; lines are rasterized into it with
/// endpoints inclusive, in glyph coordinates, so clipping never moves a cell.
fn glyph_patch(grid: &Grid, pixel: [i64; 4], shape: ShapeCode, value: &[f32]) -> (i64, i64, Grid) {
    let [x0, y0, x1, y1] = pixel;
    // Inclusive cell range of the footprint.
    let (fx0, fy0, fx1, fy1) = match shape {
        ShapeCode::Point => (x0, y0, x0, y0),
        ShapeCode::Rect => (x0, y0, x1.saturating_sub(1), y1.saturating_sub(1)),
        ShapeCode::Line => (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)),
    };
    let (left, top) = (fx0.max(0), fy0.max(0));
    let right = fx1.min(grid.width() as i64 - 1);
    let bottom = fy1.min(grid.height() as i64 - 1);
    let extent = |lo: i64, hi: i64| hi.saturating_sub(lo).saturating_add(1).max(0) as usize;
    let (w, h) = (extent(left, right), extent(top, bottom));

    let mut patch = if grid.is_categorical() {
        Grid::categorical(w, h, grid.depth())
    } else {
        Grid::scalar(w, h)
    };
    match shape {
        ShapeCode::Point | ShapeCode::Rect => fill_patch(&mut patch, value),
        ShapeCode::Line => draw_line(
            &mut patch,
            x0.saturating_sub(left),
            y0.saturating_sub(top),
            x1.saturating_sub(left),
            y1.saturating_sub(top),
            value,
        ),
    }
    (left, top, patch)
}

/// Add `patch` into `grid` with its top-left corner at `(left, top)`.
///
/// Cells falling outside the grid are dropped.
fn accumulate_patch(grid: &mut Grid, left: i64, top: i64, patch: &Grid) {
    let gw = grid.width() as i64;
    let gh = grid.height() as i64;
    let x_start = left.max(0);
    let y_start = top.max(0);
    let x_end = (left + patch.width() as i64).min(gw);
    let y_end = (top + patch.height() as i64).min(gh);

    for y in y_start..y_end {
        for x in x_start..x_end {
            let src = patch.pixel((x - left) as usize, (y - top) as usize);
            for (dst, v) in grid.pixel_mut(x as usize, y as usize).iter_mut().zip(src) {
                *dst += *v;
            }
        }
    }
}

/// Fold one glyph's footprint carrying `value` into `grid`.
pub(crate) fn fold_footprint(grid: &mut Grid, pixel: [i64; 4], shape: ShapeCode, value: &[f32]) {
    if shape == ShapeCode::Point {
        let [x, y, ..] = pixel;
        if (0..grid.width() as i64).contains(&x) && (0..grid.height() as i64).contains(&y) {
            for (dst, v) in grid.pixel_mut(x as usize, y as usize).iter_mut().zip(value) {
                *dst += *v;
            }
        }
        return;
    }
    let (left, top, patch) = glyph_patch(grid, pixel, shape, value);
    accumulate_patch(grid, left, top, &patch);
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn grid_strategy() -> impl Strategy<Value = (Grid, Grid, Grid)> {
        let cells = || prop::collection::vec(-1000i32..1000, 12).prop_map(|v| {
            Grid::from_planes_interleaved(2, 2, 3, v.into_iter().map(|c| c as f32).collect()).unwrap()
        });
        (cells(), cells(), cells())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_rollup_commutative((a, b, _c) in grid_strategy()) {
            let ab = Aggregator::<i32>::rollup(&Count, &[a.clone(), b.clone()]).unwrap();
            let ba = Aggregator::<i32>::rollup(&Count, &[b, a]).unwrap();
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn prop_rollup_associative((a, b, c) in grid_strategy()) {
            let agg = |g: &[Grid]| Aggregator::<i32>::rollup(&Count, g).unwrap();
            let left = agg(&[agg(&[a.clone(), b.clone()]), c.clone()]);
            let right = agg(&[a, agg(&[b, c])]);
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_chunked_equals_whole(
            pts in prop::collection::vec((0u32..8, 0u32..8, 0u32..4, 0u32..4), 0..40),
            chunk in 1usize..10,
        ) {
            let glyphs: Vec<Glyph> = pts
                .iter()
                .map(|&(x, y, w, h)| Glyph::new(x as f32, y as f32, (x + w) as f32, (y + h) as f32))
                .collect();
            let data: Vec<f32> = pts.iter().map(|p| p.2 as f32).collect();
            let set = Glyphset::new(glyphs, data, ShapeCode::Rect).unwrap();
            let info = crate::infos::value::<f32>();
            let whole = Sum.aggregate(&set, &info, (10, 10)).unwrap();
            let chunked = aggregate_chunked(&Sum, &set, &info, (10, 10), chunk).unwrap();
            prop_assert_eq!(whole, chunked);
        }
    }
}
