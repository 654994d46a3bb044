//! Rasterization primitives over aggregate grids.
//!
//! Every primitive writes a full cell value: a slice with one entry per
//! category, so a scalar grid takes `&[v]` and a categorical grid takes the
//! whole category vector, broadcast into each covered pixel.
//!
//! Lines may run outside the grid: only the cells inside are written, and
//! the walk only visits steps whose major coordinate lands in the grid.

use crate::grid::Grid;

/// Write `value` into every cell the segment `(x1, y1)-(x2, y2)` passes through.
///
/// Uses Bresenham's algorithm with the endpoints put in a canonical order
/// first (lowest `y`, then lowest `x`), so listing the endpoints in either
/// order covers exactly the same cells. Pure horizontal and vertical segments
/// are filled directly. Cells outside `grid` are skipped.
///
/// # Panics
///
/// Panics if `value.len()` differs from the grid depth.
///
/// # Example
///
/// ```
/// use trueno_ar::grid::Grid;
/// use trueno_ar::render::draw_line;
///
/// let mut grid = Grid::scalar(1, 10);
/// draw_line(&mut grid, 0, 9, 0, 0, &[1.0]);
/// assert!(grid.cells().iter().all(|&v| v == 1.0));
/// ```
pub fn draw_line(grid: &mut Grid, x1: i64, y1: i64, x2: i64, y2: i64, value: &[f32]) {
    let (w, h) = (grid.width() as i128, grid.height() as i128);
    let ((x0, y0), (x1, y1)) = if (y1, x1) <= (y2, x2) {
        ((x1, y1), (x2, y2))
    } else {
        ((x2, y2), (x1, y1))
    };
    let (x0, y0, x1, y1) = (i128::from(x0), i128::from(y0), i128::from(x1), i128::from(y1));

    if y0 == y1 {
        if (0..h).contains(&y0) {
            for x in x0.min(x1).max(0)..=x0.max(x1).min(w - 1) {
                plot(grid, x, y0, value);
            }
        }
        return;
    }
    if x0 == x1 {
        if (0..w).contains(&x0) {
            for y in y0.max(0)..=y1.min(h - 1) {
                plot(grid, x0, y, value);
            }
        }
        return;
    }

    let adx = (x1 - x0).abs();
    let ady = y1 - y0;
    let sx = if x0 < x1 { 1 } else { -1 };

    if adx > ady {
        // x-major: y (always increasing) advances on error overflow.
        for j in steps_inside(x0, sx, adx, w) {
            let y = y0 + minor_offset(j, adx, ady);
            if (0..h).contains(&y) {
                plot(grid, x0 + sx * j, y, value);
            }
        }
    } else {
        for j in steps_inside(y0, 1, ady, h) {
            let x = x0 + sx * minor_offset(j, ady, adx);
            if (0..w).contains(&x) {
                plot(grid, x, y0 + j, value);
            }
        }
    }
}

/// Minor-axis offset after `j` major steps of a Bresenham walk.
///
/// Closed form of the error-term recurrence started at `2 * minor - major`:
/// `ceil((2 * minor * j - major) / (2 * major))`.
fn minor_offset(j: i128, major: i128, minor: i128) -> i128 {
    let num = minor.saturating_mul(2).saturating_mul(j) - major;
    let den = major.saturating_mul(2);
    -(-num).div_euclid(den)
}

/// Steps `j` in `0..=len` whose coordinate `start + dir * j` lies in `0..limit`.
fn steps_inside(start: i128, dir: i128, len: i128, limit: i128) -> std::ops::RangeInclusive<i128> {
    let (lo, hi) = if dir > 0 {
        (-start, limit - 1 - start)
    } else {
        (start - (limit - 1), start)
    };
    lo.max(0)..=hi.min(len)
}

/// Set every cell of `grid` to `value`.
pub fn fill_patch(grid: &mut Grid, value: &[f32]) {
    let depth = grid.depth();
    for cell in grid.cells_mut().chunks_exact_mut(depth.max(1)) {
        cell.copy_from_slice(value);
    }
}

#[inline]
fn plot(grid: &mut Grid, x: i128, y: i128, value: &[f32]) {
    grid.pixel_mut(x as usize, y as usize).copy_from_slice(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(grid: &Grid) -> Vec<Vec<f32>> {
        (0..grid.height())
            .map(|y| (0..grid.width()).map(|x| grid.get(x, y)).collect())
            .collect()
    }

    fn from_ints(rows: &[&[i32]]) -> Vec<Vec<f32>> {
        rows.iter().map(|r| r.iter().map(|&v| v as f32).collect()).collect()
    }

    #[test]
    fn test_draw_line_vertical() {
        let mut out = Grid::scalar(1, 10);
        draw_line(&mut out, 0, 0, 0, 9, &[1.0]);
        assert!(out.cells().iter().all(|&v| v == 1.0), "simple vertical");

        draw_line(&mut out, 0, 9, 0, 0, &[7.0]);
        assert!(out.cells().iter().all(|&v| v == 7.0), "reverse vertical");

        let mut out = Grid::scalar(1, 10);
        draw_line(&mut out, 0, 1, 0, 8, &[7.0]);
        assert_eq!(out.get(0, 0), 0.0);
        assert_eq!(out.get(0, 9), 0.0);
        assert!((1..9).all(|y| out.get(0, y) == 7.0), "not space filling");
    }

    #[test]
    fn test_draw_line_horizontal() {
        let mut out = Grid::scalar(10, 1);
        draw_line(&mut out, 9, 0, 0, 0, &[1.0]);
        assert!(out.cells().iter().all(|&v| v == 1.0));

        let mut out = Grid::scalar(10, 1);
        draw_line(&mut out, 1, 0, 8, 0, &[7.0]);
        assert_eq!(out.get(0, 0), 0.0);
        assert_eq!(out.get(9, 0), 0.0);
        assert!((1..9).all(|x| out.get(x, 0) == 7.0));
    }

    #[test]
    fn test_draw_line_diagonal() {
        let mut out = Grid::scalar(11, 10);
        draw_line(&mut out, 2, 2, 6, 5, &[1.0]);
        let mut expected = vec![vec![0.0; 11]; 10];
        for (x, y) in [(2, 2), (3, 3), (4, 3), (5, 4), (6, 5)] {
            expected[y][x] = 1.0;
        }
        assert_eq!(rows(&out), expected);
    }

    #[test]
    fn test_draw_line_diagonal_descending() {
        let mut out = Grid::scalar(11, 10);
        draw_line(&mut out, 7, 3, 1, 8, &[1.0]);
        let mut expected = vec![vec![0.0; 11]; 10];
        for (x, y) in [(7, 3), (6, 4), (5, 5), (4, 5), (3, 6), (2, 7), (1, 8)] {
            expected[y][x] = 1.0;
        }
        assert_eq!(rows(&out), expected);
    }

    #[test]
    fn test_draw_line_steep() {
        let mut out = Grid::scalar(3, 5);
        draw_line(&mut out, 0, 0, 2, 4, &[1.0]);
        let expected = from_ints(&[&[1, 0, 0], &[1, 0, 0], &[0, 1, 0], &[0, 1, 0], &[0, 0, 1]]);
        assert_eq!(rows(&out), expected);
    }

    #[test]
    fn test_draw_line_vector_value() {
        let mut out = Grid::categorical(1, 5, 2);
        draw_line(&mut out, 0, 0, 0, 4, &[1.0, 2.0]);
        for y in 0..5 {
            assert_eq!(out.pixel(0, y), &[1.0, 2.0]);
        }
    }

    #[test]
    fn test_fill_patch() {
        let mut out = Grid::categorical(2, 2, 3);
        fill_patch(&mut out, &[1.0, 0.0, 4.0]);
        assert!(out.pixels().all(|p| p == [1.0, 0.0, 4.0]));
    }

    #[test]
    fn test_line_clipped_to_grid() {
        let mut out = Grid::scalar(2, 2);
        draw_line(&mut out, 0, 0, 5, 0, &[1.0]);
        assert_eq!(rows(&out), from_ints(&[&[1, 1], &[0, 0]]));

        let mut out = Grid::scalar(4, 4);
        draw_line(&mut out, -200_000, -200_000, 200_000, 200_000, &[1.0]);
        for i in 0..4 {
            assert_eq!(out.get(i, i), 1.0);
        }
        assert_eq!(out.cells().iter().sum::<f32>(), 4.0);

        let mut out = Grid::scalar(3, 3);
        draw_line(&mut out, i64::MIN, 1, i64::MAX, 1, &[1.0]);
        draw_line(&mut out, 10, -5, 20, 40, &[1.0]);
        assert_eq!(rows(&out), from_ints(&[&[0, 0, 0], &[1, 1, 1], &[0, 0, 0]]));
    }
}
