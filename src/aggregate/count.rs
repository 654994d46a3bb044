//! Scalar aggregators.

use super::{allocate_checked, fold_footprint, Aggregator};
use crate::error::Result;
use crate::geometry::ShapeCode;
use crate::grid::Grid;

/// Counts glyphs covering each pixel; info values are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Count;

impl<V> Aggregator<V> for Count {
    fn allocate(&self, screen: (u32, u32)) -> Result<Grid> {
        allocate_checked(screen, None)
    }

    fn combine(&self, grid: &mut Grid, pixel: [i64; 4], shape: ShapeCode, _value: &V) -> Result<()> {
        fold_footprint(grid, pixel, shape, &[1.0]);
        Ok(())
    }
}

/// Sums info values over the glyphs covering each pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sum;

impl<V: Copy + Into<f64>> Aggregator<V> for Sum {
    fn allocate(&self, screen: (u32, u32)) -> Result<Grid> {
        allocate_checked(screen, None)
    }

    fn combine(&self, grid: &mut Grid, pixel: [i64; 4], shape: ShapeCode, value: &V) -> Result<()> {
        let v: f64 = (*value).into();
        fold_footprint(grid, pixel, shape, &[v as f32]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Glyph;
    use crate::glyphset::Glyphset;
    use crate::infos;

    #[test]
    fn test_count_allocate() {
        let grid = Aggregator::<()>::allocate(&Count, (10, 7)).unwrap();
        assert_eq!(grid.shape(), (7, 10, 1));
        assert!(!grid.is_categorical());
        assert!(grid.cells().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_count_point_ignores_value() {
        let mut grid = Aggregator::<f32>::allocate(&Count, (4, 4)).unwrap();
        Count.combine(&mut grid, [1, 1, 2, 2], ShapeCode::Point, &1000.0).unwrap();
        assert_eq!(grid.get(1, 1), 1.0);
        Count.combine(&mut grid, [1, 1, 2, 2], ShapeCode::Point, &-3.0).unwrap();
        assert_eq!(grid.get(1, 1), 2.0);
        assert_eq!(grid.cells().iter().sum::<f32>(), 2.0);
    }

    #[test]
    fn test_count_rect() {
        let mut grid = Aggregator::<()>::allocate(&Count, (4, 4)).unwrap();
        Count.combine(&mut grid, [0, 0, 2, 2], ShapeCode::Rect, &()).unwrap();
        Count.combine(&mut grid, [1, 1, 3, 3], ShapeCode::Rect, &()).unwrap();
        assert_eq!(grid.get(0, 0), 1.0);
        assert_eq!(grid.get(1, 1), 2.0);
        assert_eq!(grid.get(2, 2), 1.0);
        assert_eq!(grid.get(3, 3), 0.0);
    }

    #[test]
    fn test_count_line() {
        let mut grid = Aggregator::<()>::allocate(&Count, (5, 5)).unwrap();
        Count.combine(&mut grid, [0, 4, 4, 0], ShapeCode::Line, &()).unwrap();
        for i in 0..5 {
            assert_eq!(grid.get(i, 4 - i), 1.0);
        }
        assert_eq!(grid.cells().iter().sum::<f32>(), 5.0);
    }

    #[test]
    fn test_sum_rect() {
        let mut grid = Aggregator::<i32>::allocate(&Sum, (3, 3)).unwrap();
        Sum.combine(&mut grid, [0, 0, 3, 1], ShapeCode::Rect, &4).unwrap();
        Sum.combine(&mut grid, [1, 0, 2, 3], ShapeCode::Rect, &2).unwrap();
        assert_eq!(grid.get(0, 0), 4.0);
        assert_eq!(grid.get(1, 0), 6.0);
        assert_eq!(grid.get(1, 2), 2.0);
        assert_eq!(grid.get(2, 2), 0.0);
    }

    #[test]
    fn test_sum_aggregate_through_glyphset() {
        let glyphs = Glyphset::new(
            vec![Glyph::point(0.0, 0.0), Glyph::point(0.5, 0.2), Glyph::point(2.0, 1.0)],
            vec![1.5_f32, 2.5, 4.0],
            ShapeCode::Point,
        )
        .unwrap();
        let grid = Sum.aggregate(&glyphs, &infos::value::<f32>(), (3, 2)).unwrap();
        assert_eq!(grid.get(0, 0), 4.0);
        assert_eq!(grid.get(2, 1), 4.0);
    }
}
