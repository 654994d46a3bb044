//! Glyphsets: glyph geometry paired with per-glyph data.
//!
//! A [`Glyphset`] is immutable. Projection returns a new glyphset sharing the
//! same storage with a composed [`ViewTransform`]; [`Glyphset::split`] returns
//! contiguous partitions that share it too, so partitions can be aggregated
//! independently and rolled up.
//!
//! # Example
//!
//! ```
//! use trueno_ar::geometry::{ShapeCode, ViewTransform};
//! use trueno_ar::glyphset::{column, Glyphset, ToPoint};
//!
//! let rows = vec![[1.0_f32, 2.0], [3.0, 4.0]];
//! let glyphs = Glyphset::from_rows(&rows, vec!["a", "b"], &ToPoint::new(column(0), column(1))).unwrap();
//! assert_eq!(glyphs.shape_code(), ShapeCode::Point);
//!
//! let projected = glyphs.project(&ViewTransform::new(0.0, 0.0, 2.0, 2.0));
//! let b = projected.bounds().unwrap();
//! assert_eq!((b.x, b.y, b.width, b.height), (2.0, 4.0, 4.0, 4.0));
//! ```

use std::ops::Range;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Glyph, ShapeCode, ViewTransform};

/// Builds a glyph from one raw input row.
pub trait Shaper<R> {
    /// Shape code shared by every glyph this shaper produces.
    fn shape_code(&self) -> ShapeCode;

    /// Glyph for one row.
    fn shape(&self, row: &R) -> Glyph;
}

/// Accessor reading field `i` of a numeric row; missing fields read as NaN.
pub fn column<R: AsRef<[f32]>>(i: usize) -> impl Fn(&R) -> f32 + Copy {
    move |row: &R| row.as_ref().get(i).copied().unwrap_or(f32::NAN)
}

/// Point glyphs from x and y accessors.
#[derive(Debug, Clone, Copy)]
pub struct ToPoint<X, Y> {
    x: X,
    y: Y,
}

impl<X, Y> ToPoint<X, Y> {
    /// Create a point shaper.
    pub const fn new(x: X, y: Y) -> Self {
        Self { x, y }
    }
}

impl<R, X: Fn(&R) -> f32, Y: Fn(&R) -> f32> Shaper<R> for ToPoint<X, Y> {
    fn shape_code(&self) -> ShapeCode {
        ShapeCode::Point
    }

    fn shape(&self, row: &R) -> Glyph {
        Glyph::point((self.x)(row), (self.y)(row))
    }
}

/// Rectangle glyphs from x, y, width and height accessors.
#[derive(Debug, Clone, Copy)]
pub struct ToRect<X, Y, W, H> {
    x: X,
    y: Y,
    w: W,
    h: H,
}

impl<X, Y, W, H> ToRect<X, Y, W, H> {
    /// Create a rectangle shaper.
    pub const fn new(x: X, y: Y, w: W, h: H) -> Self {
        Self { x, y, w, h }
    }
}

impl<R, X, Y, W, H> Shaper<R> for ToRect<X, Y, W, H>
where
    X: Fn(&R) -> f32,
    Y: Fn(&R) -> f32,
    W: Fn(&R) -> f32,
    H: Fn(&R) -> f32,
{
    fn shape_code(&self) -> ShapeCode {
        ShapeCode::Rect
    }

    fn shape(&self, row: &R) -> Glyph {
        let x = (self.x)(row);
        let y = (self.y)(row);
        Glyph::new(x, y, x + (self.w)(row), y + (self.h)(row))
    }
}

/// Line glyphs from two endpoint accessor pairs.
#[derive(Debug, Clone, Copy)]
pub struct ToLine<X1, Y1, X2, Y2> {
    x1: X1,
    y1: Y1,
    x2: X2,
    y2: Y2,
}

impl<X1, Y1, X2, Y2> ToLine<X1, Y1, X2, Y2> {
    /// Create a line shaper.
    pub const fn new(x1: X1, y1: Y1, x2: X2, y2: Y2) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl<R, X1, Y1, X2, Y2> Shaper<R> for ToLine<X1, Y1, X2, Y2>
where
    X1: Fn(&R) -> f32,
    Y1: Fn(&R) -> f32,
    X2: Fn(&R) -> f32,
    Y2: Fn(&R) -> f32,
{
    fn shape_code(&self) -> ShapeCode {
        ShapeCode::Line
    }

    fn shape(&self, row: &R) -> Glyph {
        Glyph::new((self.x1)(row), (self.y1)(row), (self.x2)(row), (self.y2)(row))
    }
}

/// Ordered glyphs, parallel data values, a shared shape code and a pending
/// view transform.
#[derive(Debug)]
pub struct Glyphset<D> {
    glyphs: Arc<[Glyph]>,
    data: Arc<[D]>,
    range: Range<usize>,
    shape: ShapeCode,
    transform: ViewTransform,
}

impl<D> Clone for Glyphset<D> {
    fn clone(&self) -> Self {
        Self {
            glyphs: Arc::clone(&self.glyphs),
            data: Arc::clone(&self.data),
            range: self.range.clone(),
            shape: self.shape,
            transform: self.transform,
        }
    }
}

impl<D> Glyphset<D> {
    /// Create a glyphset with the identity transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] if `glyphs` and `data` differ in length.
    pub fn new(glyphs: Vec<Glyph>, data: Vec<D>, shape: ShapeCode) -> Result<Self> {
        if glyphs.len() != data.len() {
            return Err(Error::DataLengthMismatch {
                glyphs: glyphs.len(),
                data: data.len(),
            });
        }
        let len = glyphs.len();
        Ok(Self {
            glyphs: glyphs.into(),
            data: data.into(),
            range: 0..len,
            shape,
            transform: ViewTransform::IDENTITY,
        })
    }

    /// Build a glyphset by running `shaper` over raw rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] if `rows` and `data` differ in length.
    pub fn from_rows<R, S: Shaper<R>>(rows: &[R], data: Vec<D>, shaper: &S) -> Result<Self> {
        let glyphs = rows.iter().map(|row| shaper.shape(row)).collect();
        Self::new(glyphs, data, shaper.shape_code())
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether the glyphset holds no glyphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Shape code shared by all glyphs.
    #[must_use]
    pub const fn shape_code(&self) -> ShapeCode {
        self.shape
    }

    /// Pending view transform.
    #[must_use]
    pub const fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Glyphs in data space, before the pending transform.
    #[must_use]
    pub fn raw_glyphs(&self) -> &[Glyph] {
        &self.glyphs[self.range.clone()]
    }

    /// Data values, parallel to the glyphs.
    #[must_use]
    pub fn data(&self) -> &[D] {
        &self.data[self.range.clone()]
    }

    /// A new glyphset whose transform applies `vt` after the current one.
    #[must_use]
    pub fn project(&self, vt: &ViewTransform) -> Self {
        let transform = self.transform.then(vt);
        crate::log::debug!(
            glyphs = self.len(),
            tx = transform.tx,
            ty = transform.ty,
            sx = transform.sx,
            sy = transform.sy,
            "projected glyphset"
        );
        Self {
            transform,
            ..self.clone()
        }
    }

    /// Glyphs with the pending transform applied.
    pub fn points(&self) -> impl Iterator<Item = Glyph> + '_ {
        let vt = self.transform;
        self.raw_glyphs().iter().map(move |g| vt.apply(*g))
    }

    /// Transformed glyphs snapped to integer pixel coordinates.
    ///
    /// Coordinates are floored. A point becomes the one-pixel cell
    /// `[x, y, x + 1, y + 1]`. A rectangle is normalized to min/max corners
    /// (a flipping transform swaps them) and an axis that rounds to zero is
    /// widened to one pixel. Line endpoints are kept as given.
    pub fn pixels(&self) -> impl Iterator<Item = [i64; 4]> + '_ {
        let shape = self.shape;
        self.points().map(move |g| realize(g, shape))
    }

    /// Transformed glyphs paired with their data values.
    pub fn iter(&self) -> impl Iterator<Item = (Glyph, &D)> + '_ {
        self.points().zip(self.data())
    }

    /// Minimal box covering every transformed glyph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] for an empty glyphset.
    pub fn bounds(&self) -> Result<Bounds> {
        if self.is_empty() {
            return Err(Error::EmptyData);
        }
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for g in self.points() {
            let (x0, x1) = g.x_extent(self.shape);
            let (y0, y1) = g.y_extent(self.shape);
            min_x = min_x.min(x0);
            max_x = max_x.max(x1);
            min_y = min_y.min(y0);
            max_y = max_y.max(y1);
        }
        Ok(Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Contiguous partitions of at most `chunk` glyphs each, sharing storage.
    ///
    /// A `chunk` of zero is treated as one.
    #[must_use]
    pub fn split(&self, chunk: usize) -> Vec<Self> {
        let chunk = chunk.max(1);
        let mut parts = Vec::with_capacity(self.len().div_ceil(chunk));
        let mut start = self.range.start;
        while start < self.range.end {
            let end = (start + chunk).min(self.range.end);
            parts.push(Self {
                range: start..end,
                ..self.clone()
            });
            start = end;
        }
        parts
    }
}

fn realize(glyph: Glyph, shape: ShapeCode) -> [i64; 4] {
    let [a, b, c, d] = glyph.0.map(|v| v.floor() as i64);
    match shape {
        ShapeCode::Point => [a, b, a + 1, b + 1],
        ShapeCode::Line => [a, b, c, d],
        ShapeCode::Rect => {
            let (left, right) = (a.min(c), a.max(c));
            let (top, bottom) = (b.min(d), b.max(d));
            [left, top, right.max(left.saturating_add(1)), bottom.max(top.saturating_add(1))]
        }
    }
}
