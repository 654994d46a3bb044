//! Glyph geometry and view transforms.
//!
//! A glyph is four numbers whose meaning depends on its [`ShapeCode`]. A
//! [`ViewTransform`] maps data space to pixel space as
//! `screen = data * (sx, sy) + (tx, ty)`.

use crate::error::{Error, Result};

/// How the four fields of a [`Glyph`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeCode {
    /// `[x, y, _, _]`: a single position.
    #[default]
    Point,
    /// `[x1, y1, x2, y2]`: a segment between two endpoints (order-independent).
    Line,
    /// `[x, y, x + w, y + h]`: an axis-aligned box with exclusive upper bound.
    Rect,
}

/// Four glyph coordinates; see [`ShapeCode`] for their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Glyph(pub [f32; 4]);

impl Glyph {
    /// Create a glyph from its four fields.
    #[must_use]
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self([a, b, c, d])
    }

    /// A point glyph at `(x, y)`.
    #[must_use]
    pub const fn point(x: f32, y: f32) -> Self {
        Self([x, y, 0.0, 0.0])
    }

    /// Horizontal extent `(min, max)` under the given shape code.
    #[must_use]
    pub fn x_extent(&self, code: ShapeCode) -> (f32, f32) {
        let [a, _, c, _] = self.0;
        match code {
            ShapeCode::Point => (a, a),
            ShapeCode::Line | ShapeCode::Rect => (a.min(c), a.max(c)),
        }
    }

    /// Vertical extent `(min, max)` under the given shape code.
    #[must_use]
    pub fn y_extent(&self, code: ShapeCode) -> (f32, f32) {
        let [_, b, _, d] = self.0;
        match code {
            ShapeCode::Point => (b, b),
            ShapeCode::Line | ShapeCode::Rect => (b.min(d), b.max(d)),
        }
    }
}

impl From<[f32; 4]> for Glyph {
    fn from(v: [f32; 4]) -> Self {
        Self(v)
    }
}

/// Axis-aligned bounding box `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Bounds {
    /// Create a new bounding box.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge.
    #[must_use]
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }
}

/// Affine map `(tx, ty, sx, sy)` from data space to pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewTransform {
    /// X translation.
    pub tx: f32,
    /// Y translation.
    pub ty: f32,
    /// X scale.
    pub sx: f32,
    /// Y scale.
    pub sy: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    /// The transform that leaves coordinates unchanged.
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Create a new view transform.
    #[must_use]
    pub const fn new(tx: f32, ty: f32, sx: f32, sy: f32) -> Self {
        Self { tx, ty, sx, sy }
    }

    /// Map an x coordinate to pixel space.
    #[inline]
    #[must_use]
    pub fn apply_x(&self, x: f32) -> f32 {
        x * self.sx + self.tx
    }

    /// Map a y coordinate to pixel space.
    #[inline]
    #[must_use]
    pub fn apply_y(&self, y: f32) -> f32 {
        y * self.sy + self.ty
    }

    /// Map all four glyph fields (`a`, `c` are x-like; `b`, `d` are y-like).
    #[must_use]
    pub fn apply(&self, glyph: Glyph) -> Glyph {
        let [a, b, c, d] = glyph.0;
        Glyph([self.apply_x(a), self.apply_y(b), self.apply_x(c), self.apply_y(d)])
    }

    /// Compose `self` followed by `outer`.
    ///
    /// `outer.apply(self.apply(p)) == self.then(outer).apply(p)`:
    /// `(p*s1 + t1)*s2 + t2 = p*(s1*s2) + (t1*s2 + t2)`.
    #[must_use]
    pub fn then(&self, outer: &Self) -> Self {
        Self::new(
            self.tx * outer.sx + outer.tx,
            self.ty * outer.sy + outer.ty,
            self.sx * outer.sx,
            self.sy * outer.sy,
        )
    }

    /// Whether this is the identity transform.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Compute the transform that fits `bounds` into a `screen` of `(width, height)`.
///
/// When `balanced`, both axes share the larger of the two per-axis ratios so
/// the aspect ratio is preserved.
///
/// # Errors
///
/// Returns [`Error::DegenerateBounds`] if either bound axis has zero size, and
/// [`Error::InvalidDimensions`] if the screen is empty.
///
/// # Example
///
/// ```
/// use trueno_ar::geometry::{zoom_fit, Bounds, ViewTransform};
///
/// let vt = zoom_fit((10, 10), Bounds::new(0.0, 0.0, 20.0, 20.0), true).unwrap();
/// assert_eq!(vt, ViewTransform::new(0.0, 0.0, 0.5, 0.5));
/// ```
pub fn zoom_fit(screen: (u32, u32), bounds: Bounds, balanced: bool) -> Result<ViewTransform> {
    let (sw, sh) = screen;
    if sw == 0 || sh == 0 {
        return Err(Error::InvalidDimensions { width: sw, height: sh });
    }
    if bounds.width == 0.0 || bounds.height == 0.0 {
        return Err(Error::DegenerateBounds {
            width: bounds.width,
            height: bounds.height,
        });
    }

    let mut x_ratio = bounds.width / sw as f32;
    let mut y_ratio = bounds.height / sh as f32;
    if balanced {
        x_ratio = x_ratio.max(y_ratio);
        y_ratio = x_ratio;
    }

    // Adding 0.0 normalizes a negated zero origin to +0.0.
    Ok(ViewTransform::new(
        -bounds.x / x_ratio + 0.0,
        -bounds.y / y_ratio + 0.0,
        1.0 / x_ratio,
        1.0 / y_ratio,
    ))
}
