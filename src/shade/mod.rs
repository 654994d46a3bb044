//! Shaders: turn aggregate grids into derived grids or colors.
//!
//! A [`Shader`] maps one [`Raster`] to another. Most shaders fall into one of
//! two kinds:
//!
//! - [`GridShader`]s produce another numeric grid (`Floor`, `Spread`, `Select`, ...),
//! - [`CellShader`]s produce an RGBA [`Framebuffer`] of the same width and
//!   height (`InterpolateColors`, `HdAlpha`, ...). Their output is final, so
//!   a [`Seq`] ending in one cannot be extended.
//!
//! [`ShapeShader`]s such as [`Contour`] sit outside the raster chain and turn a
//! grid into geometry.
//!
//! # Example
//!
//! ```
//! use trueno_ar::color::Rgba;
//! use trueno_ar::grid::Grid;
//! use trueno_ar::shade::{InterpolateColors, Raster, Seq, Shader, Sqrt};
//!
//! let grid = Grid::from_rows(2, 1, vec![0.0, 16.0]).unwrap();
//! let chain = Seq::new(Sqrt).then(InterpolateColors::new(Rgba::WHITE, Rgba::RED)).unwrap();
//! let image = chain.shade(Raster::Grid(grid)).unwrap();
//! assert_eq!(image.as_image().unwrap().get_pixel(1, 0), Some(Rgba::RED));
//! ```

mod categories;
mod contour;
mod numeric;

pub use categories::{HdAlpha, MinPercent, Select, ToCounts};
pub use contour::{Contour, ContourTracer, Polyline};
pub use numeric::{
    BinarySegment, Cuberoot, Floor, Interpolate, InterpolateColors, Power, Spread, SpreadShape, Sqrt,
};

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::grid::Grid;

/// Input or output of a shader.
#[derive(Debug, Clone, PartialEq)]
pub enum Raster {
    /// Numeric aggregate grid, scalar or categorical.
    Grid(Grid),
    /// RGBA image.
    Image(Framebuffer),
}

impl Raster {
    /// Short description of the raster kind, used in errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Grid(g) if g.is_categorical() => "categorical grid",
            Self::Grid(_) => "scalar grid",
            Self::Image(_) => "image",
        }
    }

    /// The grid, if this raster holds one.
    #[must_use]
    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            Self::Grid(g) => Some(g),
            Self::Image(_) => None,
        }
    }

    /// The image, if this raster holds one.
    #[must_use]
    pub fn as_image(&self) -> Option<&Framebuffer> {
        match self {
            Self::Image(fb) => Some(fb),
            Self::Grid(_) => None,
        }
    }

    /// Take the grid out, failing on behalf of `shader` if this is an image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedRaster`] for an image.
    pub fn into_grid(self, shader: &'static str) -> Result<Grid> {
        match self {
            Self::Grid(g) => Ok(g),
            Self::Image(_) => Err(Error::UnsupportedRaster {
                shader,
                found: "image",
            }),
        }
    }

    /// Take the image out, failing if this is a grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedRaster`] for a grid.
    pub fn into_image(self) -> Result<Framebuffer> {
        match self {
            Self::Image(fb) => Ok(fb),
            other => Err(Error::UnsupportedRaster {
                shader: "into_image",
                found: other.kind(),
            }),
        }
    }
}

impl From<Grid> for Raster {
    fn from(grid: Grid) -> Self {
        Self::Grid(grid)
    }
}

impl From<Framebuffer> for Raster {
    fn from(fb: Framebuffer) -> Self {
        Self::Image(fb)
    }
}

/// A step of the shading chain.
pub trait Shader {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Shade one raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedRaster`] if the shader cannot process the
    /// raster kind it is given.
    fn shade(&self, raster: Raster) -> Result<Raster>;

    /// Whether the output is final colors that no further stage should consume.
    fn is_terminal(&self) -> bool {
        false
    }
}

impl<S: Shader + ?Sized> Shader for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn shade(&self, raster: Raster) -> Result<Raster> {
        (**self).shade(raster)
    }

    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }
}

/// Grid-to-grid shader.
pub trait GridShader {
    /// Shade a numeric grid into another numeric grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid has the wrong rank for this shader.
    fn shade_grid(&self, grid: &Grid) -> Result<Grid>;
}

/// Grid-to-color shader evaluated per pixel.
pub trait CellShader {
    /// Color for one pixel, given all its category values.
    fn shade_cell(&self, pixel: &[f32]) -> Rgba;

    /// Color every pixel of `grid`.
    ///
    /// Shaders that need whole-grid statistics override this.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is empty or has the wrong rank.
    fn shade_image(&self, grid: &Grid) -> Result<Framebuffer> {
        Framebuffer::from_fn(grid.width(), grid.height(), |x, y| self.shade_cell(grid.pixel(x, y)))
    }
}

/// Grid-to-geometry shader.
pub trait ShapeShader {
    /// Geometry produced.
    type Shape;

    /// Derive geometry from a grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid cannot be traced.
    fn fuse(&self, grid: &Grid) -> Result<Self::Shape>;
}

/// Implements [`Shader`] for [`GridShader`] types.
macro_rules! grid_shader {
    ($($ty:ident),* $(,)?) => {$(
        impl $crate::shade::Shader for $ty {
            fn name(&self) -> &'static str {
                stringify!($ty)
            }

            fn shade(&self, raster: $crate::shade::Raster) -> $crate::error::Result<$crate::shade::Raster> {
                let grid = raster.into_grid(stringify!($ty))?;
                $crate::shade::GridShader::shade_grid(self, &grid).map($crate::shade::Raster::Grid)
            }
        }
    )*};
}

/// Implements [`Shader`] for [`CellShader`] types.
macro_rules! cell_shader {
    ($($ty:ident),* $(,)?) => {$(
        impl $crate::shade::Shader for $ty {
            fn name(&self) -> &'static str {
                stringify!($ty)
            }

            fn shade(&self, raster: $crate::shade::Raster) -> $crate::error::Result<$crate::shade::Raster> {
                let grid = raster.into_grid(stringify!($ty))?;
                $crate::shade::CellShader::shade_image(self, &grid).map($crate::shade::Raster::Image)
            }

            fn is_terminal(&self) -> bool {
                true
            }
        }
    )*};
}

pub(crate) use {cell_shader, grid_shader};

/// Fail unless `grid` carries a category axis.
pub(crate) fn require_categorical(grid: &Grid, shader: &'static str) -> Result<()> {
    if grid.is_categorical() {
        Ok(())
    } else {
        Err(Error::UnsupportedRaster {
            shader,
            found: "scalar grid",
        })
    }
}

/// Fail if `grid` carries a category axis.
pub(crate) fn require_scalar(grid: &Grid, shader: &'static str) -> Result<()> {
    if grid.is_categorical() {
        Err(Error::UnsupportedRaster {
            shader,
            found: "categorical grid",
        })
    } else {
        Ok(())
    }
}

/// Pass-through placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id;

impl Shader for Id {
    fn name(&self) -> &'static str {
        "Id"
    }

    fn shade(&self, raster: Raster) -> Result<Raster> {
        Ok(raster)
    }
}

/// Shaders applied in order, each consuming the previous one's output.
#[derive(Default)]
pub struct Seq {
    stages: Vec<Box<dyn Shader>>,
}

impl std::fmt::Debug for Seq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.stages.iter().map(|s| s.name())).finish()
    }
}

impl Seq {
    /// A sequence starting with `first`.
    #[must_use]
    pub fn new(first: impl Shader + 'static) -> Self {
        Self {
            stages: vec![Box::new(first)],
        }
    }

    /// Append `next` as the final stage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SequenceTerminated`] if the current last stage
    /// produces colors.
    pub fn then(mut self, next: impl Shader + 'static) -> Result<Self> {
        self.extend(Box::new(next))?;
        Ok(self)
    }

    /// Append a boxed stage in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SequenceTerminated`] if the current last stage
    /// produces colors.
    pub fn extend(&mut self, next: Box<dyn Shader>) -> Result<()> {
        if let Some(last) = self.stages.last().filter(|s| s.is_terminal()) {
            return Err(Error::SequenceTerminated(last.name()));
        }
        self.stages.push(next);
        Ok(())
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the sequence has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Shader for Seq {
    fn name(&self) -> &'static str {
        "Seq"
    }

    fn shade(&self, raster: Raster) -> Result<Raster> {
        self.stages.iter().try_fold(raster, |acc, stage| {
            crate::log::debug!(shader = stage.name(), input = acc.kind(), "shading");
            stage.shade(acc)
        })
    }

    fn is_terminal(&self) -> bool {
        self.stages.last().is_some_and(|s| s.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Grid {
        Grid::from_rows(3, 1, vec![1.0, 4.0, 9.0]).unwrap()
    }

    #[test]
    fn test_id_passes_through() {
        let out = Id.shade(Raster::Grid(ramp())).unwrap();
        assert_eq!(out, Raster::Grid(ramp()));
    }

    #[test]
    fn test_seq_applies_in_order() {
        let seq = Seq::new(Sqrt).then(Power::new(3.0)).unwrap();
        let out = seq.shade(ramp().into()).unwrap();
        assert_eq!(out.as_grid().unwrap().cells(), &[1.0, 8.0, 27.0]);
        assert_eq!(seq.len(), 2);
        assert!(!seq.is_terminal());
    }

    #[test]
    fn test_seq_terminated_by_cell_shader() {
        let seq = Seq::new(Floor)
            .then(InterpolateColors::new(Rgba::WHITE, Rgba::RED))
            .unwrap();
        assert!(seq.is_terminal());
        let err = seq.then(Id);
        assert!(matches!(err, Err(Error::SequenceTerminated("InterpolateColors"))));
    }

    #[test]
    fn test_seq_nested() {
        let inner = Seq::new(Sqrt);
        let outer = Seq::new(inner).then(Floor).unwrap();
        let out = outer.shade(Grid::from_rows(1, 1, vec![10.0]).unwrap().into()).unwrap();
        assert_eq!(out.as_grid().unwrap().cells(), &[3.0]);
    }

    #[test]
    fn test_grid_shader_rejects_image() {
        let image = Framebuffer::new(2, 2).unwrap();
        let err = Floor.shade(Raster::Image(image));
        assert!(matches!(
            err,
            Err(Error::UnsupportedRaster { shader: "Floor", found: "image" })
        ));
    }

    #[test]
    fn test_raster_accessors() {
        let grid: Raster = ramp().into();
        assert_eq!(grid.kind(), "scalar grid");
        assert!(grid.as_image().is_none());
        assert!(grid.clone().into_image().is_err());
        assert!(grid.into_grid("test").is_ok());
        let cats: Raster = Grid::categorical(1, 1, 2).into();
        assert_eq!(cats.kind(), "categorical grid");
    }
}
