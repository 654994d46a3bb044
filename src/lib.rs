//! # Trueno-AR
//!
//! Abstract rendering on [trueno](https://crates.io/crates/trueno): large glyph
//! datasets are first aggregated into dense per-pixel grids, and only then
//! turned into colors by a chain of shaders.
//!
//! ## Pipeline
//!
//! 1. A [`Glyphset`](glyphset::Glyphset) of points, rectangles or lines is
//!    projected into pixel space with a [`ViewTransform`](geometry::ViewTransform)
//!    (typically from [`zoom_fit`](geometry::zoom_fit)).
//! 2. An [`Aggregator`](aggregate::Aggregator) folds every glyph's info value
//!    into a [`Grid`](grid::Grid), optionally in partitions that are rolled up.
//! 3. A [`Shader`](shade::Shader) chain maps the grid to another grid or to a
//!    final [`Framebuffer`](framebuffer::Framebuffer).
//!
//! ## Quick Start
//!
//! ```
//! use trueno_ar::prelude::*;
//!
//! let glyphs = Glyphset::new(
//!     vec![Glyph::point(0.0, 0.0), Glyph::point(0.0, 0.0), Glyph::point(3.0, 3.0)],
//!     vec![(); 3],
//!     ShapeCode::Point,
//! )?;
//! let vt = zoom_fit((4, 4), Bounds::new(0.0, 0.0, 4.0, 4.0), true)?;
//! let shader = Seq::new(Sqrt).then(InterpolateColors::new(Rgba::WHITE, Rgba::RED))?;
//!
//! let raster = render(&glyphs, &infos::constant(1.0f32), &Count, &shader, (4, 4), &vt)?;
//! let image = raster.into_image()?;
//! assert_eq!(image.get_pixel(0, 0), Some(Rgba::RED));
//! assert_eq!(image.get_pixel(1, 0), Some(Rgba::WHITE));
//! # Ok::<(), trueno_ar::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel`: partitioned aggregation with rayon
//! - `tracing`: debug logging of pipeline stages
//! - `serde`: serializable render parameters

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

mod log;

// ============================================================================
// Core Modules
// ============================================================================

/// Color types.
pub mod color;

/// RGBA byte images produced by color shaders.
pub mod framebuffer;

/// Glyph geometry, bounds and view transforms.
pub mod geometry;

/// Dense aggregate grids.
pub mod grid;

// ============================================================================
// Pipeline Modules
// ============================================================================

/// Glyph collections and shapers.
pub mod glyphset;

/// Info functions extracting values from glyph data.
pub mod infos;

/// Rasterization primitives.
pub mod render;

/// Aggregators folding glyphs into grids.
pub mod aggregate;

/// Shaders mapping grids to grids or images.
pub mod shade;

/// Numeric and calendar binning.
pub mod binning;

/// Output encoders and display sinks.
pub mod output;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-ar operations.
pub mod error;

pub use error::{Error, Result};

use aggregate::Aggregator;
use geometry::{Glyph, ViewTransform};
use glyphset::Glyphset;
use shade::{Raster, Shader};

/// Project, aggregate and shade `glyphs` onto a `(width, height)` screen.
///
/// Each glyph's value comes from `info`; the aggregate grid is then handed to
/// `shader`. The result is whatever the last shader stage emits.
///
/// # Errors
///
/// Propagates aggregation and shading errors.
pub fn render<D, V, A, I, S>(
    glyphs: &Glyphset<D>,
    info: &I,
    aggregator: &A,
    shader: &S,
    screen: (u32, u32),
    vt: &ViewTransform,
) -> Result<Raster>
where
    A: Aggregator<V>,
    I: Fn(&Glyph, &D) -> V,
    S: Shader + ?Sized,
{
    let projected = glyphs.project(vt);
    let grid = aggregator.aggregate(&projected, info, screen)?;
    crate::log::debug!(shader = shader.name(), "shading aggregates");
    shader.shade(Raster::Grid(grid))
}

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use trueno_ar::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aggregate::{aggregate_chunked, Aggregator, CategoryOrder, Count, CountCategories, Sum};
    pub use crate::binning::{bin, bin1d, bin_range, CalendarStep, Dimension, Reduction, TimeUnit};
    pub use crate::color::Rgba;
    pub use crate::error::{Error, Result};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::geometry::{zoom_fit, Bounds, Glyph, ShapeCode, ViewTransform};
    pub use crate::glyphset::{Glyphset, ToLine, ToPoint, ToRect};
    pub use crate::grid::Grid;
    pub use crate::infos;
    pub use crate::output::{DisplaySink, PngEncoder, PngSink};
    pub use crate::render;
    pub use crate::shade::{
        BinarySegment, CellShader, Contour, Cuberoot, Floor, GridShader, HdAlpha, Id, Interpolate,
        InterpolateColors, MinPercent, Power, Raster, Select, Seq, Shader, ShapeShader, Spread,
        SpreadShape, Sqrt, ToCounts,
    };
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
