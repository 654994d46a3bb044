//! Crate-wide error enum.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while aggregating, shading or binning.
#[derive(Error, Debug)]
pub enum Error {
    /// Writing an output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The png encoder rejected an image.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Color channel outside `[0, 255]`.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Glyph and data sequences of a glyphset differ in length.
    #[error("Data length mismatch: {glyphs} glyphs but {data} data values")]
    DataLengthMismatch {
        /// Number of glyphs.
        glyphs: usize,
        /// Number of data values.
        data: usize,
    },

    /// A grid, screen or image with a zero-length side.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Zoom-fit against a bounding box with a zero-sized axis.
    #[error("Degenerate bounds: {width}x{height}")]
    DegenerateBounds {
        /// Bounds width.
        width: f32,
        /// Bounds height.
        height: f32,
    },

    /// Bounds, ranges or bins requested over no data.
    #[error("No data to bin or bound")]
    EmptyData,

    /// Grids passed to a rollup do not share one shape.
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Shape of the first grid, `(height, width, depth)`.
        expected: (usize, usize, usize),
        /// Shape of the offending grid.
        found: (usize, usize, usize),
    },

    /// A shader received a raster kind it cannot process.
    #[error("{shader} cannot shade {found}")]
    UnsupportedRaster {
        /// Name of the shader.
        shader: &'static str,
        /// Description of the raster received.
        found: &'static str,
    },

    /// A shader sequence already ends in a color-producing stage.
    #[error("Sequence already terminated by {0}; cannot extend further")]
    SequenceTerminated(&'static str),

    /// A categorical value absent from the shared category ordering.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Non-positive or non-finite bin step.
    #[error("Invalid bin step: {0}")]
    InvalidBinStep(String),
}
