//! Rasterization of glyphs into aggregate patches.
//!
//! Aggregators build a patch the size of a glyph's pixel footprint clipped to
//! the screen, draw the glyph into it with these primitives, then accumulate
//! the patch into the aggregate grid.
//!
//! # References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."

mod primitives;

pub use primitives::{draw_line, fill_patch};
