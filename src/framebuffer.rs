//! RGBA byte grid produced by color shaders.
//!
//! Rows are padded to a 64-byte stride so each row starts SIMD-aligned.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Row alignment in bytes.
const ROW_ALIGN: usize = 64;

/// Height x width x 4 byte image, the final output of a shader chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    /// Row-major RGBA bytes, `stride` per row.
    pixels: Vec<u8>,
    stride: usize,
}

impl Framebuffer {
    /// Fully transparent image of `width x height`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] when either side is zero.
    ///
    /// ```
    /// use trueno_ar::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(3, 2).unwrap();
    /// assert_eq!((fb.width(), fb.height()), (3, 2));
    /// assert_eq!(fb.stride(), 64);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let stride = (width as usize * 4).next_multiple_of(ROW_ALIGN);
        Ok(Self {
            width,
            height,
            pixels: vec![0; stride * height as usize],
            stride,
        })
    }

    /// Create a framebuffer of `width x height` with each pixel computed by `f(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Rgba) -> Result<Self> {
        let mut fb = Self::new(width as u32, height as u32)?;
        for (y, row) in fb.rows_mut().enumerate() {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                px.copy_from_slice(&f(x, y).to_array());
            }
        }
        Ok(fb)
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row, padding included.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Visible bytes of row `y` (stride padding excluded).
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        (y < self.height).then(|| self.row_bytes(y as usize))
    }

    fn row_bytes(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.pixels[start..start + self.width as usize * 4]
    }

    fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let visible = self.width as usize * 4;
        self.pixels.chunks_exact_mut(self.stride).map(move |row| &mut row[..visible])
    }

    /// Paint every pixel `color`.
    pub fn clear(&mut self, color: Rgba) {
        let rgba = color.to_array();
        for row in self.rows_mut() {
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
    }

    /// Color at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let i = x as usize * 4;
        let px = self.row(y)?.get(i..i + 4)?;
        Some(Rgba::new(px[0], px[1], px[2], px[3]))
    }

    /// Overwrite the pixel at `(x, y)`; ignored outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            let i = y as usize * self.stride + x as usize * 4;
            self.pixels[i..i + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Tightly packed RGBA bytes, `width * height * 4` long.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        (0..self.height as usize).flat_map(|y| self.row_bytes(y).iter().copied()).collect()
    }
}
