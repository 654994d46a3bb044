//! Color type used by color-producing shaders.
//!
//! Colors are 8-bit RGBA. Construction from wider integers is validated:
//! a channel outside `[0, 255]` is rejected rather than clamped.

use crate::error::{Error, Result};

/// Straight-alpha color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; 255 is opaque.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);

    /// Color from byte channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color from integer channels, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] if any channel lies outside `[0, 255]`.
    ///
    /// # Example
    ///
    /// ```
    /// use trueno_ar::color::Rgba;
    ///
    /// assert!(Rgba::try_new(10, 30, 40, 20).is_ok());
    /// assert!(Rgba::try_new(256, 0, 0, 0).is_err());
    /// ```
    pub fn try_new(r: i32, g: i32, b: i32, a: i32) -> Result<Self> {
        let channel = |name: &str, v: i32| -> Result<u8> {
            u8::try_from(v)
                .map_err(|_| Error::InvalidColor(format!("{name} channel {v} outside [0, 255]")))
        };
        Ok(Self::new(channel("red", r)?, channel("green", g)?, channel("blue", b)?, channel("alpha", a)?))
    }

    /// Channels as `[r, g, b, a]`, the framebuffer byte order.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear interpolation between two colors, each channel independently.
    ///
    /// `t` is clamped to `[0, 1]`; channel values are rounded to nearest.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round().clamp(0.0, 255.0) as u8
        };

        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl TryFrom<[i32; 4]> for Rgba {
    type Error = Error;

    fn try_from(c: [i32; 4]) -> Result<Self> {
        Self::try_new(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(c: Rgba) -> Self {
        c.to_array()
    }
}
