//! Output of shaded images: PNG encoding and display sinks.

mod png_encoder;

pub use png_encoder::PngEncoder;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::framebuffer::Framebuffer;

/// Something that can present a finished image.
pub trait DisplaySink {
    /// Present `image` under `title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be delivered.
    fn show(&mut self, image: &Framebuffer, title: &str) -> Result<()>;
}

/// Writes every shown image to `<dir>/<title>.png`.
#[derive(Debug, Clone)]
pub struct PngSink {
    dir: PathBuf,
}

impl PngSink {
    /// Sink writing into `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a given title is written to.
    #[must_use]
    pub fn path_for(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{title}.png"))
    }
}

impl DisplaySink for PngSink {
    fn show(&mut self, image: &Framebuffer, title: &str) -> Result<()> {
        PngEncoder::write_to_file(image, self.path_for(title))
    }
}
