//! Shaders over categorical grids.

use super::{cell_shader, grid_shader, require_categorical, CellShader, GridShader};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::grid::Grid;

/// Extract one category plane as a scalar grid.
#[derive(Debug, Clone, Copy)]
pub struct Select {
    plane: usize,
}

impl Select {
    /// Select plane `plane`.
    #[must_use]
    pub const fn new(plane: usize) -> Self {
        Self { plane }
    }
}

impl GridShader for Select {
    fn shade_grid(&self, grid: &Grid) -> Result<Grid> {
        require_categorical(grid, "Select")?;
        if self.plane >= grid.depth() {
            return Err(Error::UnknownCategory(format!(
                "plane {} of {}",
                self.plane,
                grid.depth()
            )));
        }
        Ok(grid.plane(self.plane))
    }
}

/// Collapse the category axis by summing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToCounts;

impl GridShader for ToCounts {
    fn shade_grid(&self, grid: &Grid) -> Result<Grid> {
        require_categorical(grid, "ToCounts")?;
        Ok(grid.pixel_totals())
    }
}

/// Two-color test on one category's share of each pixel's total.
///
/// Without an explicit category the pixel's dominant category is tested.
/// Pixels with no counts at all are colored `below`.
#[derive(Debug, Clone, Copy)]
pub struct MinPercent {
    cutoff: f32,
    category: Option<usize>,
    above: Rgba,
    below: Rgba,
}

impl MinPercent {
    /// Color pixels whose share reaches `cutoff` (a fraction in `[0, 1]`).
    #[must_use]
    pub const fn new(cutoff: f32) -> Self {
        Self {
            cutoff,
            category: None,
            above: Rgba::rgb(228, 26, 28),
            below: Rgba::rgb(55, 126, 184),
        }
    }

    /// Test a fixed category instead of the dominant one.
    #[must_use]
    pub const fn category(mut self, category: usize) -> Self {
        self.category = Some(category);
        self
    }

    /// Color for pixels meeting the cutoff.
    #[must_use]
    pub const fn above(mut self, color: Rgba) -> Self {
        self.above = color;
        self
    }

    /// Color for pixels under the cutoff.
    #[must_use]
    pub const fn below(mut self, color: Rgba) -> Self {
        self.below = color;
        self
    }
}

impl CellShader for MinPercent {
    fn shade_cell(&self, pixel: &[f32]) -> Rgba {
        let total: f32 = pixel.iter().sum();
        if total == 0.0 {
            return self.below;
        }
        let count = match self.category {
            Some(k) => pixel.get(k).copied().unwrap_or(0.0),
            None => pixel.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        };
        if count / total >= self.cutoff {
            self.above
        } else {
            self.below
        }
    }

    fn shade_image(&self, grid: &Grid) -> Result<Framebuffer> {
        require_categorical(grid, "MinPercent")?;
        if let Some(k) = self.category.filter(|&k| k >= grid.depth()) {
            return Err(Error::UnknownCategory(format!("plane {k} of {}", grid.depth())));
        }
        Framebuffer::from_fn(grid.width(), grid.height(), |x, y| self.shade_cell(grid.pixel(x, y)))
    }
}

/// Blend category colors by count, fading sparse pixels toward transparent.
///
/// Each pixel's RGB is the count-weighted mean of the category colors. Its
/// alpha is the weighted mean color alpha scaled by density: the pixel total
/// over the grid's largest total, lifted so the sparsest nonempty pixel keeps
/// at least `alpha_min`. With `log`, density is `ln(1 + total) / ln(1 + max)`.
/// Empty pixels take `background`.
///
/// # Example
///
/// ```
/// use trueno_ar::color::Rgba;
/// use trueno_ar::grid::Grid;
/// use trueno_ar::shade::{CellShader, HdAlpha};
///
/// let counts = Grid::from_planes_interleaved(1, 1, 2, vec![1.0, 1.0]).unwrap();
/// let img = HdAlpha::new(vec![Rgba::RED, Rgba::BLUE]).shade_image(&counts).unwrap();
/// assert_eq!(img.get_pixel(0, 0), Some(Rgba::new(127, 0, 127, 255)));
/// ```
#[derive(Debug, Clone)]
pub struct HdAlpha {
    colors: Vec<Rgba>,
    alpha_min: f32,
    log: bool,
    background: Rgba,
}

impl HdAlpha {
    /// One color per category plane.
    #[must_use]
    pub fn new(colors: Vec<Rgba>) -> Self {
        Self {
            colors,
            alpha_min: 0.0,
            log: false,
            background: Rgba::TRANSPARENT,
        }
    }

    /// Lowest alpha fraction given to a nonempty pixel.
    #[must_use]
    pub fn alpha_min(mut self, alpha_min: f32) -> Self {
        self.alpha_min = alpha_min.clamp(0.0, 1.0);
        self
    }

    /// Use log-scaled density.
    #[must_use]
    pub fn log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Color for empty pixels.
    #[must_use]
    pub fn background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    fn density(&self, total: f32, max_total: f32) -> f32 {
        let d = if self.log {
            total.ln_1p() / max_total.ln_1p()
        } else {
            total / max_total
        };
        self.alpha_min + (1.0 - self.alpha_min) * d
    }

    fn blend(&self, pixel: &[f32], max_total: f32) -> Rgba {
        let total: f32 = pixel.iter().sum();
        if total <= 0.0 {
            return self.background;
        }
        let mut acc = [0.0f32; 4];
        for (count, color) in pixel.iter().zip(&self.colors) {
            for (slot, channel) in acc.iter_mut().zip(color.to_array()) {
                *slot += count * f32::from(channel);
            }
        }
        let [r, g, b, a] = acc.map(|c| (c / total).clamp(0.0, 255.0));
        let alpha = a * self.density(total, max_total);
        Rgba::new(r as u8, g as u8, b as u8, alpha.clamp(0.0, 255.0) as u8)
    }
}

impl CellShader for HdAlpha {
    /// Blend assuming this pixel is the densest one.
    fn shade_cell(&self, pixel: &[f32]) -> Rgba {
        self.blend(pixel, pixel.iter().sum())
    }

    fn shade_image(&self, grid: &Grid) -> Result<Framebuffer> {
        require_categorical(grid, "HdAlpha")?;
        if self.colors.len() != grid.depth() {
            return Err(Error::ShapeMismatch {
                expected: (grid.height(), grid.width(), self.colors.len()),
                found: grid.shape(),
            });
        }
        let max_total = grid.pixel_totals().value_range().map_or(0.0, |(_, max)| max);
        Framebuffer::from_fn(grid.width(), grid.height(), |x, y| {
            self.blend(grid.pixel(x, y), max_total)
        })
    }
}

grid_shader!(Select, ToCounts);
cell_shader!(MinPercent, HdAlpha);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::{Raster, Shader};

    fn cats(w: usize, h: usize, d: usize, v: &[f32]) -> Grid {
        Grid::from_planes_interleaved(w, h, d, v.to_vec()).unwrap()
    }

    fn rgb() -> Vec<Rgba> {
        vec![Rgba::RED, Rgba::GREEN, Rgba::BLUE]
    }

    #[test]
    fn test_select() {
        let g = cats(2, 1, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(Select::new(1).shade_grid(&g).unwrap().cells(), &[2.0, 4.0]);
        assert!(matches!(Select::new(2).shade_grid(&g), Err(Error::UnknownCategory(_))));
    }

    #[test]
    fn test_select_requires_categories() {
        let err = Select::new(0).shade(Raster::Grid(Grid::scalar(2, 2)));
        assert!(matches!(
            err,
            Err(Error::UnsupportedRaster { shader: "Select", found: "scalar grid" })
        ));
    }

    #[test]
    fn test_to_counts() {
        let g = cats(2, 1, 3, &[1.0, 2.0, 3.0, 0.0, 0.0, 5.0]);
        let out = ToCounts.shade_grid(&g).unwrap();
        assert_eq!(out.cells(), &[6.0, 5.0]);
        assert!(!out.is_categorical());
    }

    #[test]
    fn test_min_percent_fixed_category() {
        let shader = MinPercent::new(0.5).category(0).above(Rgba::WHITE).below(Rgba::BLACK);
        let g = cats(3, 1, 2, &[3.0, 1.0, 1.0, 3.0, 0.0, 0.0]);
        let img = shader.shade_image(&g).unwrap();
        assert_eq!(img.get_pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(img.get_pixel(1, 0), Some(Rgba::BLACK));
        assert_eq!(img.get_pixel(2, 0), Some(Rgba::BLACK));
    }

    #[test]
    fn test_min_percent_dominant_category() {
        let shader = MinPercent::new(0.6).above(Rgba::WHITE).below(Rgba::BLACK);
        let g = cats(2, 1, 3, &[1.0, 1.0, 1.0, 0.0, 1.0, 4.0]);
        let img = shader.shade_image(&g).unwrap();
        assert_eq!(img.get_pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(img.get_pixel(1, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_min_percent_bad_category() {
        let err = MinPercent::new(0.5).category(4).shade_image(&cats(1, 1, 2, &[1.0, 1.0]));
        assert!(matches!(err, Err(Error::UnknownCategory(_))));
    }

    #[test]
    fn test_hd_alpha_background() {
        let g = Grid::categorical(3, 2, 3);
        let background = Rgba::new(1, 2, 3, 4);
        let img = HdAlpha::new(rgb()).background(background).shade_image(&g).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(img.get_pixel(x, y), Some(background));
            }
        }
    }

    #[test]
    fn test_hd_alpha_even_blend() {
        let g = cats(2, 1, 3, &[1.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let img = HdAlpha::new(rgb()).shade_image(&g).unwrap();
        assert_eq!(img.get_pixel(0, 0), Some(Rgba::new(127, 127, 0, 255)));
        assert_eq!(img.get_pixel(1, 0), Some(Rgba::new(0, 0, 255, 127)));
    }

    #[test]
    fn test_hd_alpha_min_and_log() {
        let g = cats(2, 1, 1, &[1.0, 3.0]);
        let img = HdAlpha::new(vec![Rgba::RED]).alpha_min(0.5).shade_image(&g).unwrap();
        // 0.5 + 0.5 * (1 / 3) of 255
        assert_eq!(img.get_pixel(0, 0).map(|c| c.a), Some(170));
        assert_eq!(img.get_pixel(1, 0).map(|c| c.a), Some(255));

        let logged = HdAlpha::new(vec![Rgba::RED]).log(true).shade_image(&g).unwrap();
        // ln(2) / ln(4) == 0.5
        assert_eq!(logged.get_pixel(0, 0).map(|c| c.a), Some(127));
    }

    #[test]
    fn test_hd_alpha_color_count_checked() {
        let g = Grid::categorical(1, 1, 2);
        assert!(matches!(
            HdAlpha::new(rgb()).shade_image(&g),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
