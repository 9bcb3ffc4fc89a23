//! Page image types

use image::DynamicImage;
use tracing::warn;

use crate::image_pipeline::common::config::{DEFAULT_DPI, POINTS_PER_INCH};

/// Target color mode for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorHint {
    /// Keep whatever pixel format the page already has
    #[default]
    Auto,
    /// 8-bit RGB
    Rgb,
    /// 8-bit grayscale
    Gray,
    /// Black and white, one bit of information per pixel
    Binary,
}

impl std::str::FromStr for ColorHint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorHint::Auto),
            "rgb" => Ok(ColorHint::Rgb),
            "gray" | "grey" | "grayscale" => Ok(ColorHint::Gray),
            "binary" | "bilevel" | "bw" => Ok(ColorHint::Binary),
            other => Err(format!("unknown color mode '{other}'")),
        }
    }
}

/// A decoded raster page with its physical resolution and TIFF orientation
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Pixel buffer
    pub image: DynamicImage,
    /// Horizontal pixels per inch
    pub dpi_x: f32,
    /// Vertical pixels per inch
    pub dpi_y: f32,
    /// TIFF orientation code, 1 is upright
    pub orientation: u16,
    /// Samples are pure black/white and originate from a 1-bit source or conversion
    pub bi_level: bool,
}

impl PageImage {
    /// Wraps a pixel buffer. Non-positive or non-finite resolutions fall back to 72 DPI.
    pub fn new(image: DynamicImage, dpi_x: f32, dpi_y: f32) -> Self {
        Self {
            image,
            dpi_x: sanitize_dpi(dpi_x),
            dpi_y: sanitize_dpi(dpi_y),
            orientation: 1,
            bi_level: false,
        }
    }

    pub fn with_orientation(mut self, orientation: u16) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_bi_level(mut self, bi_level: bool) -> Self {
        self.bi_level = bi_level;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Page width in PDF points at the page's own resolution.
    pub fn width_points(&self) -> f32 {
        self.width() as f32 * POINTS_PER_INCH / self.dpi_x
    }

    /// Page height in PDF points at the page's own resolution.
    pub fn height_points(&self) -> f32 {
        self.height() as f32 * POINTS_PER_INCH / self.dpi_y
    }

    /// True for 1-bit pages, either flagged at decode time or a luma buffer holding only 0 and 255.
    pub fn is_bi_level(&self) -> bool {
        if self.bi_level {
            return true;
        }
        match &self.image {
            DynamicImage::ImageLuma8(gray) => gray.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255),
            _ => false,
        }
    }
}

fn sanitize_dpi(dpi: f32) -> f32 {
    if dpi.is_finite() && dpi > 0.0 {
        dpi
    } else {
        warn!(dpi, "Invalid page resolution, using {} DPI", DEFAULT_DPI);
        DEFAULT_DPI
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    #[test]
    fn test_points_follow_dpi() {
        let page = PageImage::new(DynamicImage::ImageRgb8(RgbImage::new(300, 600)), 300.0, 150.0);
        assert!((page.width_points() - 72.0).abs() < 1e-4);
        assert!((page.height_points() - 288.0).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_dpi_falls_back() {
        let page = PageImage::new(DynamicImage::ImageRgb8(RgbImage::new(1, 1)), 0.0, f32::NAN);
        assert_eq!(page.dpi_x, DEFAULT_DPI);
        assert_eq!(page.dpi_y, DEFAULT_DPI);
    }

    #[test]
    fn test_bi_level_detection() {
        let bw = GrayImage::from_fn(4, 4, |x, _| if x % 2 == 0 { Luma([0]) } else { Luma([255]) });
        assert!(PageImage::new(DynamicImage::ImageLuma8(bw), 72.0, 72.0).is_bi_level());

        let gray = GrayImage::from_pixel(4, 4, Luma([128]));
        assert!(!PageImage::new(DynamicImage::ImageLuma8(gray), 72.0, 72.0).is_bi_level());

        let rgb = RgbImage::new(2, 2);
        let flagged = PageImage::new(DynamicImage::ImageRgb8(rgb), 72.0, 72.0).with_bi_level(true);
        assert!(flagged.is_bi_level());
    }

    #[test]
    fn test_color_hint_parsing() {
        assert_eq!("GRAY".parse::<ColorHint>(), Ok(ColorHint::Gray));
        assert_eq!("binary".parse::<ColorHint>(), Ok(ColorHint::Binary));
        assert!("cmyk".parse::<ColorHint>().is_err());
    }
}
