use tracing::{debug, instrument};

use crate::image_pipeline::page::color::{binarize, convert_color};
use crate::image_pipeline::page::orientation::{apply_orientation, swaps_dimensions, ORIENTATION_NORMAL};
use crate::image_pipeline::page::resample::{downsample_factor, resample};
use crate::image_pipeline::page::types::{ColorHint, PageImage};

/// Turns a decoded page into an upright page in the requested color mode and resolution.
///
/// The returned page always has orientation 1. Its `dpi_x`/`dpi_y` describe the output
/// buffer, so `width_points`/`height_points` give the physical page size.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageNormalizer;

impl PageNormalizer {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, page), fields(width = page.width(), height = page.height(), orientation = page.orientation))]
    pub fn normalize(&self, page: PageImage, color: ColorHint, target_dpi: Option<u32>) -> PageImage {
        let PageImage {
            image,
            mut dpi_x,
            mut dpi_y,
            orientation,
            bi_level,
        } = page;

        let image = apply_orientation(image, orientation);
        // Rotated pages carry their resolution along with the axes.
        if swaps_dimensions(orientation) {
            std::mem::swap(&mut dpi_x, &mut dpi_y);
        }

        let (mut image, converted_bi_level) = convert_color(image, color);
        let bi_level = match color {
            ColorHint::Auto => bi_level,
            _ => converted_bi_level,
        };

        if let Some(scale) = target_dpi.and_then(|dpi| downsample_factor(dpi_x, dpi_y, dpi)) {
            image = resample(&image, scale);
            dpi_x *= scale;
            dpi_y *= scale;
            if bi_level {
                image = image::DynamicImage::ImageLuma8(binarize(&image));
            }
        }

        let page = PageImage {
            image,
            dpi_x,
            dpi_y,
            orientation: ORIENTATION_NORMAL,
            bi_level,
        };

        debug!(
            width = page.width(),
            height = page.height(),
            dpi_x = page.dpi_x,
            dpi_y = page.dpi_y,
            width_pt = page.width_points(),
            height_pt = page.height_points(),
            "Page normalized"
        );
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

    fn page(width: u32, height: u32, dpi_x: f32, dpi_y: f32) -> PageImage {
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 7]));
        PageImage::new(DynamicImage::ImageRgb8(image), dpi_x, dpi_y)
    }

    #[test]
    fn test_never_upsamples() {
        let normalizer = PageNormalizer::new();
        let original = page(60, 30, 300.0, 200.0);
        for target in [300, 301, 600, 1200] {
            let out = normalizer.normalize(original.clone(), ColorHint::Auto, Some(target));
            assert_eq!(out.image, original.image, "target {target}");
            assert_eq!((out.dpi_x, out.dpi_y), (300.0, 200.0));
        }
    }

    #[test]
    fn test_downsample_keeps_physical_size() {
        let normalizer = PageNormalizer::new();
        let original = page(600, 300, 300.0, 300.0);
        let out = normalizer.normalize(original.clone(), ColorHint::Auto, Some(150));
        assert_eq!((out.width(), out.height()), (300, 150));
        assert_eq!(out.dpi_x, 150.0);
        assert!((out.width_points() - original.width_points()).abs() < 0.5);
        assert!((out.height_points() - original.height_points()).abs() < 0.5);
    }

    #[test]
    fn test_rotation_swaps_dimensions_and_dpi() {
        let normalizer = PageNormalizer::new();
        let original = page(40, 20, 100.0, 200.0).with_orientation(6);
        let out = normalizer.normalize(original, ColorHint::Auto, None);
        assert_eq!((out.width(), out.height()), (20, 40));
        assert_eq!((out.dpi_x, out.dpi_y), (200.0, 100.0));
        assert_eq!(out.orientation, 1);
    }

    #[test]
    fn test_binary_hint_marks_bi_level() {
        let normalizer = PageNormalizer::new();
        let out = normalizer.normalize(page(8, 8, 72.0, 72.0), ColorHint::Binary, None);
        assert!(out.bi_level);
        assert!(out.is_bi_level());
    }

    #[test]
    fn test_bi_level_survives_resampling() {
        let normalizer = PageNormalizer::new();
        let bw = GrayImage::from_fn(64, 64, |x, y| if (x / 4 + y / 4) % 2 == 0 { Luma([0]) } else { Luma([255]) });
        let original = PageImage::new(DynamicImage::ImageLuma8(bw), 300.0, 300.0).with_bi_level(true);
        let out = normalizer.normalize(original, ColorHint::Auto, Some(100));
        assert!(out.bi_level);
        assert!(out.image.to_luma8().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
