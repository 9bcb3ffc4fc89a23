//! Color-space conversion for page buffers

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use crate::image_pipeline::page::types::ColorHint;

/// Luma threshold at or above which a binarized pixel becomes white.
pub const BINARY_THRESHOLD: u8 = 128;

/// Converts a buffer into the pixel format named by `hint`.
///
/// Returns the converted buffer and whether it is now bi-level. Buffers already in the
/// target format are passed through untouched.
pub fn convert_color(image: DynamicImage, hint: ColorHint) -> (DynamicImage, bool) {
    match hint {
        ColorHint::Auto => (image, false),
        ColorHint::Rgb => match image {
            DynamicImage::ImageRgb8(_) => (image, false),
            other => (DynamicImage::ImageRgb8(flatten_to_rgb(&other)), false),
        },
        ColorHint::Gray => match image {
            DynamicImage::ImageLuma8(_) => (image, false),
            other => (DynamicImage::ImageLuma8(flatten_to_gray(&other)), false),
        },
        ColorHint::Binary => (DynamicImage::ImageLuma8(binarize(&image)), true),
    }
}

/// Composites the buffer onto an opaque white background, yielding 8-bit RGB.
pub fn flatten_to_rgb(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

/// Composites the buffer onto an opaque white background, yielding 8-bit luma.
pub fn flatten_to_gray(image: &DynamicImage) -> GrayImage {
    if !image.color().has_alpha() {
        return image.to_luma8();
    }
    let luma_alpha = image.to_luma_alpha8();
    GrayImage::from_fn(luma_alpha.width(), luma_alpha.height(), |x, y| {
        let [l, a] = luma_alpha.get_pixel(x, y).0;
        Luma([over_white(l, a)])
    })
}

/// Thresholds the buffer to pure black (0) and white (255) samples.
pub fn binarize(image: &DynamicImage) -> GrayImage {
    let mut gray = flatten_to_gray(image);
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] >= BINARY_THRESHOLD { 255 } else { 0 };
    }
    gray
}

/// Packs rows to one bit per pixel, most significant bit first, 1 = white.
///
/// Each row is padded to a whole byte.
pub fn pack_bi_level(image: &DynamicImage) -> Vec<u8> {
    let gray = flatten_to_gray(image);
    let row_bytes = (gray.width() as usize).div_ceil(8);
    let mut packed = vec![0u8; row_bytes * gray.height() as usize];
    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel.0[0] >= BINARY_THRESHOLD {
            packed[y as usize * row_bytes + x as usize / 8] |= 0x80 >> (x % 8);
        }
    }
    packed
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((channel as u32 * a + 255 * (255 - a) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_auto_is_noop() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4])));
        let (out, bi_level) = convert_color(image.clone(), ColorHint::Auto);
        assert_eq!(out, image);
        assert!(!bi_level);
    }

    #[test]
    fn test_same_format_passes_through() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([9, 8, 7])));
        let (out, _) = convert_color(image.clone(), ColorHint::Rgb);
        assert_eq!(out, image);
    }

    #[test]
    fn test_gray_conversion() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 1, Rgb([255, 255, 255])));
        let (out, bi_level) = convert_color(image, ColorHint::Gray);
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
        assert!(!bi_level);
        assert!(out.to_luma8().pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_binary_thresholds() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([[10, 127, 128, 250][x as usize]]));
        let (out, bi_level) = convert_color(DynamicImage::ImageLuma8(gray), ColorHint::Binary);
        assert!(bi_level);
        let samples: Vec<u8> = out.to_luma8().pixels().map(|p| p.0[0]).collect();
        assert_eq!(samples, vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_pack_pads_rows() {
        let gray = GrayImage::from_fn(9, 2, |x, y| Luma([if x == y { 255 } else { 0 }]));
        let packed = pack_bi_level(&DynamicImage::ImageLuma8(gray));
        assert_eq!(packed, vec![0b1000_0000, 0, 0b0100_0000, 0]);
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0])));
        assert_eq!(flatten_to_rgb(&image).get_pixel(0, 0).0, [255, 255, 255]);

        let opaque = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255])));
        assert_eq!(flatten_to_rgb(&opaque).get_pixel(0, 0).0, [10, 20, 30]);
    }
}
