//! DPI-driven downsampling

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

/// Scale factor that brings the page's highest resolution axis down to `target_dpi`.
///
/// Returns `None` when no downsampling is needed; pages are never upsampled.
pub fn downsample_factor(dpi_x: f32, dpi_y: f32, target_dpi: u32) -> Option<f32> {
    let scale = target_dpi as f32 / dpi_x.max(dpi_y);
    (scale < 1.0).then_some(scale)
}

/// Resizes the buffer by `scale` with bilinear filtering. Each side stays at least one pixel.
pub fn resample(image: &DynamicImage, scale: f32) -> DynamicImage {
    let width = ((image.width() as f32 * scale).round() as u32).max(1);
    let height = ((image.height() as f32 * scale).round() as u32).max(1);
    let resized = image.resize_exact(width, height, FilterType::Triangle);

    debug!(
        from_w = image.width(),
        from_h = image.height(),
        to_w = width,
        to_h = height,
        scale,
        "Resampled page"
    );
    resized
}
