use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

use crate::image_pipeline::common::config::POINTS_PER_INCH;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::pdf::rasterizer::PdfRasterizer;

/// Rasterizer backed by a dynamically loaded PDFium library.
///
/// The library is looked up next to the executable, then in `/opt/pdfium/lib`, then on the
/// system library path. Binding happens per call, so constructing the rasterizer never fails.
pub struct PdfiumRasterizer;

impl PdfRasterizer for PdfiumRasterizer {
    fn render_pages(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>> {
        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| ConversionError::DecodeError(format!("failed to open PDF: {}", e)))?;

        let mut images = Vec::with_capacity(document.pages().len() as usize);
        for (index, page) in document.pages().iter().enumerate() {
            let width = page_pixels(page.width().value, dpi);
            let height = page_pixels(page.height().value, dpi);

            let config = PdfRenderConfig::new()
                .set_target_width(width)
                .set_target_height(height);
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| ConversionError::RasterizeError(format!("page {}: {}", index + 1, e)))?;

            debug!(page = index, width, height, dpi, "Rendered PDF page");
            images.push(bitmap.as_image());
        }
        Ok(images)
    }
}

fn bind_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| ConversionError::RasterizeError(format!("failed to load PDFium: {}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Pixel extent of `points` at `dpi`, at least one pixel.
fn page_pixels(points: f32, dpi: u32) -> i32 {
    ((points * dpi as f32 / POINTS_PER_INCH).round() as i32).max(1)
}
