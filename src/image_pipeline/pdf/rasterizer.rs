use image::DynamicImage;

use crate::image_pipeline::common::error::Result;

pub trait PdfRasterizer {
    /// Renders every page of the document at `dpi`, in page order.
    fn render_pages(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>>;
}
