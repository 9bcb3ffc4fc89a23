use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::page::PageImage;
use crate::image_pipeline::pdf::types::PdfCompression;

pub trait PdfDocumentWriter {
    /// Embeds each page as a full-page image and serializes the document.
    ///
    /// Page `i` of the output is `pages[i]`, sized from its pixel dimensions and DPI.
    fn encode(&self, pages: &[PageImage], compression: PdfCompression, jpeg_quality: f32) -> Result<Vec<u8>>;
}
