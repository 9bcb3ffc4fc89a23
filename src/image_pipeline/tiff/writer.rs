use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::page::PageImage;

pub trait TiffWriter {
    /// Encodes the pages as one multi-page TIFF using the named compression.
    ///
    /// Fails with `CodecUnavailable` when no encoder is registered for `compression`.
    fn encode(&self, pages: &[PageImage], compression: &str) -> Result<Vec<u8>>;
}
