use image::DynamicImage;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::tiff::metadata::PageMetadata;

/// A page as it comes out of the container, before metadata interpretation
#[derive(Debug, Clone)]
pub struct DecodedPage {
    pub image: DynamicImage,
    pub metadata: PageMetadata,
    /// The stored samples were one bit deep
    pub bi_level: bool,
}

pub trait TiffPageReader {
    /// Decodes every page of a multi-page TIFF, in directory order.
    fn read_all_pages(&self, data: &[u8]) -> Result<Vec<DecodedPage>>;
}
