use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::page::PageImage;
use crate::image_pipeline::pdf::compression::{CompressionSelector, EncodedImage};
use crate::image_pipeline::pdf::types::PdfCompression;
use crate::image_pipeline::pdf::writer::PdfDocumentWriter;

const PDF_VERSION: &str = "1.5";
const IMAGE_RESOURCE_NAME: &str = "Im0";

pub struct LopdfWriter {
    selector: CompressionSelector,
}

impl LopdfWriter {
    pub fn new() -> Self {
        Self {
            selector: CompressionSelector::new(),
        }
    }
}

impl Default for LopdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocumentWriter for LopdfWriter {
    fn encode(&self, pages: &[PageImage], compression: PdfCompression, jpeg_quality: f32) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(ConversionError::NoPages);
        }

        let mut builder = ImageDocument::new();
        for (index, page) in pages.iter().enumerate() {
            let encoded = self.selector.select(page, compression, jpeg_quality)?;
            debug!(
                page = index,
                filter = encoded.filter.pdf_name(),
                bytes = encoded.data.len(),
                "Embedded page image"
            );
            builder.embed_page(&encoded, page.width_points(), page.height_points());
        }
        builder.serialize()
    }
}

/// A document under construction whose pages are single full-bleed images.
struct ImageDocument {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl ImageDocument {
    fn new() -> Self {
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    fn embed_page(&mut self, image: &EncodedImage, width_pt: f32, height_pt: f32) {
        let image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => image.color_space.pdf_name(),
            "BitsPerComponent" => i64::from(image.bits_per_component),
            "Filter" => image.filter.pdf_name(),
        };
        // The samples are already compressed with the filter named above.
        let image_id = self
            .doc
            .add_object(Stream::new(image_dict, image.data.clone()).with_compression(false));

        let content = format!(
            "q\n{:.4} 0 0 {:.4} 0 0 cm\n/{} Do\nQ\n",
            width_pt, height_pt, IMAGE_RESOURCE_NAME
        );
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Real(width_pt), Object::Real(height_pt)],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_RESOURCE_NAME => image_id,
                },
            },
        });
        self.kids.push(page_id.into());
    }

    fn serialize(mut self) -> Result<Vec<u8>> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| ConversionError::EncodeError(format!("failed to serialize PDF: {}", e)))?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn page(width: u32, height: u32, dpi: f32) -> PageImage {
        PageImage::new(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 120, 240]))),
            dpi,
            dpi,
        )
    }

    fn media_box(doc: &Document, page_id: ObjectId) -> Vec<f32> {
        doc.get_object(page_id)
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect()
    }

    #[test]
    fn test_pages_sized_from_dpi() {
        let pages = vec![page(300, 150, 300.0), page(144, 72, 72.0)];
        let bytes = LopdfWriter::new().encode(&pages, PdfCompression::Lossless, 0.8).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        assert_eq!(page_ids.len(), 2);

        let first = media_box(&doc, page_ids[0]);
        assert!((first[2] - 72.0).abs() < 1e-3);
        assert!((first[3] - 36.0).abs() < 1e-3);
        let second = media_box(&doc, page_ids[1]);
        assert!((second[2] - 144.0).abs() < 1e-3);
    }

    #[test]
    fn test_image_stream_keeps_filter() {
        let bytes = LopdfWriter::new().encode(&[page(16, 16, 72.0)], PdfCompression::Jpeg, 0.8).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        let filters: Vec<Vec<u8>> = doc
            .objects
            .values()
            .filter_map(|obj| obj.as_stream().ok())
            .filter_map(|stream| stream.dict.get(b"Filter").ok())
            .filter_map(|filter| filter.as_name().ok().map(|n| n.to_vec()))
            .collect();
        assert_eq!(filters, vec![b"DCTDecode".to_vec()]);
    }

    #[test]
    fn test_empty_page_list_is_an_error() {
        let err = LopdfWriter::new().encode(&[], PdfCompression::Auto, 0.8).unwrap_err();
        assert!(matches!(err, ConversionError::NoPages));
    }
}
