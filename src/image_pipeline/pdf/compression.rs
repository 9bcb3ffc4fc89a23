//! Per-page codec choice for PDF image XObjects

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::page::PageImage;
use crate::image_pipeline::page::color::{flatten_to_gray, flatten_to_rgb, pack_bi_level};
use crate::image_pipeline::pdf::types::PdfCompression;

/// PDF stream filter applied to the image samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    DctDecode,
    FlateDecode,
}

impl ImageFilter {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ImageFilter::DctDecode => "DCTDecode",
            ImageFilter::FlateDecode => "FlateDecode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageColorSpace {
    DeviceRgb,
    DeviceGray,
}

impl ImageColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ImageColorSpace::DeviceRgb => "DeviceRGB",
            ImageColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// A page image already compressed for embedding
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub filter: ImageFilter,
    pub color_space: ImageColorSpace,
    pub bits_per_component: u8,
    pub width: u32,
    pub height: u32,
}

/// Result of the lossy path, consumed by the automatic fallback.
#[derive(Debug)]
pub enum LossyOutcome {
    Encoded(EncodedImage),
    CodecFailed(String),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CompressionSelector;

impl CompressionSelector {
    pub fn new() -> Self {
        Self
    }

    pub fn select(
        &self,
        page: &PageImage,
        strategy: PdfCompression,
        jpeg_quality: f32,
    ) -> Result<EncodedImage> {
        let bi_level = page.is_bi_level();
        match strategy {
            PdfCompression::Jpeg => match encode_jpeg(&page.image, jpeg_quality) {
                LossyOutcome::Encoded(encoded) => Ok(encoded),
                LossyOutcome::CodecFailed(reason) => Err(ConversionError::EncodeError(reason)),
            },
            PdfCompression::Lossless => encode_lossless(page, bi_level),
            PdfCompression::Ccitt => {
                // TODO: emit CCITTFaxDecode (Group 4) streams for bi-level pages
                warn!("CCITT compression is not implemented, using lossless encoding");
                encode_lossless(page, bi_level)
            }
            PdfCompression::Auto => {
                if bi_level {
                    debug!("Bi-level page, using lossless encoding");
                    return encode_lossless(page, true);
                }
                with_lossless_fallback(encode_jpeg(&page.image, jpeg_quality), page)
            }
        }
    }
}

fn with_lossless_fallback(outcome: LossyOutcome, page: &PageImage) -> Result<EncodedImage> {
    match outcome {
        LossyOutcome::Encoded(encoded) => Ok(encoded),
        LossyOutcome::CodecFailed(reason) => {
            warn!(%reason, "JPEG encoding failed, falling back to lossless");
            encode_lossless(page, false)
        }
    }
}

/// JPEG has no alpha channel, so transparent pixels are composited onto white first.
fn encode_jpeg(image: &DynamicImage, quality: f32) -> LossyOutcome {
    let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut data = Vec::new();

    let (result, color_space, width, height) = {
        let mut encoder = JpegEncoder::new_with_quality(&mut data, quality);
        if is_gray(image) {
            let gray = flatten_to_gray(image);
            (encoder.encode_image(&gray), ImageColorSpace::DeviceGray, gray.width(), gray.height())
        } else {
            let rgb = flatten_to_rgb(image);
            (encoder.encode_image(&rgb), ImageColorSpace::DeviceRgb, rgb.width(), rgb.height())
        }
    };

    match result {
        Ok(()) => LossyOutcome::Encoded(EncodedImage {
            data,
            filter: ImageFilter::DctDecode,
            color_space,
            bits_per_component: 8,
            width,
            height,
        }),
        Err(e) => LossyOutcome::CodecFailed(e.to_string()),
    }
}

fn encode_lossless(page: &PageImage, bi_level: bool) -> Result<EncodedImage> {
    let (samples, color_space, bits_per_component) = if bi_level {
        (pack_bi_level(&page.image), ImageColorSpace::DeviceGray, 1)
    } else if is_gray(&page.image) {
        (flatten_to_gray(&page.image).into_raw(), ImageColorSpace::DeviceGray, 8)
    } else {
        (flatten_to_rgb(&page.image).into_raw(), ImageColorSpace::DeviceRgb, 8)
    };

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&samples)
        .map_err(|e| ConversionError::EncodeError(e.to_string()))?;
    let data = encoder
        .finish()
        .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

    Ok(EncodedImage {
        data,
        filter: ImageFilter::FlateDecode,
        color_space,
        bits_per_component,
        width: page.width(),
        height: page.height(),
    })
}

fn is_gray(image: &DynamicImage) -> bool {
    matches!(
        image,
        DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
    )
}
