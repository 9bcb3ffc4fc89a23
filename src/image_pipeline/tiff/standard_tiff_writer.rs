use std::io::{Cursor, Seek, Write};

use image::DynamicImage;
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{Rational, TiffEncoder, TiffValue};
use tiff::tags::{ResolutionUnit, Tag};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::page::PageImage;
use crate::image_pipeline::page::color::pack_bi_level;
use crate::image_pipeline::tiff::types::TiffCompression;
use crate::image_pipeline::tiff::writer::TiffWriter;

/// Denominator used when storing resolutions as TIFF rationals.
const RESOLUTION_SCALE: u32 = 10_000;

pub struct StandardTiffWriter;

impl TiffWriter for StandardTiffWriter {
    fn encode(&self, pages: &[PageImage], compression: &str) -> Result<Vec<u8>> {
        let compression = TiffCompression::from_name(compression)?;
        if pages.is_empty() {
            return Err(ConversionError::NoPages);
        }
        debug!(pages = pages.len(), compression = compression.name(), "Encoding TIFF");

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?
            .with_compression(to_tiff_compression(compression));

        for page in pages {
            write_dynamic(&mut encoder, page)?;
        }
        drop(encoder);

        debug!(bytes = buffer.len(), "TIFF encoding complete");
        Ok(buffer)
    }
}

fn to_tiff_compression(compression: TiffCompression) -> tiff::encoder::Compression {
    match compression {
        TiffCompression::None => tiff::encoder::Compression::Uncompressed,
        TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
        TiffCompression::Deflate => tiff::encoder::Compression::Deflate(
            tiff::encoder::compression::DeflateLevel::Balanced,
        ),
        TiffCompression::PackBits => tiff::encoder::Compression::Packbits,
    }
}

fn write_dynamic<W: Write + Seek>(encoder: &mut TiffEncoder<W>, page: &PageImage) -> Result<()> {
    if page.bi_level {
        return write_bi_level(encoder, page);
    }
    match &page.image {
        DynamicImage::ImageLuma8(buf) => write_page::<W, colortype::Gray8>(encoder, page, buf.as_raw()),
        DynamicImage::ImageLuma16(buf) => write_page::<W, colortype::Gray16>(encoder, page, buf.as_raw()),
        DynamicImage::ImageRgb8(buf) => write_page::<W, colortype::RGB8>(encoder, page, buf.as_raw()),
        DynamicImage::ImageRgb16(buf) => write_page::<W, colortype::RGB16>(encoder, page, buf.as_raw()),
        DynamicImage::ImageRgba8(buf) => write_page::<W, colortype::RGBA8>(encoder, page, buf.as_raw()),
        DynamicImage::ImageRgba16(buf) => write_page::<W, colortype::RGBA16>(encoder, page, buf.as_raw()),
        other => {
            let rgba = other.to_rgba8();
            write_page::<W, colortype::RGBA8>(encoder, page, rgba.as_raw())
        }
    }
}

fn write_page<W, C>(encoder: &mut TiffEncoder<W>, page: &PageImage, data: &[C::Inner]) -> Result<()>
where
    W: Write + Seek,
    C: ColorType,
    [C::Inner]: TiffValue,
{
    let mut image = encoder
        .new_image::<C>(page.width(), page.height())
        .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

    image.resolution_unit(ResolutionUnit::Inch);
    image.x_resolution(rational_from_dpi(page.dpi_x));
    image.y_resolution(rational_from_dpi(page.dpi_y));

    image
        .write_data(data)
        .map_err(|e| ConversionError::EncodeError(e.to_string()))
}

/// Writes a 1-bit BlackIsZero page.
///
/// The encoder sizes strips in whole samples, so the packed rows go in as a Gray8 image
/// one packed row wide and the width and bit depth tags are corrected before the
/// directory is finished.
fn write_bi_level<W: Write + Seek>(encoder: &mut TiffEncoder<W>, page: &PageImage) -> Result<()> {
    let packed = pack_bi_level(&page.image);
    let row_bytes = page.width().div_ceil(8);

    let mut image = encoder
        .new_image::<colortype::Gray8>(row_bytes, page.height())
        .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

    image
        .encoder()
        .write_tag(Tag::ImageWidth, page.width())
        .map_err(|e| ConversionError::EncodeError(e.to_string()))?;
    image
        .encoder()
        .write_tag(Tag::BitsPerSample, 1u16)
        .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

    image.resolution_unit(ResolutionUnit::Inch);
    image.x_resolution(rational_from_dpi(page.dpi_x));
    image.y_resolution(rational_from_dpi(page.dpi_y));

    image
        .write_data(&packed)
        .map_err(|e| ConversionError::EncodeError(e.to_string()))
}

fn rational_from_dpi(dpi: f32) -> Rational {
    Rational {
        n: (dpi * RESOLUTION_SCALE as f32).round() as u32,
        d: RESOLUTION_SCALE,
    }
}
