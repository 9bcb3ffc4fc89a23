//! Multi-page TIFF reader backed by the `tiff` crate.
//!
//! Each directory is decoded into an `image` buffer. The tags the pipeline cares about
//! (resolution, resolution unit, orientation) are copied into a [`PageMetadata`] tree so
//! the metadata reader can interpret them independently of the decoder.

use std::io::{Cursor, Read, Seek};

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use tiff::ColorType;
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::{debug, info};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::tiff::metadata::{
    FieldValue, IfdField, ImageFileDirectory, PageMetadata, TAG_ORIENTATION, TAG_RESOLUTION_UNIT,
    TAG_X_RESOLUTION, TAG_Y_RESOLUTION,
};
use crate::image_pipeline::tiff::reader::{DecodedPage, TiffPageReader};

pub struct StandardTiffReader;

impl TiffPageReader for StandardTiffReader {
    fn read_all_pages(&self, data: &[u8]) -> Result<Vec<DecodedPage>> {
        debug!("Decoding TIFF container, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data))
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

        let mut pages = Vec::new();
        loop {
            let page = read_current_page(&mut decoder)?;
            debug!(
                page = pages.len(),
                width = page.image.width(),
                height = page.image.height(),
                bi_level = page.bi_level,
                "Decoded TIFF page"
            );
            pages.push(page);

            if !decoder.more_images() {
                break;
            }
            decoder
                .next_image()
                .map_err(|e| ConversionError::DecodeError(e.to_string()))?;
        }

        info!("Read {} pages from TIFF", pages.len());
        Ok(pages)
    }
}

fn read_current_page<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<DecodedPage> {
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| ConversionError::DecodeError(e.to_string()))?;
    let color_type = decoder
        .colortype()
        .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

    let metadata = PageMetadata {
        native: Some(read_directory(decoder)),
        dimension: None,
    };

    let result = decoder
        .read_image()
        .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

    let (image, bi_level) = match (color_type, result) {
        (ColorType::Gray(1), DecodingResult::U8(buf)) => {
            (DynamicImage::ImageLuma8(unpack_bi_level(width, height, &buf)?), true)
        }
        (ColorType::Gray(8), DecodingResult::U8(buf)) => {
            (DynamicImage::ImageLuma8(from_raw(width, height, buf)?), false)
        }
        (ColorType::Gray(16), DecodingResult::U16(buf)) => {
            (DynamicImage::ImageLuma16(from_raw(width, height, buf)?), false)
        }
        (ColorType::GrayA(8), DecodingResult::U8(buf)) => {
            (DynamicImage::ImageLumaA8(from_raw(width, height, buf)?), false)
        }
        (ColorType::RGB(8), DecodingResult::U8(buf)) => {
            (DynamicImage::ImageRgb8(from_raw(width, height, buf)?), false)
        }
        (ColorType::RGB(16), DecodingResult::U16(buf)) => {
            (DynamicImage::ImageRgb16(from_raw(width, height, buf)?), false)
        }
        (ColorType::RGBA(8), DecodingResult::U8(buf)) => {
            (DynamicImage::ImageRgba8(from_raw(width, height, buf)?), false)
        }
        (ColorType::RGBA(16), DecodingResult::U16(buf)) => {
            (DynamicImage::ImageRgba16(from_raw(width, height, buf)?), false)
        }
        (ct, _) => {
            return Err(ConversionError::UnsupportedFormat(format!(
                "TIFF color type {:?}",
                ct
            )));
        }
    };

    Ok(DecodedPage {
        image,
        metadata,
        bi_level,
    })
}

fn from_raw<P, T>(width: u32, height: u32, buf: Vec<T>) -> Result<ImageBuffer<P, Vec<T>>>
where
    P: image::Pixel<Subpixel = T>,
{
    ImageBuffer::from_raw(width, height, buf)
        .ok_or(ConversionError::InvalidDimensions(width, height))
}

/// Expands 1-bit rows (padded to whole bytes) into 0/255 luma samples.
///
/// The decoder has already flipped WhiteIsZero strips, so a set bit is always white.
fn unpack_bi_level(width: u32, height: u32, packed: &[u8]) -> Result<GrayImage> {
    let row_bytes = (width as usize).div_ceil(8);
    if packed.len() < row_bytes * height as usize {
        return Err(ConversionError::DecodeError(format!(
            "bi-level strip too short: {} bytes for {}x{}",
            packed.len(),
            width,
            height
        )));
    }

    Ok(GrayImage::from_fn(width, height, |x, y| {
        let byte = packed[y as usize * row_bytes + x as usize / 8];
        let set = byte & (0x80 >> (x % 8)) != 0;
        Luma([if set { 255 } else { 0 }])
    }))
}

fn read_directory<R: Read + Seek>(decoder: &mut Decoder<R>) -> ImageFileDirectory {
    let tags = [
        (Tag::XResolution, TAG_X_RESOLUTION),
        (Tag::YResolution, TAG_Y_RESOLUTION),
        (Tag::ResolutionUnit, TAG_RESOLUTION_UNIT),
        (Tag::Orientation, TAG_ORIENTATION),
    ];

    let mut directory = ImageFileDirectory::new();
    for (tag, number) in tags {
        if let Ok(Some(value)) = decoder.find_tag(tag) {
            if let Some(value) = field_value(value) {
                directory.fields.push(IfdField { number, value });
            }
        }
    }
    directory
}

fn field_value(value: Value) -> Option<FieldValue> {
    match value {
        Value::Rational(n, d) => Some(FieldValue::Rationals(vec![format!("{n}/{d}")])),
        Value::Short(v) => Some(FieldValue::Shorts(vec![v])),
        Value::Unsigned(v) => u16::try_from(v).ok().map(|v| FieldValue::Shorts(vec![v])),
        Value::Ascii(s) => Some(FieldValue::Ascii(s)),
        Value::List(values) => values.into_iter().next().and_then(field_value),
        other => other
            .into_f64()
            .ok()
            .map(|v| FieldValue::Rationals(vec![v.to_string()])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_bi_level() {
        // 10 pixels wide: two bytes per row, last six bits padding
        let packed = [0b1010_0000, 0b1100_0000, 0b0000_0000, 0b0100_0000];
        let image = unpack_bi_level(10, 2, &packed).unwrap();
        let row0: Vec<u8> = (0..10).map(|x| image.get_pixel(x, 0).0[0]).collect();
        assert_eq!(row0, vec![255, 0, 255, 0, 0, 0, 0, 0, 255, 255]);
        assert_eq!(image.get_pixel(9, 1).0[0], 255);
        assert_eq!(image.get_pixel(8, 1).0[0], 0);
    }

    /// Little-endian single-strip 1-bit TIFF, `width` x 1, uncompressed.
    fn one_bit_tiff(width: u16, photometric: u16, strip: u8) -> Vec<u8> {
        const SHORT: u16 = 3;
        const LONG: u16 = 4;
        let entries: [(u16, u16, u32); 9] = [
            (256, SHORT, width as u32),
            (257, SHORT, 1),
            (258, SHORT, 1),
            (259, SHORT, 1),
            (262, SHORT, photometric as u32),
            (273, LONG, 8 + 2 + 9 * 12 + 4),
            (277, SHORT, 1),
            (278, SHORT, 1),
            (279, LONG, 1),
        ];

        let mut bytes = b"II*\0".to_vec();
        bytes.extend_from_slice(&8u32.to_le_bytes());
        bytes.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for (tag, kind, value) in entries {
            bytes.extend_from_slice(&tag.to_le_bytes());
            bytes.extend_from_slice(&kind.to_le_bytes());
            bytes.extend_from_slice(&1u32.to_le_bytes());
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(strip);
        bytes
    }

    fn first_row(page: &DecodedPage) -> Vec<u8> {
        let gray = page.image.to_luma8();
        (0..gray.width()).map(|x| gray.get_pixel(x, 0).0[0]).collect()
    }

    #[test]
    fn test_white_is_zero_page_keeps_polarity() {
        // First four pixels black in WhiteIsZero
        let pages = StandardTiffReader
            .read_all_pages(&one_bit_tiff(8, 0, 0b1111_0000))
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].bi_level);
        assert_eq!(first_row(&pages[0]), vec![0, 0, 0, 0, 255, 255, 255, 255]);
    }

    #[test]
    fn test_black_is_zero_page_keeps_polarity() {
        let pages = StandardTiffReader
            .read_all_pages(&one_bit_tiff(8, 1, 0b1111_0000))
            .unwrap();
        assert!(pages[0].bi_level);
        assert_eq!(first_row(&pages[0]), vec![255, 255, 255, 255, 0, 0, 0, 0]);
        assert!(pages[0].metadata.native.is_some());
        assert!(pages[0].metadata.dimension.is_none());
    }

    #[test]
    fn test_unpack_rejects_short_buffer() {
        assert!(unpack_bi_level(16, 4, &[0u8; 3]).is_err());
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = StandardTiffReader.read_all_pages(b"not a tiff").unwrap_err();
        assert!(matches!(err, ConversionError::DecodeError(_)));
    }

    #[test]
    fn test_field_values() {
        assert_eq!(
            field_value(Value::Rational(300, 1)),
            Some(FieldValue::Rationals(vec!["300/1".to_string()]))
        );
        assert_eq!(field_value(Value::Short(3)), Some(FieldValue::Shorts(vec![3])));
    }
}
