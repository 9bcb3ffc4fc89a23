//! Per-page TIFF metadata: resolution and orientation
//!
//! The decoder hands every page's tags over as a [`PageMetadata`] tree: the native image
//! file directory (IFD) plus an optional generic "dimension" node carrying physical pixel
//! sizes in millimeters. [`TiffMetadataReader`] turns that tree into `(dpi_x, dpi_y,
//! orientation)` and never fails: absent fields resolve to 72 DPI and orientation 1.

use tracing::{debug, warn};

use crate::image_pipeline::common::config::DEFAULT_DPI;
use crate::image_pipeline::page::orientation::ORIENTATION_NORMAL;

pub const TAG_ORIENTATION: u16 = 274;
pub const TAG_X_RESOLUTION: u16 = 282;
pub const TAG_Y_RESOLUTION: u16 = 283;
pub const TAG_RESOLUTION_UNIT: u16 = 296;

pub const RESOLUTION_UNIT_INCH: u16 = 2;
pub const RESOLUTION_UNIT_CENTIMETER: u16 = 3;

const CM_PER_INCH: f32 = 2.54;
const MM_PER_INCH: f32 = 25.4;

/// Value of a single IFD field as exposed by the decoder
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// SHORT/LONG values
    Shorts(Vec<u16>),
    /// RATIONAL values, either "numerator/denominator" or a plain decimal
    Rationals(Vec<String>),
    /// ASCII text
    Ascii(String),
}

/// One tagged field of an image file directory
#[derive(Debug, Clone, PartialEq)]
pub struct IfdField {
    pub number: u16,
    pub value: FieldValue,
}

/// The native tag directory of one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageFileDirectory {
    pub fields: Vec<IfdField>,
}

impl ImageFileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_short(mut self, number: u16, value: u16) -> Self {
        self.fields.push(IfdField {
            number,
            value: FieldValue::Shorts(vec![value]),
        });
        self
    }

    pub fn with_rational(mut self, number: u16, value: impl Into<String>) -> Self {
        self.fields.push(IfdField {
            number,
            value: FieldValue::Rationals(vec![value.into()]),
        });
        self
    }

    pub fn field(&self, number: u16) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.number == number).map(|f| &f.value)
    }
}

/// Generic physical-size node, millimeters per pixel
///
/// Only filled by readers that derive it from their own format metadata.
/// `StandardTiffReader` leaves it empty and resolution comes from the native directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionNode {
    pub horizontal_pixel_size_mm: Option<f32>,
    pub vertical_pixel_size_mm: Option<f32>,
}

/// Metadata tree for one decoded page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub native: Option<ImageFileDirectory>,
    pub dimension: Option<DimensionNode>,
}

/// Resolution and orientation recovered from a page's metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub dpi_x: f32,
    pub dpi_y: f32,
    pub orientation: u16,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TiffMetadataReader;

impl TiffMetadataReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, metadata: &PageMetadata) -> PageGeometry {
        let (dpi_x, dpi_y) = self.extract_dpi(metadata);
        PageGeometry {
            dpi_x,
            dpi_y,
            orientation: self.extract_orientation(metadata),
        }
    }

    /// Native resolution tags first, then the millimeter pixel size, then 72 DPI.
    pub fn extract_dpi(&self, metadata: &PageMetadata) -> (f32, f32) {
        if let Some(dpi) = metadata.native.as_ref().and_then(dpi_from_directory) {
            return dpi;
        }
        if let Some(dpi) = metadata.dimension.as_ref().and_then(dpi_from_dimension) {
            debug!(dpi_x = dpi.0, dpi_y = dpi.1, "Resolution taken from pixel size metadata");
            return dpi;
        }

        warn!("No DPI information found in TIFF metadata, defaulting to {} DPI", DEFAULT_DPI);
        (DEFAULT_DPI, DEFAULT_DPI)
    }

    pub fn extract_orientation(&self, metadata: &PageMetadata) -> u16 {
        metadata
            .native
            .as_ref()
            .and_then(|ifd| ifd.field(TAG_ORIENTATION))
            .and_then(first_short)
            .unwrap_or(ORIENTATION_NORMAL)
    }
}

fn dpi_from_directory(ifd: &ImageFileDirectory) -> Option<(f32, f32)> {
    let x = ifd.field(TAG_X_RESOLUTION).and_then(first_rational)?;
    let y = ifd.field(TAG_Y_RESOLUTION).and_then(first_rational)?;
    let unit = ifd
        .field(TAG_RESOLUTION_UNIT)
        .and_then(first_short)
        .unwrap_or(RESOLUTION_UNIT_INCH);

    let factor = match unit {
        RESOLUTION_UNIT_CENTIMETER => CM_PER_INCH,
        _ => 1.0,
    };
    let (dpi_x, dpi_y) = (x * factor, y * factor);
    (dpi_x > 0.0 && dpi_y > 0.0).then_some((dpi_x, dpi_y))
}

fn dpi_from_dimension(node: &DimensionNode) -> Option<(f32, f32)> {
    let h = node.horizontal_pixel_size_mm.filter(|v| *v > 0.0)?;
    let v = node.vertical_pixel_size_mm.filter(|v| *v > 0.0)?;
    Some((MM_PER_INCH / h, MM_PER_INCH / v))
}

fn first_short(value: &FieldValue) -> Option<u16> {
    match value {
        FieldValue::Shorts(values) => values.first().copied(),
        _ => None,
    }
}

fn first_rational(value: &FieldValue) -> Option<f32> {
    match value {
        FieldValue::Rationals(values) => values.first().and_then(|raw| parse_rational(raw)),
        FieldValue::Shorts(values) => values.first().map(|&v| v as f32),
        FieldValue::Ascii(_) => None,
    }
}

/// Parses "numerator/denominator" or a decimal. A zero denominator counts as absent.
pub fn parse_rational(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    let value = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f32 = num.trim().parse().ok()?;
            let den: f32 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => raw.parse().ok()?,
    };
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(x: &str, y: &str, unit: Option<u16>) -> PageMetadata {
        let mut ifd = ImageFileDirectory::new()
            .with_rational(TAG_X_RESOLUTION, x)
            .with_rational(TAG_Y_RESOLUTION, y);
        if let Some(unit) = unit {
            ifd = ifd.with_short(TAG_RESOLUTION_UNIT, unit);
        }
        PageMetadata {
            native: Some(ifd),
            dimension: None,
        }
    }

    #[test]
    fn test_inch_resolution() {
        let reader = TiffMetadataReader::new();
        assert_eq!(reader.extract_dpi(&native("300", "300", Some(2))), (300.0, 300.0));
    }

    #[test]
    fn test_centimeter_resolution() {
        let reader = TiffMetadataReader::new();
        let (x, y) = reader.extract_dpi(&native("300", "300", Some(3)));
        assert!((x - 762.0).abs() < 1e-3);
        assert!((y - 762.0).abs() < 1e-3);
    }

    #[test]
    fn test_missing_unit_means_inch() {
        let reader = TiffMetadataReader::new();
        assert_eq!(reader.extract_dpi(&native("200/1", "100/1", None)), (200.0, 100.0));
    }

    #[test]
    fn test_no_resolution_defaults_to_72() {
        let reader = TiffMetadataReader::new();
        assert_eq!(reader.extract_dpi(&PageMetadata::default()), (72.0, 72.0));

        let only_unit = PageMetadata {
            native: Some(ImageFileDirectory::new().with_short(TAG_RESOLUTION_UNIT, 2)),
            dimension: None,
        };
        assert_eq!(reader.extract_dpi(&only_unit), (72.0, 72.0));
    }

    #[test]
    fn test_zero_denominator_is_absent() {
        let reader = TiffMetadataReader::new();
        assert_eq!(reader.extract_dpi(&native("300/0", "300/1", Some(2))), (72.0, 72.0));
    }

    #[test]
    fn test_dimension_fallback() {
        let reader = TiffMetadataReader::new();
        let metadata = PageMetadata {
            native: None,
            dimension: Some(DimensionNode {
                horizontal_pixel_size_mm: Some(25.4 / 150.0),
                vertical_pixel_size_mm: Some(25.4 / 300.0),
            }),
        };
        let (x, y) = reader.extract_dpi(&metadata);
        assert!((x - 150.0).abs() < 1e-2);
        assert!((y - 300.0).abs() < 1e-2);
    }

    #[test]
    fn test_native_wins_over_dimension() {
        let reader = TiffMetadataReader::new();
        let mut metadata = native("400", "400", Some(2));
        metadata.dimension = Some(DimensionNode {
            horizontal_pixel_size_mm: Some(1.0),
            vertical_pixel_size_mm: Some(1.0),
        });
        assert_eq!(reader.extract_dpi(&metadata), (400.0, 400.0));
    }

    #[test]
    fn test_orientation() {
        let reader = TiffMetadataReader::new();
        let metadata = PageMetadata {
            native: Some(ImageFileDirectory::new().with_short(TAG_ORIENTATION, 6)),
            dimension: None,
        };
        assert_eq!(reader.extract_orientation(&metadata), 6);
        assert_eq!(reader.extract_orientation(&PageMetadata::default()), 1);
    }

    #[test]
    fn test_parse_rational_forms() {
        assert_eq!(parse_rational("300/1"), Some(300.0));
        assert_eq!(parse_rational(" 600 / 2 "), Some(300.0));
        assert_eq!(parse_rational("72.5"), Some(72.5));
        assert_eq!(parse_rational("1/0"), None);
        assert_eq!(parse_rational("abc"), None);
        assert_eq!(parse_rational("1/x"), None);
    }
}
