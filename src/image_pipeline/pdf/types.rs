//! PDF conversion configuration types

use std::ops::RangeInclusive;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::page::ColorHint;

/// JPEG quality used when none is given.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.8;

/// Accepted JPEG quality factors.
pub const JPEG_QUALITY_RANGE: RangeInclusive<f32> = 0.2..=1.0;

/// How page images are compressed inside the PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfCompression {
    /// Bi-level pages go lossless, everything else tries JPEG first
    #[default]
    Auto,
    /// DCT (JPEG) compression at the preset's quality
    Jpeg,
    /// Flate over raw samples
    Lossless,
    /// Bi-level compression; currently encoded losslessly
    Ccitt,
}

impl std::str::FromStr for PdfCompression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(PdfCompression::Auto),
            "jpeg" | "jpg" | "dct" => Ok(PdfCompression::Jpeg),
            "lossless" | "flate" | "deflate" => Ok(PdfCompression::Lossless),
            "ccitt" | "g4" => Ok(PdfCompression::Ccitt),
            other => Err(format!("unknown PDF compression '{other}'")),
        }
    }
}

/// Encoding knobs for one TIFF to PDF attempt
#[derive(Debug, Clone, PartialEq)]
pub struct PdfQualityPreset {
    pub compression: PdfCompression,
    /// JPEG quality factor in `0.2..=1.0`
    pub jpeg_quality: f32,
    /// Downsample pages above this resolution; `None` keeps native resolution
    pub target_dpi: Option<u32>,
    pub color: ColorHint,
}

impl Default for PdfQualityPreset {
    fn default() -> Self {
        Self {
            compression: PdfCompression::Auto,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            target_dpi: None,
            color: ColorHint::Auto,
        }
    }
}

impl PdfQualityPreset {
    pub fn builder() -> PdfQualityPresetBuilder {
        PdfQualityPresetBuilder::default()
    }
}

/// Builder for PdfQualityPreset
#[derive(Default)]
pub struct PdfQualityPresetBuilder {
    compression: Option<PdfCompression>,
    jpeg_quality: Option<f32>,
    target_dpi: Option<u32>,
    color: Option<ColorHint>,
}

impl PdfQualityPresetBuilder {
    pub fn compression(mut self, compression: PdfCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn jpeg_quality(mut self, quality: f32) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    pub fn target_dpi(mut self, dpi: u32) -> Self {
        self.target_dpi = Some(dpi);
        self
    }

    pub fn color(mut self, color: ColorHint) -> Self {
        self.color = Some(color);
        self
    }

    pub fn build(self) -> Result<PdfQualityPreset> {
        let default = PdfQualityPreset::default();
        let preset = PdfQualityPreset {
            compression: self.compression.unwrap_or(default.compression),
            jpeg_quality: self.jpeg_quality.unwrap_or(default.jpeg_quality),
            target_dpi: self.target_dpi,
            color: self.color.unwrap_or(default.color),
        };

        if !JPEG_QUALITY_RANGE.contains(&preset.jpeg_quality) {
            return Err(ConversionError::InvalidConfig(format!(
                "JPEG quality must be within {:?}, got {}",
                JPEG_QUALITY_RANGE, preset.jpeg_quality
            )));
        }
        if preset.target_dpi == Some(0) {
            return Err(ConversionError::InvalidConfig(
                "target DPI must be positive, got 0".to_string(),
            ));
        }
        Ok(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_defaults() {
        let preset = PdfQualityPreset::builder().build().unwrap();
        assert_eq!(preset.compression, PdfCompression::Auto);
        assert_eq!(preset.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert_eq!(preset.target_dpi, None);
        assert_eq!(preset.color, ColorHint::Auto);
    }

    #[test]
    fn test_quality_bounds() {
        assert!(PdfQualityPreset::builder().jpeg_quality(0.2).build().is_ok());
        assert!(PdfQualityPreset::builder().jpeg_quality(1.0).build().is_ok());
        assert!(PdfQualityPreset::builder().jpeg_quality(0.1).build().is_err());
        assert!(PdfQualityPreset::builder().jpeg_quality(1.5).build().is_err());
    }

    #[test]
    fn test_zero_target_dpi_rejected() {
        let err = PdfQualityPreset::builder().target_dpi(0).build().unwrap_err();
        assert!(matches!(err, ConversionError::InvalidConfig(_)));
    }

    #[test]
    fn test_compression_from_str() {
        assert_eq!("JPEG".parse::<PdfCompression>().unwrap(), PdfCompression::Jpeg);
        assert_eq!("lossless".parse::<PdfCompression>().unwrap(), PdfCompression::Lossless);
        assert!("lzma".parse::<PdfCompression>().is_err());
    }
}
