//! TIFF conversion configuration types

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::page::ColorHint;

/// Rendering resolution used when a PDF page is rasterized without an explicit DPI.
pub const DEFAULT_RENDER_DPI: u32 = 300;

/// Compression name used when none is given.
pub const DEFAULT_TIFF_COMPRESSION: &str = "Deflate";

/// TIFF compression methods available to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression, balanced level
    Deflate,
    /// PackBits run-length encoding (cheap, good on bi-level pages)
    PackBits,
}

impl TiffCompression {
    /// Resolves a compression name. Unknown names have no registered encoder.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "uncompressed" => Ok(TiffCompression::None),
            "lzw" => Ok(TiffCompression::Lzw),
            "deflate" | "zip" | "adobe deflate" => Ok(TiffCompression::Deflate),
            "packbits" => Ok(TiffCompression::PackBits),
            _ => Err(ConversionError::CodecUnavailable(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TiffCompression::None => "None",
            TiffCompression::Lzw => "LZW",
            TiffCompression::Deflate => "Deflate",
            TiffCompression::PackBits => "PackBits",
        }
    }
}

/// Encoding knobs for one PDF to TIFF attempt
#[derive(Debug, Clone, PartialEq)]
pub struct TiffQualityPreset {
    /// Rasterization resolution
    pub dpi: u32,
    /// Compression name handed to the TIFF encoder
    pub compression: String,
    /// Color mode of the rasterized pages
    pub color: ColorHint,
}

impl Default for TiffQualityPreset {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_RENDER_DPI,
            compression: DEFAULT_TIFF_COMPRESSION.to_string(),
            color: ColorHint::Rgb,
        }
    }
}

impl TiffQualityPreset {
    pub fn builder() -> TiffQualityPresetBuilder {
        TiffQualityPresetBuilder::default()
    }
}

/// Builder for TiffQualityPreset
#[derive(Default)]
pub struct TiffQualityPresetBuilder {
    dpi: Option<u32>,
    compression: Option<String>,
    color: Option<ColorHint>,
}

impl TiffQualityPresetBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn compression(mut self, compression: impl Into<String>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    pub fn color(mut self, color: ColorHint) -> Self {
        self.color = Some(color);
        self
    }

    pub fn build(self) -> Result<TiffQualityPreset> {
        let default = TiffQualityPreset::default();
        let preset = TiffQualityPreset {
            dpi: self.dpi.unwrap_or(default.dpi),
            compression: self.compression.unwrap_or(default.compression),
            color: self.color.unwrap_or(default.color),
        };

        if preset.dpi == 0 {
            return Err(ConversionError::InvalidConfig(
                "render DPI must be positive, got 0".to_string(),
            ));
        }
        if preset.compression.trim().is_empty() {
            return Err(ConversionError::InvalidConfig(
                "TIFF compression name must not be empty".to_string(),
            ));
        }
        Ok(preset)
    }
}
