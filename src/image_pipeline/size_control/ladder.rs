//! Ordered quality presets, highest fidelity first

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::page::ColorHint;
use crate::image_pipeline::pdf::types::{PdfCompression, PdfQualityPreset};
use crate::image_pipeline::tiff::types::{DEFAULT_TIFF_COMPRESSION, TiffQualityPreset};

/// A non-empty, ordered list of presets tried one after another.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityLadder<P> {
    presets: Vec<P>,
}

impl<P> QualityLadder<P> {
    pub fn new(presets: Vec<P>) -> Result<Self> {
        if presets.is_empty() {
            return Err(ConversionError::InvalidConfig(
                "quality ladder must contain at least one preset".to_string(),
            ));
        }
        Ok(Self { presets })
    }

    pub fn presets(&self) -> &[P] {
        &self.presets
    }

    pub fn into_presets(self) -> Vec<P> {
        self.presets
    }

    pub fn get(&self, index: usize) -> Option<&P> {
        self.presets.get(index)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Always false for a constructed ladder.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl QualityLadder<PdfQualityPreset> {
    /// JPEG quality steps down, then resolution, then color depth.
    pub fn default_for_pdf() -> Self {
        let step = |compression, jpeg_quality, target_dpi, color| PdfQualityPreset {
            compression,
            jpeg_quality,
            target_dpi,
            color,
        };
        Self {
            presets: vec![
                step(PdfCompression::Auto, 0.95, None, ColorHint::Auto),
                step(PdfCompression::Auto, 0.85, Some(300), ColorHint::Auto),
                step(PdfCompression::Auto, 0.75, Some(200), ColorHint::Auto),
                step(PdfCompression::Auto, 0.6, Some(150), ColorHint::Auto),
                step(PdfCompression::Auto, 0.5, Some(150), ColorHint::Gray),
                step(PdfCompression::Auto, 0.3, Some(100), ColorHint::Gray),
                step(PdfCompression::Ccitt, 0.2, Some(150), ColorHint::Binary),
            ],
        }
    }
}

impl QualityLadder<TiffQualityPreset> {
    /// Resolution steps down first, then color depth.
    pub fn default_for_tiff() -> Self {
        let step = |dpi, color| TiffQualityPreset {
            dpi,
            compression: DEFAULT_TIFF_COMPRESSION.to_string(),
            color,
        };
        Self {
            presets: vec![
                step(300, ColorHint::Rgb),
                step(200, ColorHint::Rgb),
                step(150, ColorHint::Rgb),
                step(150, ColorHint::Gray),
                step(150, ColorHint::Binary),
                step(100, ColorHint::Binary),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::pdf::types::JPEG_QUALITY_RANGE;

    #[test]
    fn test_empty_ladder_rejected() {
        let err = QualityLadder::<TiffQualityPreset>::new(Vec::new()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidConfig(_)));
    }

    #[test]
    fn test_default_pdf_ladder_is_valid() {
        let ladder = QualityLadder::default_for_pdf();
        assert!(!ladder.is_empty());
        for preset in ladder.presets() {
            assert!(JPEG_QUALITY_RANGE.contains(&preset.jpeg_quality));
            assert_ne!(preset.target_dpi, Some(0));
        }
        // quality never increases down the ladder
        let qualities: Vec<f32> = ladder.presets().iter().map(|p| p.jpeg_quality).collect();
        assert!(qualities.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_default_tiff_ladder_is_descending() {
        let ladder = QualityLadder::default_for_tiff();
        assert_eq!(ladder.get(0), Some(&TiffQualityPreset::default()));
        let dpis: Vec<u32> = ladder.presets().iter().map(|p| p.dpi).collect();
        assert!(dpis.windows(2).all(|w| w[0] >= w[1]));
    }
}
