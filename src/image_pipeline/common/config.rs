//! Shared conversion constants and pipeline configuration

use tracing::warn;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// DPI assumed when a page carries no usable resolution metadata.
pub const DEFAULT_DPI: f32 = 72.0;

/// PDF user space unit: 1/72 inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Configuration shared by both conversion directions
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Whether to reject pages with zero or oversized dimensions
    pub validate_dimensions: bool,
    /// Largest accepted width or height in pixels, if any
    pub max_dimension: Option<u32>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            validate_dimensions: true,
            max_dimension: None,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }

    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if !self.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.max_dimension {
            if width > max || height > max {
                warn!("Page dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(ConversionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<u32>>,
}

impl ConversionConfigBuilder {
    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max_dimension: Option<u32>) -> Self {
        self.max_dimension = Some(max_dimension);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            validate_dimensions: self
                .validate_dimensions
                .unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ConversionConfig::builder()
            .validate_dimensions(false)
            .max_dimension(Some(10000))
            .build();

        assert!(!config.validate_dimensions);
        assert_eq!(config.max_dimension, Some(10000));
    }

    #[test]
    fn test_check_dimensions() {
        let config = ConversionConfig::builder().max_dimension(Some(100)).build();
        assert!(config.check_dimensions(100, 1).is_ok());
        assert!(matches!(
            config.check_dimensions(0, 10),
            Err(ConversionError::InvalidDimensions(0, 10))
        ));
        assert!(config.check_dimensions(101, 5).is_err());

        let lenient = ConversionConfig::builder().validate_dimensions(false).build();
        assert!(lenient.check_dimensions(0, 0).is_ok());
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = ConversionConfig::builder().build();
        assert!(config.validate_dimensions);
        assert_eq!(config.max_dimension, None);
    }
}
