//! Common utilities module
//!
//! This module contains the error type and configuration shared across the image pipeline.

pub mod config;
pub mod error;

pub use config::{ConversionConfig, ConversionConfigBuilder, DEFAULT_DPI, POINTS_PER_INCH};
pub use error::{ConversionError, Result};
