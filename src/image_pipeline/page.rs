//! Page model and normalization
//!
//! Decoded pages are corrected for orientation, converted to the requested color mode
//! and downsampled to a target resolution before they are encoded.

pub mod color;
mod normalizer;
pub mod orientation;
pub mod resample;
pub mod types;

pub use normalizer::PageNormalizer;
pub use types::{ColorHint, PageImage};
