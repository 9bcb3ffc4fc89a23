//! TIFF module
//!
//! This module provides multi-page TIFF reading, per-page metadata interpretation and
//! TIFF writing with named compression options.

pub mod metadata;
mod reader;
mod standard_tiff_reader;
mod standard_tiff_writer;
pub mod types;
mod writer;

pub use metadata::{PageGeometry, PageMetadata, TiffMetadataReader};
pub use reader::{DecodedPage, TiffPageReader};
pub use standard_tiff_reader::StandardTiffReader;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{TiffCompression, TiffQualityPreset, TiffQualityPresetBuilder};
pub use writer::TiffWriter;
