//! PDF module
//!
//! This module embeds normalized pages into PDF documents (one full-page image per page)
//! and rasterizes PDF pages back into pixel buffers.

pub mod compression;
mod lopdf_writer;
mod pdfium_rasterizer;
mod rasterizer;
pub mod types;
mod writer;

pub use compression::{CompressionSelector, EncodedImage};
pub use lopdf_writer::LopdfWriter;
pub use pdfium_rasterizer::PdfiumRasterizer;
pub use rasterizer::PdfRasterizer;
pub use types::{
    DEFAULT_JPEG_QUALITY, PdfCompression, PdfQualityPreset, PdfQualityPresetBuilder,
};
pub use writer::PdfDocumentWriter;
