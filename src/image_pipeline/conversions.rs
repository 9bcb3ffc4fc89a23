//! Pipeline conversions module
//!
//! This module wires decoding, page normalization and encoding together for both
//! conversion directions, with or without a size budget.

mod pdf_to_tiff;
mod tiff_to_pdf;


pub use pdf_to_tiff::PdfToTiffPipeline;
pub use tiff_to_pdf::TiffToPdfPipeline;
