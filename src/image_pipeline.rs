//! Image processing pipeline module
//!
//! This module converts between multi-page TIFF and PDF, with separate modules for
//! TIFF container access, PDF embedding and rasterization, page normalization, size-controlled
//! encoding and conversion orchestration.

pub mod common;
pub mod conversions;
pub mod page;
pub mod pdf;
pub mod size_control;
pub mod tiff;

pub use common::{
    ConversionConfig,
    ConversionConfigBuilder,
    ConversionError,
    Result,
};

pub use page::{
    ColorHint,
    PageImage,
    PageNormalizer,
};

pub use pdf::{
    CompressionSelector,
    LopdfWriter,
    PdfCompression,
    PdfDocumentWriter,
    PdfQualityPreset,
    PdfRasterizer,
    PdfiumRasterizer,
};

pub use tiff::{
    StandardTiffReader,
    StandardTiffWriter,
    TiffCompression,
    TiffMetadataReader,
    TiffPageReader,
    TiffQualityPreset,
    TiffWriter,
};

pub use size_control::{
    BudgetOutcome,
    BudgetReport,
    Endpoints,
    QualityDegradationController,
    QualityLadder,
    SizeBudget,
};

pub use conversions::{
    PdfToTiffPipeline,
    TiffToPdfPipeline,
};
