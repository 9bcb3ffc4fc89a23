use std::io::Write;
use std::path::Path;

use tracing::{info, info_span, instrument};

use crate::image_pipeline::{
    common::config::ConversionConfig,
    common::error::{ConversionError, Result},
    page::{PageImage, PageNormalizer},
    pdf::{LopdfWriter, PdfDocumentWriter, PdfQualityPreset},
    size_control::{BudgetReport, QualityDegradationController, SizeBudget},
    tiff::{StandardTiffReader, TiffMetadataReader, TiffPageReader},
};

pub struct TiffToPdfPipeline<R: TiffPageReader, W: PdfDocumentWriter> {
    reader: R,
    writer: W,
    metadata: TiffMetadataReader,
    normalizer: PageNormalizer,
    config: ConversionConfig,
}

impl TiffToPdfPipeline<StandardTiffReader, LopdfWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self::with_custom(StandardTiffReader, LopdfWriter::new(), config)
    }
}

impl<R: TiffPageReader, W: PdfDocumentWriter> TiffToPdfPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            metadata: TiffMetadataReader::new(),
            normalizer: PageNormalizer::new(),
            config,
        }
    }

    /// Decodes every page and attaches the resolution and orientation from its tags.
    pub fn decode_pages(&self, input_data: &[u8]) -> Result<Vec<PageImage>> {
        let decoded = {
            let _span = info_span!("decode_tiff").entered();
            self.reader.read_all_pages(input_data)?
        };
        if decoded.is_empty() {
            return Err(ConversionError::NoPages);
        }

        decoded
            .into_iter()
            .map(|page| -> Result<PageImage> {
                self.config.check_dimensions(page.image.width(), page.image.height())?;
                let geometry = self.metadata.read(&page.metadata);
                Ok(PageImage::new(page.image, geometry.dpi_x, geometry.dpi_y)
                    .with_orientation(geometry.orientation)
                    .with_bi_level(page.bi_level))
            })
            .collect()
    }

    /// Normalizes the pages for `preset` and serializes them as one PDF.
    pub fn encode_pages(&self, pages: &[PageImage], preset: &PdfQualityPreset) -> Result<Vec<u8>> {
        let normalized: Vec<PageImage> = {
            let _span = info_span!("normalize_pages", pages = pages.len()).entered();
            pages
                .iter()
                .map(|page| self.normalizer.normalize(page.clone(), preset.color, preset.target_dpi))
                .collect()
        };

        let _span = info_span!("encode_pdf", compression = ?preset.compression).entered();
        self.writer.encode(&normalized, preset.compression, preset.jpeg_quality)
    }

    #[instrument(skip(self, input_data, output, preset), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write, preset: &PdfQualityPreset) -> Result<()> {
        info!("Starting TIFF to PDF conversion");

        let pages = self.decode_pages(input_data)?;
        let pdf = self.encode_pages(&pages, preset)?;
        output.write_all(&pdf)?;

        info!(pages = pages.len(), output_size = pdf.len(), "Conversion complete");
        Ok(())
    }

    #[instrument(skip(self, input_path, output_path, preset))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        preset: &PdfQualityPreset,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let pages = self.decode_pages(&input_data)?;
        let pdf = self.encode_pages(&pages, preset)?;

        let _span = info_span!("write_output_file").entered();
        std::fs::write(output_path, &pdf).map_err(|e| {
            ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
        })?;

        info!(pages = pages.len(), output_size = pdf.len(), "Conversion complete");
        Ok(())
    }

    /// Converts under a size budget, decoding the source once and re-encoding per preset.
    #[instrument(skip(self, budget), fields(max_bytes = budget.max_bytes, presets = budget.ladder.len()))]
    pub fn convert_with_budget(&self, budget: SizeBudget<'_, PdfQualityPreset>) -> Result<BudgetReport> {
        info!("Starting size-controlled TIFF to PDF conversion");
        let (max_bytes, ladder, mut endpoints) = budget.into_parts();

        let input_data = endpoints.read_source()?;
        let pages = self.decode_pages(&input_data)?;

        let controller = QualityDegradationController::new(max_bytes);
        let (artifact, report) = controller.run(&ladder, |preset| self.encode_pages(&pages, preset))?;

        endpoints.write_destination(&artifact.bytes)?;
        report.log_summary();
        Ok(report)
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
