use std::io::Write;
use std::path::Path;

use tracing::{info, info_span, instrument};

use crate::image_pipeline::{
    common::config::ConversionConfig,
    common::error::{ConversionError, Result},
    page::{PageImage, PageNormalizer},
    pdf::{PdfRasterizer, PdfiumRasterizer},
    size_control::{BudgetReport, QualityDegradationController, QualityLadder, SizeBudget},
    tiff::{StandardTiffWriter, TiffQualityPreset, TiffWriter},
};

pub struct PdfToTiffPipeline<R: PdfRasterizer, W: TiffWriter> {
    rasterizer: R,
    writer: W,
    normalizer: PageNormalizer,
    config: ConversionConfig,
}

impl PdfToTiffPipeline<PdfiumRasterizer, StandardTiffWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self::with_custom(PdfiumRasterizer, StandardTiffWriter, config)
    }
}

impl<R: PdfRasterizer, W: TiffWriter> PdfToTiffPipeline<R, W> {
    pub fn with_custom(rasterizer: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            rasterizer,
            writer,
            normalizer: PageNormalizer::new(),
            config,
        }
    }

    /// Renders every page of the document at `dpi`.
    pub fn render_pages(&self, input_data: &[u8], dpi: u32) -> Result<Vec<PageImage>> {
        let rendered = {
            let _span = info_span!("rasterize_pdf", dpi).entered();
            self.rasterizer.render_pages(input_data, dpi)?
        };
        if rendered.is_empty() {
            return Err(ConversionError::NoPages);
        }

        rendered
            .into_iter()
            .map(|image| -> Result<PageImage> {
                self.config.check_dimensions(image.width(), image.height())?;
                Ok(PageImage::new(image, dpi as f32, dpi as f32))
            })
            .collect()
    }

    /// Converts the pages to the preset's color mode and resolution and encodes one TIFF.
    ///
    /// Pages rendered above `preset.dpi` are downsampled to it.
    pub fn encode_pages(&self, pages: &[PageImage], preset: &TiffQualityPreset) -> Result<Vec<u8>> {
        let normalized: Vec<PageImage> = {
            let _span = info_span!("normalize_pages", pages = pages.len()).entered();
            pages
                .iter()
                .map(|page| self.normalizer.normalize(page.clone(), preset.color, Some(preset.dpi)))
                .collect()
        };

        let _span = info_span!("encode_tiff", compression = %preset.compression).entered();
        self.writer.encode(&normalized, &preset.compression)
    }

    #[instrument(skip(self, input_data, output, preset), fields(input_size = input_data.len(), dpi = preset.dpi))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write, preset: &TiffQualityPreset) -> Result<()> {
        info!("Starting PDF to TIFF conversion");

        let pages = self.render_pages(input_data, preset.dpi)?;
        let tiff = self.encode_pages(&pages, preset)?;
        output.write_all(&tiff)?;

        info!(pages = pages.len(), output_size = tiff.len(), "Conversion complete");
        Ok(())
    }

    #[instrument(skip(self, input_path, output_path, preset))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        preset: &TiffQualityPreset,
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

        let pages = self.render_pages(&input_data, preset.dpi)?;
        let tiff = self.encode_pages(&pages, preset)?;

        let _span = info_span!("write_output_file").entered();
        std::fs::write(output_path, &tiff).map_err(|e| {
            ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
        })?;

        info!(pages = pages.len(), output_size = tiff.len(), "Conversion complete");
        Ok(())
    }

    /// Converts under a size budget.
    ///
    /// The document is rendered once at the highest DPI on the ladder; each trial
    /// downsamples that rendering to its own preset.
    #[instrument(skip(self, budget), fields(max_bytes = budget.max_bytes, presets = budget.ladder.len()))]
    pub fn convert_with_budget(&self, budget: SizeBudget<'_, TiffQualityPreset>) -> Result<BudgetReport> {
        info!("Starting size-controlled PDF to TIFF conversion");
        let (max_bytes, ladder, mut endpoints) = budget.into_parts();

        let input_data = endpoints.read_source()?;
        let pages = self.render_pages(&input_data, render_dpi(&ladder))?;

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

fn render_dpi(ladder: &QualityLadder<TiffQualityPreset>) -> u32 {
    ladder.presets().iter().map(|p| p.dpi).max().unwrap_or_default()
}
