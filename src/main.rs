use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pdftiff_rs::image_pipeline::{
    BudgetOutcome, BudgetReport, ColorHint, ConversionConfig, PdfCompression, PdfQualityPreset,
    PdfToTiffPipeline, QualityLadder, SizeBudget, TiffQualityPreset, TiffToPdfPipeline,
};
use pdftiff_rs::logger;
use tracing::{info, warn};

/// Convert between multi-page TIFF and PDF, optionally under a size budget
#[derive(Parser, Debug)]
#[command(name = "pdftiff", author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = logger::DEFAULT_FILTER)]
    log: String,

    /// Reject pages wider or taller than this many pixels
    #[arg(long, global = true)]
    max_dimension: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Embed every TIFF page as a full-page image in a PDF
    Tiff2pdf {
        input: PathBuf,
        output: PathBuf,

        /// auto, jpeg, lossless or ccitt
        #[arg(short, long)]
        compression: Option<PdfCompression>,

        /// JPEG quality between 0.2 and 1.0
        #[arg(short, long)]
        quality: Option<f32>,

        /// Downsample pages above this resolution
        #[arg(short, long)]
        dpi: Option<u32>,

        /// auto, rgb, gray or binary
        #[arg(long)]
        color: Option<ColorHint>,

        /// Degrade quality until the PDF is at most this many bytes
        #[arg(long)]
        max_bytes: Option<u64>,
    },
    /// Render every PDF page into one multi-page TIFF
    Pdf2tiff {
        input: PathBuf,
        output: PathBuf,

        /// Rendering resolution
        #[arg(short, long)]
        dpi: Option<u32>,

        /// None, LZW, Deflate or PackBits
        #[arg(short, long)]
        compression: Option<String>,

        /// auto, rgb, gray or binary
        #[arg(long)]
        color: Option<ColorHint>,

        /// Degrade quality until the TIFF is at most this many bytes
        #[arg(long)]
        max_bytes: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_with_default(&cli.log);

    let config = ConversionConfig::builder()
        .max_dimension(cli.max_dimension)
        .build();

    match cli.command {
        Command::Tiff2pdf {
            input,
            output,
            compression,
            quality,
            dpi,
            color,
            max_bytes,
        } => {
            let knobs_given = compression.is_some() || quality.is_some() || dpi.is_some() || color.is_some();
            let mut builder = PdfQualityPreset::builder();
            if let Some(compression) = compression {
                builder = builder.compression(compression);
            }
            if let Some(quality) = quality {
                builder = builder.jpeg_quality(quality);
            }
            if let Some(dpi) = dpi {
                builder = builder.target_dpi(dpi);
            }
            if let Some(color) = color {
                builder = builder.color(color);
            }
            let preset = builder.build().context("invalid PDF quality settings")?;
            let pipeline = TiffToPdfPipeline::new(config);

            match max_bytes {
                None => pipeline
                    .convert_file(&input, &output, &preset)
                    .with_context(|| format!("failed to convert {}", input.display()))?,
                Some(max_bytes) => {
                    let mut presets = QualityLadder::default_for_pdf().into_presets();
                    if knobs_given {
                        presets.insert(0, preset);
                    }
                    let budget = SizeBudget::builder()
                        .max_bytes(max_bytes)
                        .ladder(QualityLadder::new(presets)?)
                        .file_pair(&input, &output)
                        .build()?;
                    let report = pipeline
                        .convert_with_budget(budget)
                        .with_context(|| format!("failed to convert {}", input.display()))?;
                    report_budget(&report);
                }
            }
        }
        Command::Pdf2tiff {
            input,
            output,
            dpi,
            compression,
            color,
            max_bytes,
        } => {
            let knobs_given = dpi.is_some() || compression.is_some() || color.is_some();
            let mut builder = TiffQualityPreset::builder();
            if let Some(dpi) = dpi {
                builder = builder.dpi(dpi);
            }
            if let Some(compression) = compression {
                builder = builder.compression(compression);
            }
            if let Some(color) = color {
                builder = builder.color(color);
            }
            let preset = builder.build().context("invalid TIFF quality settings")?;
            let pipeline = PdfToTiffPipeline::new(config);

            match max_bytes {
                None => pipeline
                    .convert_file(&input, &output, &preset)
                    .with_context(|| format!("failed to convert {}", input.display()))?,
                Some(max_bytes) => {
                    let mut presets = QualityLadder::default_for_tiff().into_presets();
                    if knobs_given {
                        presets.insert(0, preset);
                    }
                    let budget = SizeBudget::builder()
                        .max_bytes(max_bytes)
                        .ladder(QualityLadder::new(presets)?)
                        .file_pair(&input, &output)
                        .build()?;
                    let report = pipeline
                        .convert_with_budget(budget)
                        .with_context(|| format!("failed to convert {}", input.display()))?;
                    report_budget(&report);
                }
            }
        }
    }

    Ok(())
}

fn report_budget(report: &BudgetReport) {
    match report.outcome {
        BudgetOutcome::Accepted => info!(
            preset = report.preset_index,
            size = report.size,
            max_bytes = report.max_bytes,
            "Output fits the size budget"
        ),
        BudgetOutcome::Exhausted => warn!(
            size = report.size,
            max_bytes = report.max_bytes,
            "Output exceeds the size budget after trying {} presets",
            report.trials().len()
        ),
    }
}
