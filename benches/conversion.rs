use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use pdftiff_rs::image_pipeline::{
    ColorHint, ConversionConfig, PageImage, PageNormalizer, PdfCompression, PdfQualityPreset,
    StandardTiffWriter, TiffToPdfPipeline, TiffWriter,
};
use std::io::Cursor;

fn generate_page(width: u32, height: u32, dpi: f32) -> PageImage {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([((x + y) % 256) as u8, (x % 256) as u8, (y % 256) as u8])
    });
    PageImage::new(DynamicImage::ImageRgb8(image), dpi, dpi)
}

fn generate_tiff(width: u32, height: u32, pages: usize) -> Vec<u8> {
    let pages: Vec<PageImage> = (0..pages).map(|_| generate_page(width, height, 300.0)).collect();
    StandardTiffWriter
        .encode(&pages, "Deflate")
        .expect("benchmark TIFF should encode")
}

fn benchmark_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");
    let normalizer = PageNormalizer::new();
    let page = generate_page(1000, 1000, 300.0);

    let cases = vec![
        ("rotate_only", 6, ColorHint::Auto, None),
        ("gray", 1, ColorHint::Gray, None),
        ("binary", 1, ColorHint::Binary, None),
        ("downsample_150", 1, ColorHint::Auto, Some(150)),
    ];

    for (label, orientation, color, target_dpi) in cases {
        let page = page.clone().with_orientation(orientation);
        group.bench_with_input(BenchmarkId::from_parameter(label), &page, |b, page| {
            b.iter(|| normalizer.normalize(black_box(page.clone()), color, target_dpi));
        });
    }

    group.finish();
}

fn benchmark_tiff_to_pdf_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiff_to_pdf_by_size");

    let sizes = vec![
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1000, "1000x1000"),
    ];

    for (width, height, label) in sizes {
        let tiff = generate_tiff(width, height, 1);

        group.bench_with_input(BenchmarkId::from_parameter(label), &tiff, |b, data| {
            let pipeline = TiffToPdfPipeline::new(ConversionConfig::default());
            let preset = PdfQualityPreset::default();

            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.convert(black_box(data), &mut output, &preset);
            });
        });
    }

    group.finish();
}

fn benchmark_pdf_compression_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdf_compression_methods");
    let tiff = generate_tiff(500, 500, 2);

    let compressions = vec![
        (PdfCompression::Jpeg, "jpeg"),
        (PdfCompression::Lossless, "lossless"),
        (PdfCompression::Auto, "auto"),
    ];

    for (compression, label) in compressions {
        group.bench_with_input(BenchmarkId::from_parameter(label), &tiff, |b, data| {
            let pipeline = TiffToPdfPipeline::new(ConversionConfig::default());
            let preset = PdfQualityPreset {
                compression,
                ..PdfQualityPreset::default()
            };

            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.convert(black_box(data), &mut output, &preset);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_normalization,
    benchmark_tiff_to_pdf_sizes,
    benchmark_pdf_compression_methods
);
criterion_main!(benches);
