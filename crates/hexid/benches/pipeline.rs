use std::hint::black_box;
use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};
use hexid::decode::{AmbiguityExpander, CandidateExtractor, Ranker};
use hexid::preprocess::{GrayImage, VariantGenerator};
use hexid::{IdRecoverer, RecognitionError, RecoveryParams};
use image::{ImageFormat, Luma, Rgb, RgbImage};

const TEXTS: [&str; 6] = [
    "ID:3F2A9B00C1D4E5F6",
    "1D 3F2A 9B0O C1D4 E5F6",
    "3F2A9800C1D4E5F6",
    "lD:3F2A9B00ClD4E5F6 ::",
    "",
    "3F2A9B00C1D4E5F",
];

fn text_crop(w: u32, h: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        let band = y >= h / 4 && y < 3 * h / 4;
        Luma([if band && (x / 4) % 3 != 2 { 0 } else { 255 }])
    })
}

fn screenshot() -> Vec<u8> {
    let img = RgbImage::from_fn(1200, 600, |x, y| {
        let line = (260..320).contains(&y) && (300..900).contains(&x) && (x / 8) % 4 != 3;
        if line {
            Rgb([40, 215, 60])
        } else {
            Rgb([20, 24, 32])
        }
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode");
    buf
}

fn bench_decode_side(c: &mut Criterion) {
    let extractor = CandidateExtractor::default();
    let ranker = Ranker::default();
    c.bench_function("decode.extract_rank", |b| {
        b.iter(|| {
            let table = extractor.extract_all(black_box(TEXTS));
            black_box(ranker.rank(&table))
        })
    });

    let expander = AmbiguityExpander::default();
    c.bench_function("decode.expand_256", |b| {
        b.iter(|| black_box(expander.expand(black_box("0180018001800180"))))
    });
}

fn bench_variants(c: &mut Criterion) {
    let crop = text_crop(220, 40);
    let generator = VariantGenerator::default();
    c.bench_function("preprocess.generate_variants", |b| {
        b.iter(|| black_box(generator.generate(black_box(&crop)).expect("variants")))
    });
}

fn bench_end_to_end(c: &mut Criterion) {
    let params = RecoveryParams {
        validate: false,
        ..RecoveryParams::default()
    };
    let recoverer = IdRecoverer::new(params, |_: &[u8]| {
        Ok::<_, RecognitionError>("3F2A9B00C1D4E5F6".to_string())
    });
    let input = screenshot();
    c.bench_function("pipeline.run_scripted", |b| {
        b.iter(|| black_box(recoverer.run(black_box(&input))))
    });
}

criterion_group!(benches, bench_decode_side, bench_variants, bench_end_to_end);
criterion_main!(benches);
