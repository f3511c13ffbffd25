//! Performance benchmarks for feature extraction

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use moodset::analysis::SegmentAnalyzer;
use moodset::config::AnalysisConfig;
use moodset::{AudioSignal, FeatureExtractor};

fn synthetic_signal(seconds: usize) -> AudioSignal {
    // 440 Hz tone with a click every half second
    let sr = 22050;
    let samples: Vec<f32> = (0..sr * seconds)
        .map(|i| {
            let tone = (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / sr as f32).sin() * 0.3;
            let click = if i % (sr / 2) < 200 { 0.5 } else { 0.0 };
            tone + click
        })
        .collect();
    AudioSignal::from_vec(samples, sr as u32).unwrap()
}

fn bench_extract(c: &mut Criterion) {
    let signal = synthetic_signal(10);
    let extractor = FeatureExtractor::default();

    c.bench_function("extract_features_10s", |b| {
        b.iter(|| {
            let _ = extractor.extract(black_box(&signal));
        });
    });
}

fn bench_segments(c: &mut Criterion) {
    let signal = synthetic_signal(10);
    let analyzer = SegmentAnalyzer::new(2.0, &AnalysisConfig::default()).unwrap();

    c.bench_function("segment_profile_10s", |b| {
        b.iter(|| analyzer.analyze(black_box(&signal)));
    });
}

criterion_group!(benches, bench_extract, bench_segments);
criterion_main!(benches);
