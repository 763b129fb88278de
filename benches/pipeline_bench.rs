//! Performance benchmarks for the analysis pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chordal::descriptors::{tempo, waveform};
use chordal::features::extractor::FeatureExtractor;
use chordal::{AnalysisConfig, Signal};

fn synthetic_signal(seconds: usize) -> Signal {
    let config = AnalysisConfig::default();
    let rate = config.sample_rate;
    let samples: Vec<f32> = (0..rate as usize * seconds)
        .map(|i| (i as f32 * 220.0 * 2.0 * std::f32::consts::PI / rate as f32).sin() * 0.5)
        .collect();
    Signal::new(samples, rate)
}

fn bench_segment_features(c: &mut Criterion) {
    let extractor = FeatureExtractor::new(AnalysisConfig::default());
    let signal = synthetic_signal(30);

    c.bench_function("segment_features_2s", |b| {
        b.iter(|| {
            let _ = extractor.segment_features(black_box(&signal), black_box(4.0), black_box(2.0));
        });
    });
}

fn bench_estimate_tempo(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let signal = synthetic_signal(30);

    c.bench_function("estimate_tempo_30s", |b| {
        b.iter(|| {
            let _ = tempo::estimate_tempo(black_box(&signal), black_box(&config));
        });
    });
}

fn bench_waveform_envelope(c: &mut Criterion) {
    let signal = synthetic_signal(30);

    c.bench_function("waveform_envelope_150pt", |b| {
        b.iter(|| {
            let _ = waveform::waveform_envelope(black_box(&signal), black_box(150));
        });
    });
}

criterion_group!(
    benches,
    bench_segment_features,
    bench_estimate_tempo,
    bench_waveform_envelope
);
criterion_main!(benches);
