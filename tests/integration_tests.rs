//! Integration tests for the chord analysis pipeline

use std::io::Cursor;

use chordal::{
    analyze_track, AnalysisConfig, AnalysisError, AnalysisStatus, ChordClassifier, ChordPredictor,
    ChordVocabulary, FeatureExtractor, MelSpectrogram, Signal,
};

/// Deterministic classifier favoring a fixed class, standing in for the
/// trained model
struct FixedClassifier {
    num_classes: usize,
    favored: usize,
}

impl ChordClassifier for FixedClassifier {
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn score(&self, _features: &MelSpectrogram) -> Result<Vec<f32>, AnalysisError> {
        let mut scores = vec![0.0f32; self.num_classes];
        scores[self.favored] = 6.0;
        Ok(scores)
    }
}

fn predictor() -> ChordPredictor<FixedClassifier> {
    let vocab = ChordVocabulary::new();
    let classifier = FixedClassifier {
        num_classes: vocab.num_classes(),
        // "Cmaj"
        favored: 1,
    };
    ChordPredictor::new(classifier, vocab, AnalysisConfig::default())
}

/// Render a sine-tone WAV into an in-memory byte buffer
fn wav_bytes(sample_rate: u32, channels: u16, seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let frames = (sample_rate as f32 * seconds) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let value = (t * 220.0 * 2.0 * std::f32::consts::PI).sin() * 0.5;
            let quantized = (value * i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(quantized).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

#[test]
fn test_full_pipeline_from_wav_bytes() {
    let predictor = predictor();
    let config = predictor.config().clone();
    let extractor = FeatureExtractor::new(config.clone());

    // 10 seconds of stereo audio at a non-target rate
    let signal = extractor
        .decode_bytes(wav_bytes(44100, 2, 10.0), "wav")
        .expect("decoding should succeed");

    assert_eq!(signal.sample_rate(), config.sample_rate);
    assert!((signal.duration_seconds() - 10.0).abs() < 0.2);

    let analysis = analyze_track(&signal, &predictor).expect("analysis should succeed");

    assert_eq!(analysis.summary.status, AnalysisStatus::Completed);
    assert_eq!(analysis.summary.time_signature, 4);
    assert!((analysis.summary.duration_seconds - signal.duration_seconds()).abs() < 1e-9);

    // floor(duration / hop_duration) windows
    let expected_events = (signal.duration_seconds() / config.hop_duration) as usize;
    assert_eq!(analysis.chords.len(), expected_events);
    for (i, entry) in analysis.chords.iter().enumerate() {
        assert_eq!(entry.timestamp, i as f64 * config.hop_duration);
        assert_eq!(entry.chord, "Cmaj");
        assert!((0.0..=100.0).contains(&entry.confidence));
    }

    assert_eq!(analysis.waveform.len(), config.waveform_points);
    for point in &analysis.waveform {
        assert!((5.0..=100.0).contains(&point.amplitude));
    }

    assert_eq!(analysis.metadata.sample_rate, config.sample_rate);
    assert!(analysis.metadata.processing_time_ms > 0.0);
}

#[test]
fn test_five_second_signal_drops_final_partial_window() {
    let predictor = predictor();
    let rate = predictor.config().sample_rate;
    let samples = (0..rate as usize * 5)
        .map(|i| (i as f32 * 220.0 * 2.0 * std::f32::consts::PI / rate as f32).sin() * 0.5)
        .collect();
    let signal = Signal::new(samples, rate);

    let events = predictor.predict_track(&signal, 2.0).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].timestamp, 0.0);
    assert_eq!(events[1].timestamp, 2.0);
}

#[test]
fn test_analysis_result_serializes() {
    let predictor = predictor();
    let rate = predictor.config().sample_rate;
    let signal = Signal::new(vec![0.25; rate as usize * 4], rate);

    let analysis = analyze_track(&signal, &predictor).unwrap();
    let json = serde_json::to_string(&analysis).unwrap();

    assert!(json.contains("\"status\":\"completed\""));
    assert!(json.contains("\"time_signature\":4"));
    assert!(json.contains("\"formatted_time\""));
}

#[test]
fn test_unsupported_format_is_rejected_before_decode() {
    let extractor = FeatureExtractor::new(AnalysisConfig::default());
    let result = extractor.decode_bytes(wav_bytes(22050, 1, 1.0), "txt");
    assert!(matches!(result, Err(AnalysisError::UnsupportedFormat(_))));
}

#[test]
fn test_corrupt_bytes_fail_with_decode_error() {
    let extractor = FeatureExtractor::new(AnalysisConfig::default());
    let result = extractor.decode_bytes(b"definitely not audio".to_vec(), "flac");
    assert!(matches!(result, Err(AnalysisError::DecodeError(_))));
}

#[test]
fn test_silent_track_reports_fallback_tempo_and_floor_envelope() {
    let predictor = predictor();
    let rate = predictor.config().sample_rate;
    let signal = Signal::new(vec![0.0; rate as usize * 6], rate);

    let analysis = analyze_track(&signal, &predictor).unwrap();
    assert_eq!(analysis.summary.bpm, 120);
    assert!(analysis.waveform.iter().all(|p| p.amplitude == 5.0));
}
