//! # Chordal
//!
//! A chord recognition and audio descriptor engine: decodes a complete
//! recording into a mono signal, classifies it into a time-aligned chord
//! sequence through an injected scoring model, and derives track-level
//! descriptors (BPM, amplitude envelope) from the same signal.
//!
//! ## Features
//!
//! - **Chord timeline**: non-overlapping fixed-hop windows, mel
//!   spectrogram features, softmax confidences, canonical chord labels
//! - **Chord vocabulary**: a 97-class root-by-quality label space with a
//!   deterministic normalization grammar and JSON persistence
//! - **Descriptors**: whole-track BPM estimation with a safe fallback,
//!   fixed-resolution RMS waveform envelope
//! - **ONNX backend**: optional classifier implementation behind the `ml`
//!   cargo feature
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use chordal::{
//!     analyze_track, AnalysisConfig, AnalysisError, ChordClassifier, ChordPredictor,
//!     ChordVocabulary, FeatureExtractor, MelSpectrogram, Signal,
//! };
//!
//! // Any scoring function works; the ONNX-backed classifier lives behind
//! // the `ml` feature.
//! struct UniformClassifier {
//!     classes: usize,
//! }
//!
//! impl ChordClassifier for UniformClassifier {
//!     fn num_classes(&self) -> usize {
//!         self.classes
//!     }
//!
//!     fn score(&self, _features: &MelSpectrogram) -> Result<Vec<f32>, AnalysisError> {
//!         Ok(vec![0.0; self.classes])
//!     }
//! }
//!
//! let config = AnalysisConfig::default();
//! let extractor = FeatureExtractor::new(config.clone());
//! let signal: Signal = extractor.decode_file(Path::new("track.mp3"))?;
//!
//! let vocab = ChordVocabulary::new();
//! let classifier = UniformClassifier {
//!     classes: vocab.num_classes(),
//! };
//! let predictor = ChordPredictor::new(classifier, vocab, config);
//!
//! let analysis = analyze_track(&signal, &predictor)?;
//! println!("BPM: {}", analysis.summary.bpm);
//! println!("{} chord events", analysis.chords.len());
//! # Ok::<(), chordal::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Raw bytes -> Decode/Resample -> Mono Signal -> Segment loop -> Classifier -> Timeline
//!                                       \-> BPM estimate, waveform envelope
//! ```
//!
//! One analysis runs synchronously and is CPU-bound; callers wanting
//! request-level concurrency offload whole invocations to their own
//! worker pool.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod features;
pub mod io;
pub mod ml;
pub mod vocab;

// Re-export main types
pub use analysis::result::{
    AnalysisMetadata, AnalysisStatus, ChordTimelineEntry, TrackAnalysis, TrackSummary,
    DEFAULT_TIME_SIGNATURE,
};
pub use config::AnalysisConfig;
pub use descriptors::waveform::WaveformPoint;
pub use error::AnalysisError;
pub use features::extractor::FeatureExtractor;
pub use features::MelSpectrogram;
pub use io::Signal;
pub use ml::predictor::{ChordEvent, ChordPredictor};
pub use ml::ChordClassifier;
pub use vocab::ChordVocabulary;

/// Analyze one recording end to end
///
/// Runs the chord prediction loop at the configured hop over the whole
/// signal, then the tempo and waveform descriptors, and packages
/// everything into a [`TrackAnalysis`].
///
/// # Errors
///
/// Returns [`AnalysisError`] when chord prediction fails (classifier
/// faults, invalid configuration). Tempo estimation never fails; it falls
/// back to the configured default BPM.
///
/// # Example
///
/// See the crate-level Quick Start.
pub fn analyze_track<C: ChordClassifier>(
    signal: &Signal,
    predictor: &ChordPredictor<C>,
) -> Result<TrackAnalysis, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    let config = predictor.config();
    log::debug!(
        "Starting track analysis: {} samples at {} Hz",
        signal.len(),
        signal.sample_rate()
    );

    let events = predictor.predict_track(signal, config.hop_duration)?;
    let bpm = descriptors::tempo::estimate_tempo(signal, config);
    let waveform = descriptors::waveform::waveform_envelope(signal, config.waveform_points);

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
    log::debug!(
        "Track analysis complete: {} events, {} BPM, {:.2} ms",
        events.len(),
        bpm,
        processing_time_ms
    );

    Ok(TrackAnalysis {
        summary: TrackSummary {
            duration_seconds: signal.duration_seconds(),
            bpm,
            time_signature: DEFAULT_TIME_SIGNATURE,
            status: AnalysisStatus::Completed,
        },
        chords: events.iter().map(ChordTimelineEntry::from).collect(),
        waveform,
        metadata: AnalysisMetadata {
            sample_rate: signal.sample_rate(),
            processing_time_ms,
        },
    })
}
