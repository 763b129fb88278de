//! Feature extraction front-end
//!
//! Turns raw encoded audio into a [`Signal`] and signal sub-ranges into
//! model-ready mel spectrogram tensors, with boundary checks on segment
//! extraction.

use std::path::Path;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::{mel, MelSpectrogram};
use crate::io::{decoder, Signal};

/// Minimum fraction of the requested samples a realized segment must cover
const MIN_SEGMENT_COVERAGE: f64 = 0.9;

/// Decodes audio and computes segment feature tensors
///
/// Stateless apart from its configuration; one extractor serves any number
/// of signals.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: AnalysisConfig,
}

impl FeatureExtractor {
    /// Create an extractor with the given configuration
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// The extractor's configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Decode an audio file into a mono signal at the configured rate
    pub fn decode_file(&self, path: &Path) -> Result<Signal, AnalysisError> {
        decoder::decode_file(path, &self.config)
    }

    /// Decode an in-memory audio payload with a declared extension
    pub fn decode_bytes(&self, data: Vec<u8>, extension: &str) -> Result<Signal, AnalysisError> {
        decoder::decode_bytes(data, extension, &self.config)
    }

    /// Mel-scaled log spectrogram of a sample range
    pub fn mel_spectrogram(&self, samples: &[f32]) -> MelSpectrogram {
        mel::mel_spectrogram(
            samples,
            self.config.sample_rate,
            self.config.n_fft,
            self.config.hop_length,
            self.config.n_mels,
        )
    }

    /// Feature tensor for the segment `[start_time, start_time + duration)`
    ///
    /// Returns `None` (not an error) when either bound falls outside the
    /// signal, or when the realized segment covers less than 90% of the
    /// requested sample count, which can only happen at the extreme tail.
    pub fn segment_features(
        &self,
        signal: &Signal,
        start_time: f64,
        duration: f64,
    ) -> Option<MelSpectrogram> {
        let rate = signal.sample_rate() as f64;
        // Truncate toward zero, matching the windowing protocol's sample
        // index convention
        let start_sample = (start_time * rate) as i64;
        let end_sample = ((start_time + duration) * rate) as i64;

        if start_sample < 0 || end_sample > signal.len() as i64 || end_sample < start_sample {
            return None;
        }

        let segment = &signal.samples()[start_sample as usize..end_sample as usize];
        let min_samples = (duration * rate * MIN_SEGMENT_COVERAGE) as usize;
        if segment.len() < min_samples {
            return None;
        }

        Some(self.mel_spectrogram(segment))
    }
}
