//! Track-level chord prediction
//!
//! Drives the feature extractor and the classifier over an entire
//! recording with a fixed hop, producing a timestamped chord sequence
//! decoded through the vocabulary.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::extractor::FeatureExtractor;
use crate::io::Signal;
use crate::ml::ChordClassifier;
use crate::vocab::{ChordVocabulary, SENTINEL};

/// Epsilon added to the standard deviation during feature normalization
const NORM_EPSILON: f32 = 1e-8;

/// One classified window of a recording
///
/// Produced in strictly increasing timestamp order, one per window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordEvent {
    /// Window start in seconds; an exact multiple of the hop duration
    pub timestamp: f64,
    /// Canonical chord label, sentinel `"N"` for unavailable segments
    pub label: String,
    /// Classifier softmax probability for the chosen class, in [0, 1];
    /// 0.0 for sentinel events
    pub confidence: f32,
}

/// Classifies an entire signal into a chord timeline
///
/// Owns the extractor, vocabulary and injected classifier. Carries no
/// per-recording state: concurrent calls on independent signals produce
/// independent results.
pub struct ChordPredictor<C> {
    extractor: FeatureExtractor,
    vocab: ChordVocabulary,
    classifier: C,
}

impl<C: ChordClassifier> ChordPredictor<C> {
    /// Create a predictor from its injected parts
    pub fn new(classifier: C, vocab: ChordVocabulary, config: AnalysisConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(config),
            vocab,
            classifier,
        }
    }

    /// The predictor's configuration
    pub fn config(&self) -> &AnalysisConfig {
        self.extractor.config()
    }

    /// The predictor's vocabulary
    pub fn vocab(&self) -> &ChordVocabulary {
        &self.vocab
    }

    /// The predictor's feature extractor
    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Classify one segment of a signal
    ///
    /// An unavailable segment (out of bounds or too short) yields the
    /// sentinel label with zero confidence; the classifier is never
    /// invoked without a feature tensor.
    pub fn predict_segment(
        &self,
        signal: &Signal,
        start_time: f64,
        duration: f64,
    ) -> Result<(String, f32), AnalysisError> {
        let mut features = match self.extractor.segment_features(signal, start_time, duration) {
            Some(features) => features,
            None => return Ok((SENTINEL.to_string(), 0.0)),
        };

        features.normalize(NORM_EPSILON);

        let scores = self.classifier.score(&features)?;
        if scores.len() != self.vocab.num_classes() {
            return Err(AnalysisError::InferenceError(format!(
                "classifier produced {} scores for {} classes",
                scores.len(),
                self.vocab.num_classes()
            )));
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(AnalysisError::InferenceError(
                "classifier produced non-finite scores".to_string(),
            ));
        }

        let probabilities = softmax(&scores);
        let (class, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |best, (i, p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            });

        Ok((self.vocab.decode(class).to_string(), confidence))
    }

    /// Classify an entire signal into an ordered chord timeline
    ///
    /// Windows step at exactly `0, h, 2h, ...` and never overlap; the
    /// final partial window shorter than the hop is dropped. A signal
    /// shorter than one hop produces an empty sequence.
    pub fn predict_track(
        &self,
        signal: &Signal,
        hop_duration: f64,
    ) -> Result<Vec<ChordEvent>, AnalysisError> {
        if !hop_duration.is_finite() || hop_duration <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "hop duration must be positive, got {}",
                hop_duration
            )));
        }

        let total_duration = signal.duration_seconds();
        log::debug!(
            "Predicting chords over {:.2}s at a {:.2}s hop",
            total_duration,
            hop_duration
        );

        let mut events = Vec::new();
        // Timestamps derive from the window index so they stay exact
        // multiples of the hop
        let mut window = 0u64;
        loop {
            let timestamp = window as f64 * hop_duration;
            if timestamp + hop_duration > total_duration {
                break;
            }

            let (label, confidence) = self.predict_segment(signal, timestamp, hop_duration)?;
            events.push(ChordEvent {
                timestamp,
                label,
                confidence,
            });
            window += 1;
        }

        log::debug!("Predicted {} chord events", events.len());

        Ok(events)
    }
}

/// Softmax with max-subtraction for numerical stability
fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}
