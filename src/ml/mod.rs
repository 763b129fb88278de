//! Chord classification
//!
//! The classifier itself is consumed as an opaque scoring function behind
//! [`ChordClassifier`]; the ONNX-backed implementation is optional and
//! feature-gated. [`predictor::ChordPredictor`] drives the classifier over
//! an entire recording.

pub mod predictor;

#[cfg(feature = "ml")]
pub mod onnx;

use crate::error::AnalysisError;
use crate::features::MelSpectrogram;

/// An opaque chord scoring function
///
/// Implementations are loaded once per process and are stateless across
/// calls: scoring is a pure function of the model weights and the input
/// tensor. The pipeline injects a classifier into the predictor rather
/// than reaching for ambient global state, and assumes a single concurrent
/// invocation per instance unless the backend guarantees otherwise.
pub trait ChordClassifier {
    /// Size of the class-score vector produced by [`score`](Self::score)
    fn num_classes(&self) -> usize;

    /// Score a normalized feature tensor
    ///
    /// Returns one unnormalized score per class; the predictor applies
    /// softmax. The tensor passed here is always present and already
    /// normalized to zero mean and unit variance.
    fn score(&self, features: &MelSpectrogram) -> Result<Vec<f32>, AnalysisError>;
}
