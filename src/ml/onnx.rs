//! ONNX classifier backend
//!
//! Loads a trained chord model as an ONNX graph and scores feature tensors
//! through ONNX Runtime. Available behind the `ml` cargo feature.

use std::path::Path;
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::AnalysisError;
use crate::features::MelSpectrogram;
use crate::ml::ChordClassifier;

/// Chord classifier backed by an ONNX Runtime session
///
/// Load once at process start, score many times. The session is serialized
/// behind a mutex; concurrent callers queue rather than re-enter the
/// runtime.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    num_classes: usize,
}

impl OnnxClassifier {
    /// Load an ONNX model from disk
    ///
    /// `num_classes` pins the expected output width; score vectors of any
    /// other size are rejected at inference time.
    pub fn load(path: &Path, num_classes: usize) -> Result<Self, AnalysisError> {
        log::debug!("Loading ONNX model from {}", path.display());

        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| {
                AnalysisError::InferenceError(format!(
                    "failed to load model from {}: {}",
                    path.display(),
                    e
                ))
            })?;

        log::info!(
            "Loaded chord model from {} ({} classes)",
            path.display(),
            num_classes
        );

        Ok(Self {
            session: Mutex::new(session),
            num_classes,
        })
    }
}

impl ChordClassifier for OnnxClassifier {
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn score(&self, features: &MelSpectrogram) -> Result<Vec<f32>, AnalysisError> {
        let input = Tensor::from_array((
            [1usize, 1, features.bands(), features.frames()],
            features.data().to_vec(),
        ))
        .map_err(|e| AnalysisError::InferenceError(format!("failed to build input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AnalysisError::InferenceError("model session poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| AnalysisError::InferenceError(format!("inference failed: {}", e)))?;

        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| AnalysisError::InferenceError(format!("failed to read output: {}", e)))?;

        if scores.len() != self.num_classes {
            return Err(AnalysisError::InferenceError(format!(
                "model produced {} scores, expected {}",
                scores.len(),
                self.num_classes
            )));
        }

        Ok(scores.to_vec())
    }
}
