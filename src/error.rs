//! Error types for the chord analysis engine

use std::fmt;

/// Errors that can occur during audio analysis
#[derive(Debug, Clone)]
pub enum AnalysisError {
    /// Invalid input parameters
    InvalidInput(String),

    /// File format not in the supported allow-list
    UnsupportedFormat(String),

    /// Audio decoding error (unreadable or corrupt input)
    DecodeError(String),

    /// Processing error during analysis
    ProcessingError(String),

    /// Classifier loading or inference error
    InferenceError(String),

    /// Vocabulary save/load error
    PersistenceError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            AnalysisError::DecodeError(msg) => write!(f, "Decoding error: {}", msg),
            AnalysisError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            AnalysisError::InferenceError(msg) => write!(f, "Inference error: {}", msg),
            AnalysisError::PersistenceError(msg) => write!(f, "Persistence error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
