//! Spectral feature extraction
//!
//! Mel-scaled log spectrograms over fixed-duration analysis segments; the
//! model-ready feature tensor for the chord classifier.

pub mod extractor;
pub mod mel;

/// A mel-scaled log spectrogram
///
/// Dense row-major matrix of `bands x frames` decibel values, referenced to
/// the matrix's own peak. One of these is the unit of classification.
#[derive(Debug, Clone, PartialEq)]
pub struct MelSpectrogram {
    bands: usize,
    frames: usize,
    data: Vec<f32>,
}

impl MelSpectrogram {
    /// Create a spectrogram from row-major band-by-frame data
    pub fn new(bands: usize, frames: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), bands * frames);
        Self {
            bands,
            frames,
            data,
        }
    }

    /// Number of mel bands (rows)
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Number of time frames (columns)
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Row-major band-by-frame values
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value at (band, frame)
    pub fn value(&self, band: usize, frame: usize) -> f32 {
        self.data[band * self.frames + frame]
    }

    /// True if the spectrogram holds no frames
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Mean over all values
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }

    /// Population standard deviation over all values
    pub fn std(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .data
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum::<f32>()
            / self.data.len() as f32;
        variance.sqrt()
    }

    /// Normalize in place to zero mean and unit variance
    ///
    /// `epsilon` guards the division for constant-valued tensors.
    pub fn normalize(&mut self, epsilon: f32) {
        let mean = self.mean();
        let std = self.std();
        for v in &mut self.data {
            *v = (*v - mean) / (std + epsilon);
        }
    }
}
