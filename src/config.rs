//! Configuration parameters for the analysis pipeline

/// Analysis configuration parameters
///
/// These are global tuning constants fixed at construction time. Every
/// component of the pipeline (decoder, feature extractor, predictor,
/// descriptor estimators) reads from the same config so that sample rates
/// and window sizes stay consistent end to end.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Signal
    /// Target sample rate in Hz; every decoded signal is resampled to this
    /// rate before any downstream use (default: 22050)
    pub sample_rate: u32,

    // Spectral features
    /// FFT window size for the mel spectrogram (default: 2048)
    pub n_fft: usize,

    /// Hop size between STFT frames in samples (default: 512)
    pub hop_length: usize,

    /// Number of mel filterbank bands (default: 128)
    pub n_mels: usize,

    // Prediction
    /// Default duration of one classification segment in seconds (default: 0.5)
    pub segment_duration: f64,

    /// Step between consecutive track-level prediction windows in seconds
    /// (default: 2.0). Windows never overlap and are never skipped.
    pub hop_duration: f64,

    // Descriptors
    /// Number of points in the downsampled waveform envelope (default: 150)
    pub waveform_points: usize,

    /// BPM reported when tempo estimation fails (default: 120)
    pub fallback_bpm: u32,

    /// Minimum BPM to consider during tempo estimation (default: 60.0)
    pub min_bpm: f32,

    /// Maximum BPM to consider during tempo estimation (default: 180.0)
    pub max_bpm: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            segment_duration: 0.5,
            hop_duration: 2.0,
            waveform_points: 150,
            fallback_bpm: 120,
            min_bpm: 60.0,
            max_bpm: 180.0,
        }
    }
}
