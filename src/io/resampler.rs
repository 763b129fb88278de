//! Sample-rate conversion using rubato
//!
//! Sinc interpolation with a BlackmanHarris2 window and a 256-tap filter,
//! processed in a single pass over the whole mono signal.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::AnalysisError;

/// Resample mono samples from `source_rate` to `target_rate`
///
/// Returns the input unchanged when the rates already match or the input is
/// empty.
///
/// # Errors
///
/// Returns [`AnalysisError::ProcessingError`] if the resampler cannot be
/// constructed or the conversion fails.
pub fn resample(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, AnalysisError> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    if source_rate == 0 || target_rate == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "invalid sample rates: {} -> {}",
            source_rate, target_rate
        )));
    }

    log::debug!(
        "Resampling {} samples from {} Hz to {} Hz",
        samples.len(),
        source_rate,
        target_rate
    );

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = target_rate as f64 / source_rate as f64;

    // Chunk size equal to the input length: the whole signal is converted in
    // one pass.
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)
        .map_err(|e| AnalysisError::ProcessingError(format!("failed to create resampler: {}", e)))?;

    let output = resampler
        .process(&[samples.to_vec()], None)
        .map_err(|e| AnalysisError::ProcessingError(format!("resampling failed: {}", e)))?;

    let resampled = output.into_iter().next().unwrap_or_default();

    log::debug!(
        "Resampled {} frames ({} Hz) -> {} frames ({} Hz)",
        samples.len(),
        source_rate,
        resampled.len(),
        target_rate
    );

    Ok(resampled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_identity_when_rates_match() {
        let samples = vec![0.1f32, 0.2, 0.3];
        let output = resample(&samples, 22050, 22050).unwrap();
        assert_eq!(output, samples);
    }

    #[test]
    fn test_resample_empty() {
        let output = resample(&[], 44100, 22050).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 44100.0).sin())
            .collect();

        let output = resample(&samples, 44100, 22050).unwrap();
        let expected = samples.len() as f64 / 2.0;
        assert!(
            (output.len() as f64 - expected).abs() < expected * 0.05,
            "expected ~{} samples, got {}",
            expected,
            output.len()
        );
    }

    #[test]
    fn test_resample_invalid_rate() {
        let result = resample(&[0.0f32; 16], 0, 22050);
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }
}
