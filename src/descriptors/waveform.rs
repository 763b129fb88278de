//! Waveform envelope downsampling
//!
//! Reduces a signal to a fixed number of RMS amplitude points for display,
//! produced in a single batch pass.

use serde::{Deserialize, Serialize};

use crate::io::Signal;

/// Fixed gain applied to bucket RMS values before clamping
const AMPLITUDE_SCALE: f64 = 1000.0;

/// Inclusive amplitude clamp bounds
const AMPLITUDE_MIN: f64 = 5.0;
const AMPLITUDE_MAX: f64 = 100.0;

/// One point of the downsampled amplitude envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformPoint {
    /// Time offset in seconds, rounded to 2 decimal places
    pub time: f64,
    /// RMS amplitude scaled into [5, 100], rounded to 2 decimal places
    pub amplitude: f64,
}

/// Downsample a signal into `num_points` amplitude points
///
/// The signal is split into `num_points` contiguous buckets of
/// `ceil(len / num_points)` samples; the final bucket may be shorter but
/// is still emitted. Each point carries the bucket's scaled RMS amplitude
/// clamped to `[5, 100]` and a timestamp at `(i / num_points) * duration`.
/// Always returns exactly `num_points` points (buckets past the end of a
/// very short signal sit at the clamp floor).
pub fn waveform_envelope(signal: &Signal, num_points: usize) -> Vec<WaveformPoint> {
    if num_points == 0 {
        return Vec::new();
    }

    let samples = signal.samples();
    let duration = signal.duration_seconds();
    let samples_per_point = if samples.is_empty() {
        0
    } else {
        samples.len().div_ceil(num_points)
    };

    let mut points = Vec::with_capacity(num_points);
    for i in 0..num_points {
        let start = (i * samples_per_point).min(samples.len());
        let end = (start + samples_per_point).min(samples.len());
        let bucket = &samples[start..end];

        let rms = if bucket.is_empty() {
            0.0
        } else {
            (bucket.iter().map(|s| (*s as f64) * (*s as f64)).sum::<f64>() / bucket.len() as f64)
                .sqrt()
        };
        let amplitude = (rms * AMPLITUDE_SCALE).clamp(AMPLITUDE_MIN, AMPLITUDE_MAX);

        let time = (i as f64 / num_points as f64) * duration;
        points.push(WaveformPoint {
            time: round2(time),
            amplitude: round2(amplitude),
        });
    }

    points
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
