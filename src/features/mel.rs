//! Mel spectrogram computation
//!
//! Hann-windowed, centered STFT power spectrogram mapped through a
//! Slaney-style mel filterbank and converted to decibels referenced to the
//! peak of the matrix itself.
//!
//! The output is deterministic for identical input and configuration.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use super::MelSpectrogram;

/// Numerical floor for power values entering the log
const AMIN: f32 = 1e-10;

/// Dynamic range of the decibel output below the peak
const TOP_DB: f32 = 80.0;

/// Slaney mel scale: linear below 1 kHz, logarithmic above
fn hz_to_mel(hz: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        hz / F_SP
    }
}

fn mel_to_hz(mel: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * ((mel - MIN_LOG_MEL) * logstep).exp()
    } else {
        mel * F_SP
    }
}

/// Triangular mel filterbank with Slaney area normalization
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    n_mels: usize,
    n_bins: usize,
    /// Row-major `n_mels x n_bins` weights
    weights: Vec<f32>,
}

impl MelFilterbank {
    /// Build a filterbank spanning 0 Hz to the Nyquist frequency
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let n_bins = n_fft / 2 + 1;
        let nyquist = sample_rate as f32 / 2.0;

        // Band edges evenly spaced on the mel scale, n_mels + 2 points
        let mel_min = hz_to_mel(0.0);
        let mel_max = hz_to_mel(nyquist);
        let hz_points: Vec<f32> = (0..n_mels + 2)
            .map(|i| {
                let mel = mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32;
                mel_to_hz(mel)
            })
            .collect();

        let mut weights = vec![0.0f32; n_mels * n_bins];
        for m in 0..n_mels {
            let lower = hz_points[m];
            let center = hz_points[m + 1];
            let upper = hz_points[m + 2];
            // Area normalization keeps per-band energy comparable
            let enorm = 2.0 / (upper - lower);

            for k in 0..n_bins {
                let freq = k as f32 * sample_rate as f32 / n_fft as f32;
                let rising = if center > lower {
                    (freq - lower) / (center - lower)
                } else {
                    0.0
                };
                let falling = if upper > center {
                    (upper - freq) / (upper - center)
                } else {
                    0.0
                };
                let weight = rising.min(falling).max(0.0);
                weights[m * n_bins + k] = weight * enorm;
            }
        }

        Self {
            n_mels,
            n_bins,
            weights,
        }
    }

    /// Number of mel bands
    pub fn n_mels(&self) -> usize {
        self.n_mels
    }

    /// Map one frame of FFT bin powers into mel band powers
    fn apply(&self, bin_powers: &[f32], out: &mut [f32]) {
        for (m, slot) in out.iter_mut().enumerate() {
            let row = &self.weights[m * self.n_bins..(m + 1) * self.n_bins];
            *slot = row
                .iter()
                .zip(bin_powers)
                .map(|(w, p)| w * p)
                .sum::<f32>();
        }
    }
}

/// Compute a mel-scaled log spectrogram
///
/// The signal is reflect-padded by `n_fft / 2` on both sides so frames are
/// centered on their timestamps, then analyzed with a periodic Hann window
/// at the given hop. Powers are mapped through the mel filterbank and
/// converted to decibels referenced to the matrix peak, floored 80 dB
/// below it.
pub fn mel_spectrogram(
    samples: &[f32],
    sample_rate: u32,
    n_fft: usize,
    hop_length: usize,
    n_mels: usize,
) -> MelSpectrogram {
    if samples.is_empty() || n_fft == 0 || hop_length == 0 || n_mels == 0 {
        return MelSpectrogram::new(n_mels, 0, Vec::new());
    }

    let pad = n_fft / 2;
    let padded = reflect_pad(samples, pad);

    let n_frames = if padded.len() >= n_fft {
        (padded.len() - n_fft) / hop_length + 1
    } else {
        0
    };
    if n_frames == 0 {
        return MelSpectrogram::new(n_mels, 0, Vec::new());
    }

    let filterbank = MelFilterbank::new(sample_rate, n_fft, n_mels);
    let n_bins = n_fft / 2 + 1;

    // Periodic Hann window
    let window: Vec<f32> = (0..n_fft)
        .map(|n| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * n as f32 / n_fft as f32).cos())
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);

    let mut data = vec![0.0f32; n_mels * n_frames];
    let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];
    let mut bin_powers = vec![0.0f32; n_bins];
    let mut mel_powers = vec![0.0f32; n_mels];

    for frame in 0..n_frames {
        let start = frame * hop_length;
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex::new(padded[start + i] * window[i], 0.0);
        }

        fft.process(&mut buffer);

        for (k, power) in bin_powers.iter_mut().enumerate() {
            *power = buffer[k].norm_sqr();
        }

        filterbank.apply(&bin_powers, &mut mel_powers);
        for (m, power) in mel_powers.iter().enumerate() {
            data[m * n_frames + frame] = *power;
        }
    }

    power_to_db(&mut data);

    MelSpectrogram::new(n_mels, n_frames, data)
}

/// Convert powers to decibels referenced to the matrix peak, in place
fn power_to_db(data: &mut [f32]) {
    let peak = data.iter().copied().fold(AMIN, f32::max);
    let ref_db = 10.0 * peak.log10();

    for v in data.iter_mut() {
        let db = 10.0 * v.max(AMIN).log10() - ref_db;
        *v = db.max(-TOP_DB);
    }
}

/// Pad a signal on both sides by mirroring around its endpoints
fn reflect_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let len = samples.len();
    let mut padded = Vec::with_capacity(len + 2 * pad);
    for i in 0..len + 2 * pad {
        let pos = i as isize - pad as isize;
        padded.push(samples[reflect_index(pos, len)]);
    }
    padded
}

/// Mirror an out-of-range position back into `[0, len)` without repeating
/// the edge sample
fn reflect_index(pos: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let mut p = pos % period;
    if p < 0 {
        p += period;
    }
    if p >= len as isize {
        p = period - p;
    }
    p as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let count = (sample_rate as f32 * seconds) as usize;
        (0..count)
            .map(|i| (i as f32 * freq * 2.0 * std::f32::consts::PI / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_mel_scale_roundtrip() {
        for hz in [0.0f32, 100.0, 440.0, 1000.0, 4000.0, 11025.0] {
            let roundtrip = mel_to_hz(hz_to_mel(hz));
            assert!(
                (roundtrip - hz).abs() < 0.5,
                "{} Hz round-tripped to {}",
                hz,
                roundtrip
            );
        }
    }

    #[test]
    fn test_filterbank_weights_nonnegative() {
        let filterbank = MelFilterbank::new(22050, 2048, 128);
        assert_eq!(filterbank.n_mels(), 128);
        assert!(filterbank.weights.iter().all(|w| *w >= 0.0));
    }

    #[test]
    fn test_frame_count_matches_hop() {
        let samples = sine(440.0, 22050, 0.5);
        let spec = mel_spectrogram(&samples, 22050, 2048, 512, 128);
        // Centered analysis: one frame per hop plus one
        let expected = samples.len() / 512 + 1;
        assert_eq!(spec.frames(), expected);
        assert_eq!(spec.bands(), 128);
    }

    #[test]
    fn test_db_range() {
        let samples = sine(440.0, 22050, 0.5);
        let spec = mel_spectrogram(&samples, 22050, 2048, 512, 128);
        let max = spec.data().iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min = spec.data().iter().copied().fold(f32::INFINITY, f32::min);
        assert!((max - 0.0).abs() < 1e-3, "peak should sit at 0 dB, got {}", max);
        assert!(min >= -80.0 - 1e-3, "floor should be -80 dB, got {}", min);
    }

    #[test]
    fn test_deterministic() {
        let samples = sine(523.25, 22050, 0.25);
        let a = mel_spectrogram(&samples, 22050, 2048, 512, 128);
        let b = mel_spectrogram(&samples, 22050, 2048, 512, 128);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input() {
        let spec = mel_spectrogram(&[], 22050, 2048, 512, 128);
        assert_eq!(spec.frames(), 0);
        assert!(spec.is_empty());
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-2, 5), 2);
        assert_eq!(reflect_index(-1, 5), 1);
        assert_eq!(reflect_index(0, 5), 0);
        assert_eq!(reflect_index(4, 5), 4);
        assert_eq!(reflect_index(5, 5), 3);
        assert_eq!(reflect_index(6, 5), 2);
        assert_eq!(reflect_index(3, 1), 0);
    }
}
