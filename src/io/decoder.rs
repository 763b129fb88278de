//! Audio decoding using Symphonia
//!
//! Decodes a container (MP3, WAV, FLAC, ...) from a file path or an
//! in-memory byte buffer into a mono [`Signal`] at the configured target
//! sample rate. Multi-channel audio is collapsed to mono by averaging all
//! channels per frame; the signal is resampled only when the source rate
//! differs from the target.

use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::{resampler, Signal};

/// File extensions accepted by the pipeline
///
/// Checked before any decoding work; payloads with other extensions are
/// rejected with [`AnalysisError::UnsupportedFormat`].
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["mp3", "wav", "flac", "aiff", "ogg", "m4a"];

/// True if the (case-insensitive) extension is in the allow-list
pub fn is_allowed_extension(extension: &str) -> bool {
    let extension = extension.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|e| *e == extension)
}

/// Decode an audio file into a mono signal at the configured rate
///
/// The extension is taken from the path and validated against the
/// allow-list before the file is opened.
///
/// # Errors
///
/// Returns [`AnalysisError::UnsupportedFormat`] for extensions outside the
/// allow-list and [`AnalysisError::DecodeError`] for unreadable or corrupt
/// input.
pub fn decode_file(path: &Path, config: &AnalysisConfig) -> Result<Signal, AnalysisError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if !is_allowed_extension(&extension) {
        return Err(AnalysisError::UnsupportedFormat(format!(
            "extension '{}' not in {:?}",
            extension, ALLOWED_EXTENSIONS
        )));
    }

    log::debug!("Decoding audio file: {}", path.display());

    let file = std::fs::File::open(path)
        .map_err(|e| AnalysisError::DecodeError(format!("failed to open {}: {}", path.display(), e)))?;

    decode_source(Box::new(file), &extension, config)
}

/// Decode an in-memory audio payload with a declared extension
///
/// This is the entry point for uploaded byte buffers; the declared
/// extension is validated against the allow-list before any decoding work.
pub fn decode_bytes(
    data: Vec<u8>,
    extension: &str,
    config: &AnalysisConfig,
) -> Result<Signal, AnalysisError> {
    let extension = extension.to_ascii_lowercase();

    if !is_allowed_extension(&extension) {
        return Err(AnalysisError::UnsupportedFormat(format!(
            "extension '{}' not in {:?}",
            extension, ALLOWED_EXTENSIONS
        )));
    }

    log::debug!("Decoding {} byte payload ({})", data.len(), extension);

    decode_source(Box::new(Cursor::new(data)), &extension, config)
}

/// Decode any media source to mono PCM and resample to the target rate
fn decode_source(
    source: Box<dyn MediaSource>,
    extension: &str,
    config: &AnalysisConfig,
) -> Result<Signal, AnalysisError> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    hint.with_extension(extension);

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AnalysisError::DecodeError(format!("failed to probe container: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::DecodeError("no audio track found".to_string()))?;

    let track_id = track.id;
    let source_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::DecodeError("sample rate unknown".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AnalysisError::DecodeError(format!("failed to create decoder: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                return Err(AnalysisError::DecodeError(format!(
                    "error reading packet: {}",
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AnalysisError::DecodeError(format!("failed to decode packet: {}", e)))?;

        let spec = *decoded.spec();
        let channels = spec.channels.count();

        if sample_buf.is_none() {
            sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }

        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            if channels <= 1 {
                mono.extend_from_slice(buf.samples());
            } else {
                mono.extend(
                    buf.samples()
                        .chunks_exact(channels)
                        .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                );
            }
        }
    }

    if mono.is_empty() {
        return Err(AnalysisError::DecodeError(
            "no audio samples decoded".to_string(),
        ));
    }

    log::debug!(
        "Decoded {} mono samples at {} Hz ({:.2}s)",
        mono.len(),
        source_rate,
        mono.len() as f64 / source_rate as f64
    );

    let samples = if source_rate != config.sample_rate {
        resampler::resample(&mono, source_rate, config.sample_rate)?
    } else {
        mono
    };

    Ok(Signal::new(samples, config.sample_rate))
}
