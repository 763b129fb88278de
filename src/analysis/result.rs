//! Track analysis result types

use serde::{Deserialize, Serialize};

use crate::descriptors::waveform::WaveformPoint;
use crate::ml::predictor::ChordEvent;

/// Time signature reported for every track
pub const DEFAULT_TIME_SIGNATURE: u32 = 4;

/// Outcome flag of an analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// The pipeline ran to completion
    Completed,
    /// The pipeline aborted; no usable result
    Failed,
}

/// Track-level summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Recording duration in seconds
    pub duration_seconds: f64,

    /// Estimated tempo in beats per minute
    pub bpm: u32,

    /// Time signature (fixed default)
    pub time_signature: u32,

    /// Outcome flag
    pub status: AnalysisStatus,
}

/// One entry of the outward chord timeline
///
/// The wire-facing form of a [`ChordEvent`]: adds a human-readable
/// `m:ss` position and rescales confidence to 0-100 with one decimal
/// place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordTimelineEntry {
    /// Window start in seconds
    pub timestamp: f64,

    /// Window start as `m:ss`
    pub formatted_time: String,

    /// Canonical chord label
    pub chord: String,

    /// Confidence as a 0-100 percentage, one decimal place
    pub confidence: f32,
}

impl From<&ChordEvent> for ChordTimelineEntry {
    fn from(event: &ChordEvent) -> Self {
        let minutes = (event.timestamp / 60.0) as u64;
        let seconds = (event.timestamp % 60.0) as u64;
        Self {
            timestamp: event.timestamp,
            formatted_time: format!("{}:{:02}", minutes, seconds),
            chord: event.label.clone(),
            confidence: (event.confidence * 1000.0).round() / 10.0,
        }
    }
}

/// Analysis metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Sample rate of the analyzed signal in Hz
    pub sample_rate: u32,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f32,
}

/// Complete analysis result for one recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAnalysis {
    /// Track-level summary
    pub summary: TrackSummary,

    /// Ordered chord timeline
    pub chords: Vec<ChordTimelineEntry>,

    /// Downsampled amplitude envelope
    pub waveform: Vec<WaveformPoint>,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(timestamp: f64, label: &str, confidence: f32) -> ChordEvent {
        ChordEvent {
            timestamp,
            label: label.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_formatted_time() {
        let entry = ChordTimelineEntry::from(&event(0.0, "Cmaj", 0.5));
        assert_eq!(entry.formatted_time, "0:00");

        let entry = ChordTimelineEntry::from(&event(62.0, "Cmaj", 0.5));
        assert_eq!(entry.formatted_time, "1:02");

        let entry = ChordTimelineEntry::from(&event(125.0, "Cmaj", 0.5));
        assert_eq!(entry.formatted_time, "2:05");
    }

    #[test]
    fn test_confidence_rescaled_to_percent() {
        let entry = ChordTimelineEntry::from(&event(0.0, "Amin", 0.8765));
        assert!((entry.confidence - 87.7).abs() < 1e-4);

        let entry = ChordTimelineEntry::from(&event(0.0, "N", 0.0));
        assert_eq!(entry.confidence, 0.0);

        let entry = ChordTimelineEntry::from(&event(0.0, "Cmaj", 1.0));
        assert_eq!(entry.confidence, 100.0);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AnalysisStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&AnalysisStatus::Failed).unwrap(),
            "\"failed\""
        );
    }
}
