//! Chord vocabulary
//!
//! The canonical label space of the classifier: 12 chromatic roots crossed
//! with 8 qualities, plus the sentinel `"N"` ("no chord / unrecognized") at
//! index 0, for 97 classes total. Free-form chord names are canonicalized
//! through a fixed normalization grammar and mapped to integer class
//! indices; the mapping is bijective and can be persisted to JSON so the
//! classifier's output space stays pinned across process restarts.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Sentinel label for "no chord / unrecognized"
pub const SENTINEL: &str = "N";

/// Class index of the sentinel label
pub const SENTINEL_INDEX: usize = 0;

/// The 12 canonical chromatic root spellings
pub const ROOTS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Canonical roots ordered longest spelling first, for prefix matching
const ROOTS_BY_LENGTH: [&str; 12] = [
    "C#", "D#", "F#", "G#", "A#", "C", "D", "E", "F", "G", "A", "B",
];

/// Enharmonic aliases resolved as prefix substitutions, in a fixed order
const ROOT_ALIASES: [(&str, &str); 7] = [
    ("Db", "C#"),
    ("Eb", "D#"),
    ("Fb", "E"),
    ("Gb", "F#"),
    ("Ab", "G#"),
    ("Bb", "A#"),
    ("Cb", "B"),
];

/// The 8 chord qualities in table order
pub const QUALITIES: [&str; 8] = ["maj", "min", "dim", "aug", "7", "maj7", "min7", "dim7"];

/// Bidirectional chord-string / class-index mapping
///
/// Built once at construction from the enumerated root-by-quality grid;
/// indexable in both directions in O(1).
#[derive(Debug, Clone)]
pub struct ChordVocabulary {
    chord_to_idx: HashMap<String, usize>,
    idx_to_chord: Vec<String>,
}

/// Durable JSON form of the vocabulary: the forward map plus its inverse
#[derive(Serialize, Deserialize)]
struct VocabularySnapshot {
    chord_to_idx: HashMap<String, usize>,
    idx_to_chord: HashMap<usize, String>,
}

impl ChordVocabulary {
    /// Build the canonical vocabulary
    pub fn new() -> Self {
        let mut chord_to_idx = HashMap::new();
        let mut idx_to_chord = Vec::with_capacity(1 + ROOTS.len() * QUALITIES.len());

        chord_to_idx.insert(SENTINEL.to_string(), SENTINEL_INDEX);
        idx_to_chord.push(SENTINEL.to_string());

        for root in ROOTS {
            for quality in QUALITIES {
                let chord = format!("{}{}", root, quality);
                chord_to_idx.insert(chord.clone(), idx_to_chord.len());
                idx_to_chord.push(chord);
            }
        }

        Self {
            chord_to_idx,
            idx_to_chord,
        }
    }

    /// Number of classes, sentinel included
    pub fn num_classes(&self) -> usize {
        self.idx_to_chord.len()
    }

    /// Canonicalize a free-form chord name
    ///
    /// Unrecognized input normalizes to the sentinel. Quality tests are
    /// substring matches over the post-root suffix, applied in a fixed
    /// priority order; the first match wins.
    pub fn normalize(&self, chord: &str) -> String {
        if chord.is_empty() || chord == "N" || chord == "X" {
            return SENTINEL.to_string();
        }

        // Enharmonic prefix substitution; the first matching alias wins
        let chord = ROOT_ALIASES
            .iter()
            .find_map(|(alias, canonical)| {
                chord
                    .strip_prefix(alias)
                    .map(|rest| format!("{}{}", canonical, rest))
            })
            .unwrap_or_else(|| chord.to_string());

        let root = match ROOTS_BY_LENGTH
            .iter()
            .copied()
            .find(|root| chord.starts_with(root))
        {
            Some(root) => root,
            None => return SENTINEL.to_string(),
        };

        let raw_suffix = &chord[root.len()..];
        let suffix = raw_suffix.to_lowercase();

        let quality = if suffix.contains("maj7") || raw_suffix.contains("M7") {
            "maj7"
        } else if suffix.contains("min7") || suffix.contains("m7") {
            "min7"
        } else if suffix.contains("dim7") {
            "dim7"
        } else if suffix.contains('7') {
            "7"
        } else if suffix.contains("dim") {
            "dim"
        } else if suffix.contains("aug") {
            "aug"
        } else if suffix.contains("min") || suffix.contains('m') {
            "min"
        } else {
            "maj"
        };

        format!("{}{}", root, quality)
    }

    /// Normalize a chord name and look up its class index
    ///
    /// Total over all string input: anything that fails to normalize into
    /// the table yields the sentinel index.
    pub fn encode(&self, chord: &str) -> usize {
        self.chord_to_idx
            .get(&self.normalize(chord))
            .copied()
            .unwrap_or(SENTINEL_INDEX)
    }

    /// Look up the canonical label for a class index
    ///
    /// Unknown indices decode to the sentinel.
    pub fn decode(&self, index: usize) -> &str {
        self.idx_to_chord
            .get(index)
            .map(String::as_str)
            .unwrap_or(SENTINEL)
    }

    /// Persist the mapping (and its inverse) as JSON
    pub fn save(&self, path: &Path) -> Result<(), AnalysisError> {
        let snapshot = VocabularySnapshot {
            chord_to_idx: self.chord_to_idx.clone(),
            idx_to_chord: self
                .idx_to_chord
                .iter()
                .cloned()
                .enumerate()
                .collect(),
        };

        let file = File::create(path).map_err(|e| {
            AnalysisError::PersistenceError(format!("failed to create {}: {}", path.display(), e))
        })?;
        serde_json::to_writer(BufWriter::new(file), &snapshot)
            .map_err(|e| AnalysisError::PersistenceError(format!("failed to write snapshot: {}", e)))
    }

    /// Reload a persisted mapping
    ///
    /// The snapshot must describe a bijection: the inverse map must be
    /// contiguous from index 0 and agree with the forward map entry for
    /// entry.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let file = File::open(path).map_err(|e| {
            AnalysisError::PersistenceError(format!("failed to open {}: {}", path.display(), e))
        })?;
        let snapshot: VocabularySnapshot = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AnalysisError::PersistenceError(format!("failed to parse snapshot: {}", e)))?;

        let num_classes = snapshot.idx_to_chord.len();
        if snapshot.chord_to_idx.len() != num_classes {
            return Err(AnalysisError::PersistenceError(format!(
                "mapping is not a bijection: {} labels vs {} indices",
                snapshot.chord_to_idx.len(),
                num_classes
            )));
        }

        let mut idx_to_chord = vec![String::new(); num_classes];
        for (index, chord) in snapshot.idx_to_chord {
            if index >= num_classes {
                return Err(AnalysisError::PersistenceError(format!(
                    "non-contiguous class index {}",
                    index
                )));
            }
            idx_to_chord[index] = chord;
        }

        for (chord, index) in &snapshot.chord_to_idx {
            if idx_to_chord.get(*index).map(String::as_str) != Some(chord.as_str()) {
                return Err(AnalysisError::PersistenceError(format!(
                    "forward and inverse maps disagree at '{}'",
                    chord
                )));
            }
        }

        log::debug!("Loaded chord vocabulary with {} classes", num_classes);

        Ok(Self {
            chord_to_idx: snapshot.chord_to_idx,
            idx_to_chord,
        })
    }
}

impl Default for ChordVocabulary {
    fn default() -> Self {
        Self::new()
    }
}
