//! On-disk layout of the state document (`config.json`)

use crate::display_config::DisplayConfig;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use taletiles_core::CardId;

pub const DEFAULT_VOLUME: u8 = 75;

/// Stored state for one card, keyed by card id in `audiobooks`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudiobookRecord {
    pub path: PathBuf,
    pub title: String,
    pub current_file_index: usize,
    pub position_seconds: f64,
    pub last_played: Option<NaiveDateTime>,
    pub added_date: Option<NaiveDateTime>,
}

impl Default for AudiobookRecord {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            title: String::new(),
            current_file_index: 0,
            position_seconds: 0.0,
            last_played: None,
            added_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StateDocument {
    pub global_volume: u8,
    pub audiobooks: BTreeMap<CardId, AudiobookRecord>,
    pub display: DisplayConfig,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            global_volume: DEFAULT_VOLUME,
            audiobooks: BTreeMap::new(),
            display: DisplayConfig::default(),
        }
    }
}

/// A card's registration as handed out by the store
#[derive(Debug, Clone, PartialEq)]
pub struct AudiobookRegistration {
    pub card_id: CardId,
    pub folder_path: PathBuf,
    pub title: String,
    pub current_file_index: usize,
    pub position_seconds: f64,
    pub last_played: Option<NaiveDateTime>,
    pub added: Option<NaiveDateTime>,
}

impl AudiobookRegistration {
    pub(crate) fn from_record(card_id: &CardId, record: &AudiobookRecord) -> Self {
        Self {
            card_id: card_id.clone(),
            folder_path: record.path.clone(),
            title: record.title.clone(),
            current_file_index: record.current_file_index,
            position_seconds: record.position_seconds,
            last_played: record.last_played,
            added: record.added_date,
        }
    }

    /// True if playback should resume rather than start from the beginning
    pub fn has_saved_position(&self) -> bool {
        self.current_file_index > 0 || self.position_seconds > 0.0
    }
}

/// A registration whose folder no longer exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAudiobook {
    pub card_id: CardId,
    pub title: String,
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_document_with_python_style_timestamps() {
        let json = r#"{
            "global_volume": 60,
            "audiobooks": {
                "584190243221": {
                    "path": "/home/pi/AudioBooks/Dune",
                    "title": "Dune",
                    "current_file_index": 3,
                    "position_seconds": 812.25,
                    "last_played": "2024-05-01T19:30:12.123456",
                    "added_date": "2024-04-28T08:00:00"
                }
            }
        }"#;

        let doc: StateDocument = serde_json::from_str(json).expect("Should parse document");
        let record = &doc.audiobooks[&CardId::new("584190243221")];

        assert_eq!(doc.global_volume, 60);
        assert_eq!(record.current_file_index, 3);
        assert!(record.last_played.is_some());
        assert_eq!(doc.display, DisplayConfig::default());
    }

    #[test]
    fn test_null_last_played() {
        let json = r#"{"audiobooks": {"a": {"path": "/x", "title": "X", "last_played": null}}}"#;
        let doc: StateDocument = serde_json::from_str(json).expect("Should parse document");
        assert_eq!(doc.global_volume, DEFAULT_VOLUME);
        assert!(doc.audiobooks[&CardId::new("a")].last_played.is_none());
    }

    #[test]
    fn test_saved_position_detection() {
        let mut record = AudiobookRecord::default();
        let id = CardId::new("c");
        assert!(!AudiobookRegistration::from_record(&id, &record).has_saved_position());

        record.position_seconds = 0.5;
        assert!(AudiobookRegistration::from_record(&id, &record).has_saved_position());

        record.position_seconds = 0.0;
        record.current_file_index = 1;
        assert!(AudiobookRegistration::from_record(&id, &record).has_saved_position());
    }
}
