//! Durable card registrations and playback positions
//!
//! The store keeps the whole state document in memory and writes it back
//! only when something changed. Writes go through a temporary sibling and an
//! atomic rename, so a power cut leaves either the previous document or the
//! new one on disk. A document that fails to parse is copied to
//! `<name>.backup` before the store falls back to defaults.

use crate::atomic;
use crate::display_config::DisplayConfig;
use crate::document::{AudiobookRecord, AudiobookRegistration, MissingAudiobook, StateDocument};
use crate::{ConfigError, ConfigResult};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use taletiles_core::{AppError, CardId};

pub struct StateStore {
    path: PathBuf,
    document: StateDocument,
    dirty: bool,
}

impl StateStore {
    /// Opens the document at `path`, creating defaults if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let mut store = Self {
            path: path.into(),
            document: StateDocument::default(),
            dirty: false,
        };
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Re-reads the document from disk.
    ///
    /// A corrupt document is backed up and replaced by defaults; only a
    /// failure to make that backup is returned as an error.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.path.exists() {
            log::info!(
                "No state file at {}, starting with defaults",
                self.path.display()
            );
            self.document = StateDocument::default();
            self.dirty = true;
            return Ok(());
        }

        match self.read_document() {
            Ok(document) => {
                log::info!(
                    "Loaded {} registration(s) from {}",
                    document.audiobooks.len(),
                    self.path.display()
                );
                self.document = document;
                self.dirty = false;
            }
            Err(e) => {
                log::error!("Failed to load state: {}", e);
                AppError::ConfigurationCorrupted {
                    path: self.path.clone(),
                }
                .log();
                let backup = atomic::backup_file(&self.path)?;
                log::warn!("Backed up corrupted state to {}", backup.display());
                self.document = StateDocument::default();
                self.dirty = true;
            }
        }
        Ok(())
    }

    fn read_document(&self) -> ConfigResult<StateDocument> {
        let contents = fs::read_to_string(&self.path).map_err(|e| ConfigError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;

        serde_json::from_str(&contents).map_err(|e| ConfigError::StateParseError {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Writes the document if anything changed since the last save.
    pub fn save(&mut self) -> ConfigResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.document)?;
        atomic::write_atomic(&self.path, &json)?;
        self.dirty = false;

        log::debug!("State saved to {}", self.path.display());
        Ok(())
    }

    pub fn volume(&self) -> u8 {
        self.document.global_volume
    }

    /// Clamps to [0, 100]; only marks the store dirty when the value changes
    pub fn set_volume(&mut self, volume: i32) {
        let volume = volume.clamp(0, 100) as u8;
        if self.document.global_volume != volume {
            self.document.global_volume = volume;
            self.dirty = true;
        }
    }

    pub fn display_config(&self) -> &DisplayConfig {
        &self.document.display
    }

    pub fn get(&self, card_id: &CardId) -> Option<AudiobookRegistration> {
        self.document
            .audiobooks
            .get(card_id)
            .map(|record| AudiobookRegistration::from_record(card_id, record))
    }

    pub fn all(&self) -> Vec<AudiobookRegistration> {
        self.document
            .audiobooks
            .iter()
            .map(|(id, record)| AudiobookRegistration::from_record(id, record))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.document.audiobooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.audiobooks.is_empty()
    }

    /// Creates or replaces the registration for `card_id` and saves immediately.
    pub fn register(
        &mut self,
        card_id: CardId,
        path: impl AsRef<Path>,
        title: impl Into<String>,
    ) -> ConfigResult<AudiobookRegistration> {
        let record = AudiobookRecord {
            path: resolve_path(path.as_ref()),
            title: title.into(),
            current_file_index: 0,
            position_seconds: 0.0,
            last_played: None,
            added_date: Some(Local::now().naive_local()),
        };

        let registration = AudiobookRegistration::from_record(&card_id, &record);
        log::info!("Registered audiobook: {} (card: {})", record.title, card_id);

        self.document.audiobooks.insert(card_id, record);
        self.dirty = true;
        self.save()?;

        Ok(registration)
    }

    /// Removes the registration and saves. Returns whether one existed.
    pub fn unregister(&mut self, card_id: &CardId) -> ConfigResult<bool> {
        if self.document.audiobooks.remove(card_id).is_none() {
            return Ok(false);
        }

        self.dirty = true;
        self.save()?;
        log::info!("Unregistered card: {}", card_id);
        Ok(true)
    }

    /// Records the playback position in memory; the caller decides when to `save()`.
    ///
    /// Returns `false` if the card is not registered.
    pub fn update_position(&mut self, card_id: &CardId, file_index: usize, position_seconds: f64) -> bool {
        match self.document.audiobooks.get_mut(card_id) {
            Some(record) => {
                record.current_file_index = file_index;
                record.position_seconds = position_seconds.max(0.0);
                record.last_played = Some(Local::now().naive_local());
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn find_card_by_path(&self, path: impl AsRef<Path>) -> Option<CardId> {
        let resolved = resolve_path(path.as_ref());
        self.document
            .audiobooks
            .iter()
            .find(|(_, record)| record.path == resolved)
            .map(|(id, _)| id.clone())
    }

    /// Every registration whose folder no longer exists
    pub fn validate_paths(&self) -> Vec<MissingAudiobook> {
        self.document
            .audiobooks
            .iter()
            .filter(|(_, record)| !record.path.exists())
            .map(|(id, record)| MissingAudiobook {
                card_id: id.clone(),
                title: if record.title.is_empty() {
                    "Unknown".to_string()
                } else {
                    record.title.clone()
                },
                path: record.path.clone(),
            })
            .collect()
    }
}

fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("Should create temp dir");
        let path = dir.path().join("config.json");
        (dir, path)
    }

    #[test]
    fn test_missing_file_starts_dirty_with_defaults() {
        let (_dir, path) = setup();
        let mut store = StateStore::open(&path).expect("Should open");

        assert!(store.is_dirty());
        assert_eq!(store.volume(), 75);
        assert!(store.is_empty());

        store.save().expect("Should save");
        assert!(path.exists());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_save_is_noop_when_clean() {
        let (_dir, path) = setup();
        let mut store = StateStore::open(&path).expect("Should open");
        store.save().expect("Should save");

        fs::write(&path, "sentinel").expect("Should overwrite");
        store.save().expect("Should save");

        assert_eq!(fs::read_to_string(&path).expect("Should read"), "sentinel");
    }

    #[test]
    fn test_volume_clamps_and_tracks_changes() {
        let (_dir, path) = setup();
        let mut store = StateStore::open(&path).expect("Should open");
        store.save().expect("Should save");

        store.set_volume(75);
        assert!(!store.is_dirty());

        store.set_volume(150);
        assert_eq!(store.volume(), 100);
        assert!(store.is_dirty());

        store.set_volume(-4);
        assert_eq!(store.volume(), 0);
    }

    #[test]
    fn test_register_persists_immediately() {
        let (dir, path) = setup();
        let book = dir.path().join("Dune");
        fs::create_dir(&book).expect("Should create book dir");

        let mut store = StateStore::open(&path).expect("Should open");
        let reg = store
            .register(CardId::new("card1"), &book, "Dune")
            .expect("Should register");

        assert_eq!(reg.current_file_index, 0);
        assert_eq!(reg.position_seconds, 0.0);
        assert!(reg.added.is_some());
        assert!(!store.is_dirty());

        let reopened = StateStore::open(&path).expect("Should reopen");
        assert_eq!(reopened.get(&CardId::new("card1")).map(|r| r.title), Some("Dune".to_string()));
    }

    #[test]
    fn test_register_overwrites_existing_card() {
        let (dir, path) = setup();
        let mut store = StateStore::open(&path).expect("Should open");
        let id = CardId::new("card1");

        store.register(id.clone(), dir.path(), "First").expect("Should register");
        store.update_position(&id, 4, 99.0);
        store.register(id.clone(), dir.path(), "Second").expect("Should register");

        let reg = store.get(&id).expect("Should exist");
        assert_eq!(store.len(), 1);
        assert_eq!(reg.title, "Second");
        assert_eq!(reg.current_file_index, 0);
    }

    #[test]
    fn test_update_position_defers_flush() {
        let (dir, path) = setup();
        let mut store = StateStore::open(&path).expect("Should open");
        let id = CardId::new("card1");
        store.register(id.clone(), dir.path(), "Book").expect("Should register");

        assert!(store.update_position(&id, 2, 145.5));
        assert!(store.is_dirty());
        assert!(store.get(&id).and_then(|r| r.last_played).is_some());

        let on_disk = StateStore::open(&path).expect("Should reopen");
        assert_eq!(on_disk.get(&id).map(|r| r.current_file_index), Some(0));

        assert!(!store.update_position(&CardId::new("nope"), 1, 1.0));
    }

    #[test]
    fn test_unregister() {
        let (dir, path) = setup();
        let mut store = StateStore::open(&path).expect("Should open");
        let id = CardId::new("card1");
        store.register(id.clone(), dir.path(), "Book").expect("Should register");

        assert!(store.unregister(&id).expect("Should unregister"));
        assert!(!store.unregister(&id).expect("Should unregister"));
        assert!(StateStore::open(&path).expect("Should reopen").is_empty());
    }

    #[test]
    fn test_corrupt_document_is_backed_up_and_reset() {
        let (dir, path) = setup();
        fs::write(&path, "{ \"global_volume\": 40, \"audiobooks\": {").expect("Should write");

        let store = StateStore::open(&path).expect("Should recover");

        assert!(store.is_empty());
        assert_eq!(store.volume(), 75);
        assert!(store.is_dirty());
        let backup = dir.path().join("config.json.backup");
        assert!(fs::read_to_string(backup)
            .expect("Backup should exist")
            .contains("\"global_volume\": 40"));
    }

    #[test]
    fn test_find_card_by_path_resolves_relative_forms() {
        let (dir, path) = setup();
        let book = dir.path().join("Book");
        fs::create_dir(&book).expect("Should create book dir");
        let mut store = StateStore::open(&path).expect("Should open");
        store.register(CardId::new("c"), &book, "Book").expect("Should register");

        let dotted = book.join("..").join("Book");
        assert_eq!(store.find_card_by_path(&dotted), Some(CardId::new("c")));
        assert_eq!(store.find_card_by_path(dir.path()), None);
    }

    #[test]
    fn test_validate_paths_lists_missing_folders() {
        let (dir, path) = setup();
        let present = dir.path().join("Present");
        let gone = dir.path().join("Gone");
        fs::create_dir(&present).expect("Should create dir");
        fs::create_dir(&gone).expect("Should create dir");

        let mut store = StateStore::open(&path).expect("Should open");
        store.register(CardId::new("a"), &present, "Present").expect("Should register");
        store.register(CardId::new("b"), &gone, "Gone").expect("Should register");
        fs::remove_dir(&gone).expect("Should remove dir");

        let missing = store.validate_paths();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].card_id, CardId::new("b"));
        assert_eq!(missing[0].title, "Gone");
    }
}
