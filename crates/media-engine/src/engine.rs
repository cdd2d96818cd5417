// FILE: crates/media-engine/src/engine.rs
//! Chapter/file/position model for the one loaded audiobook

use crate::backend::{AudioBackend, SeekMode};
use crate::chapters::ChapterList;
use crate::error::{EngineError, EngineResult};
use crate::loader::Audiobook;
use std::path::{Path, PathBuf};
use taletiles_core::Chapter;

pub const DEFAULT_VOLUME: u8 = 75;
pub const DEFAULT_RESTART_THRESHOLD_SECS: f64 = 5.0;

/// What happened when the backend reported the end of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEndOutcome {
    /// Moved on to the file at this index and started it
    Advanced(usize),
    /// The last file ended; playback stopped
    Finished,
    /// Nothing was playing or the report was stale
    Idle,
}

/// Point-in-time playback state, as persisted for a card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub file_index: usize,
    pub position_seconds: f64,
    pub volume: u8,
}

/// In-memory state for the loaded audiobook
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    title: String,
    folder: Option<PathBuf>,
    files: Vec<PathBuf>,
    spine_durations: Vec<f64>,
    chapters: ChapterList,
    current_file_index: usize,
    playing: bool,
    started: bool,
    restore_position: Option<f64>,
}

impl PlaybackSession {
    /// Returns the audiobook title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the source folder, `None` for sessions built from a file list
    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    /// Returns the audio files in playback order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Returns per-file durations, empty when unknown
    pub fn spine_durations(&self) -> &[f64] {
        &self.spine_durations
    }

    /// Returns the validated chapter list
    pub fn chapters(&self) -> &ChapterList {
        &self.chapters
    }

    /// Returns the index of the file being played
    pub fn current_file_index(&self) -> usize {
        self.current_file_index
    }

    /// Returns true while audio is playing
    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

pub struct PlaybackEngine {
    backend: Box<dyn AudioBackend>,
    session: Option<PlaybackSession>,
    volume: u8,
    restart_threshold: f64,
}

impl PlaybackEngine {
    /// Creates an engine with no session at the default volume
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            session: None,
            volume: DEFAULT_VOLUME,
            restart_threshold: DEFAULT_RESTART_THRESHOLD_SECS,
        }
    }

    /// Seconds into a chapter after which "previous" restarts it instead
    pub fn with_restart_threshold(mut self, seconds: f64) -> Self {
        self.restart_threshold = seconds.max(0.0);
        self
    }

    /// Returns the name of the audio backend
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Gives direct access to the audio backend
    pub fn backend_mut(&mut self) -> &mut dyn AudioBackend {
        self.backend.as_mut()
    }

    /// Replaces any current session with a new one positioned at the first file.
    pub fn load(
        &mut self,
        files: Vec<PathBuf>,
        chapters: Vec<Chapter>,
        spine_durations: Vec<f64>,
    ) -> EngineResult<()> {
        let title = files
            .first()
            .and_then(|f| f.parent())
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.load_session(None, title, files, chapters, spine_durations)
    }

    /// Starts a session for a folder opened by [`Audiobook::open`]
    pub fn load_audiobook(&mut self, book: &Audiobook) -> EngineResult<()> {
        self.load_session(
            Some(book.folder.clone()),
            book.title.clone(),
            book.files.clone(),
            book.chapters.clone(),
            book.spine_durations.clone(),
        )
    }

    fn load_session(
        &mut self,
        folder: Option<PathBuf>,
        title: String,
        files: Vec<PathBuf>,
        chapters: Vec<Chapter>,
        spine_durations: Vec<f64>,
    ) -> EngineResult<()> {
        if files.is_empty() {
            return Err(EngineError::EmptyFileList(folder.unwrap_or_default()));
        }

        self.unload()?;

        let chapters = match ChapterList::validated(chapters, files.len()) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("{}; chapter navigation unavailable for '{}'", e, title);
                ChapterList::new()
            }
        };

        let spine_durations = if spine_durations.len() == files.len()
            && spine_durations.iter().all(|d| d.is_finite() && *d >= 0.0)
        {
            spine_durations
        } else {
            if !spine_durations.is_empty() {
                log::warn!(
                    "Ignoring {} spine durations for {} files",
                    spine_durations.len(),
                    files.len()
                );
            }
            Vec::new()
        };

        log::info!(
            "Loaded '{}': {} files, {} chapters",
            title,
            files.len(),
            chapters.len()
        );

        self.session = Some(PlaybackSession {
            title,
            folder,
            files,
            spine_durations,
            chapters,
            current_file_index: 0,
            playing: false,
            started: false,
            restore_position: None,
        });
        Ok(())
    }

    /// Returns the current session, if any
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Returns true when an audiobook is loaded
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Returns true while the loaded audiobook is playing
    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.playing)
    }

    /// Returns the loaded audiobook's title
    pub fn title(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.title.as_str())
    }

    /// Returns the number of files, 0 when nothing is loaded
    pub fn file_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.files.len())
    }

    /// Returns the number of chapters, 0 when nothing is loaded
    pub fn chapter_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.chapters.len())
    }

    /// Returns the index of the current file, 0 when nothing is loaded
    pub fn current_file_index(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.current_file_index)
    }

    /// Returns the current volume (0-100)
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Clamps to [0, 100] and applies to the backend. Returns the new volume.
    pub fn set_volume(&mut self, volume: i32) -> EngineResult<u8> {
        self.volume = volume.clamp(0, 100) as u8;
        self.backend.set_volume(self.volume)?;
        Ok(self.volume)
    }

    /// Resumes a paused file or starts the current one. No-op without a session.
    pub fn play(&mut self) -> EngineResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        if session.started && self.backend.is_paused() {
            self.backend.play()?;
            session.playing = true;
            return Ok(());
        }

        if !session.playing {
            let start = session.restore_position.take().unwrap_or(0.0);
            self.play_current_file(start)?;
        }
        Ok(())
    }

    /// Pauses playback. No-op without a session.
    pub fn pause(&mut self) -> EngineResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if session.playing {
            self.backend.pause()?;
            session.playing = false;
        }
        Ok(())
    }

    /// Switches between playing and paused
    pub fn toggle(&mut self) -> EngineResult<()> {
        if self.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Seeks within the current file. Before the file has started, the seek
    /// adjusts the position it will start from.
    pub fn seek(&mut self, offset: f64, relative: bool) -> EngineResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        if !session.started {
            let base = if relative {
                session.restore_position.unwrap_or(0.0)
            } else {
                0.0
            };
            session.restore_position = Some((base + offset).max(0.0));
            return Ok(());
        }

        let mode = if relative {
            SeekMode::Relative
        } else {
            SeekMode::Absolute
        };
        self.backend.seek(offset, mode)
    }

    /// Moves to `offset_seconds` in the file at `file_index`, starting that
    /// file if it is not the one already playing.
    pub fn seek_to_position(&mut self, file_index: usize, offset_seconds: f64) -> EngineResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if file_index >= session.files.len() {
            return Err(EngineError::InvalidState(format!(
                "file index {} out of range ({} files)",
                file_index,
                session.files.len()
            )));
        }

        let offset = offset_seconds.max(0.0);
        if file_index != session.current_file_index || !session.started {
            session.current_file_index = file_index;
            self.play_current_file(offset)
        } else {
            self.backend.seek(offset, SeekMode::Absolute)
        }
    }

    /// Position within the current file
    pub fn position(&self) -> f64 {
        match self.session.as_ref() {
            Some(s) if s.started => self.backend.position().unwrap_or(0.0),
            Some(s) => s.restore_position.unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Returns the last chapter whose start has been reached
    pub fn current_chapter(&self) -> Option<Chapter> {
        let session = self.session.as_ref()?;
        session
            .chapters
            .chapter_at(session.current_file_index, self.position())
            .cloned()
    }

    /// "3/15" style progress for the current position
    pub fn chapter_progress(&self) -> String {
        match self.session.as_ref() {
            Some(session) => session.chapters.progress(self.current_chapter().as_ref()),
            None => ChapterList::new().progress(None),
        }
    }

    /// Jumps to the following chapter, or the next file when the book has no
    /// chapters. Returns the chapter jumped to.
    pub fn next_chapter(&mut self) -> EngineResult<Option<Chapter>> {
        let Some(session) = self.session.as_ref() else {
            return Ok(None);
        };

        if session.chapters.is_empty() {
            let next_file = session.current_file_index + 1;
            if next_file < session.files.len() {
                self.seek_to_position(next_file, 0.0)?;
            }
            return Ok(None);
        }

        let next_index = self.current_chapter().map_or(0, |c| c.index + 1);
        let Some(target) = session.chapters.get(next_index).cloned() else {
            return Ok(None);
        };
        self.seek_to_position(target.spine_index, target.offset_seconds)?;
        Ok(Some(target))
    }

    /// Restarts the current chapter once past the restart threshold,
    /// otherwise jumps to the previous one. Without chapters the same rule
    /// applies to files.
    pub fn previous_chapter(&mut self) -> EngineResult<Option<Chapter>> {
        let Some(session) = self.session.as_ref() else {
            return Ok(None);
        };
        let position = self.position();

        if session.chapters.is_empty() {
            let current = session.current_file_index;
            let target = if position > self.restart_threshold || current == 0 {
                current
            } else {
                current - 1
            };
            self.seek_to_position(target, 0.0)?;
            return Ok(None);
        }

        let Some(current) = self.current_chapter() else {
            return Ok(None);
        };

        let elapsed = if current.spine_index == session.current_file_index {
            position - current.offset_seconds
        } else {
            position
        };

        let target = if elapsed > self.restart_threshold || current.index == 0 {
            current
        } else {
            match session.chapters.get(current.index - 1) {
                Some(previous) => previous.clone(),
                None => current,
            }
        };
        self.seek_to_position(target.spine_index, target.offset_seconds)?;
        Ok(Some(target))
    }

    /// Position from the start of the book. Falls back to the in-file
    /// position when durations are unknown.
    pub fn total_position(&self) -> f64 {
        let Some(session) = self.session.as_ref() else {
            return 0.0;
        };
        let preceding: f64 = session
            .spine_durations
            .iter()
            .take(session.current_file_index)
            .sum();
        preceding + self.position()
    }

    /// Returns the sum of spine durations, or the current file's duration without them
    pub fn total_duration(&self) -> f64 {
        let Some(session) = self.session.as_ref() else {
            return 0.0;
        };
        if session.spine_durations.is_empty() {
            self.backend.duration().unwrap_or(0.0)
        } else {
            session.spine_durations.iter().sum()
        }
    }

    /// Records where the next [`play_from_restored`](Self::play_from_restored)
    /// starts. Nothing is played here.
    pub fn restore(&mut self, file_index: usize, position_seconds: f64) -> EngineResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(EngineError::InvalidState("no audiobook loaded".to_string()));
        };

        let (file_index, position) = if file_index < session.files.len() {
            (file_index, position_seconds.max(0.0))
        } else {
            log::warn!(
                "Saved file index {} out of range for '{}', starting over",
                file_index,
                session.title
            );
            (0, 0.0)
        };

        if session.started {
            self.backend.stop()?;
        }
        session.current_file_index = file_index;
        session.restore_position = Some(position);
        session.started = false;
        session.playing = false;
        Ok(())
    }

    /// Starts playback at the position recorded by [`restore`](Self::restore)
    pub fn play_from_restored(&mut self) -> EngineResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(EngineError::InvalidState("no audiobook loaded".to_string()));
        };
        let start = session.restore_position.take().unwrap_or(0.0);
        log::info!(
            "Resuming '{}' at file {}, {:.1}s",
            session.title,
            session.current_file_index,
            start
        );
        self.play_current_file(start)
    }

    /// Advances past a file that played out.
    pub fn handle_file_end(&mut self) -> EngineResult<FileEndOutcome> {
        let Some(session) = self.session.as_mut() else {
            return Ok(FileEndOutcome::Idle);
        };
        if !session.started || !self.backend.is_finished() {
            return Ok(FileEndOutcome::Idle);
        }

        let next = session.current_file_index + 1;
        if next < session.files.len() {
            session.current_file_index = next;
            self.play_current_file(0.0)?;
            log::info!("Advanced to file {}", next);
            return Ok(FileEndOutcome::Advanced(next));
        }

        session.playing = false;
        session.started = false;
        session.restore_position = None;
        self.backend.stop()?;
        log::info!("Finished '{}'", session.title);
        Ok(FileEndOutcome::Finished)
    }

    /// Stops the backend but keeps the session; `play` resumes where it stopped.
    pub fn stop(&mut self) -> EngineResult<()> {
        let position = self.position();
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if session.started {
            self.backend.stop()?;
            session.restore_position = Some(position);
        }
        session.started = false;
        session.playing = false;
        Ok(())
    }

    /// Stops playback and drops the session
    pub fn unload(&mut self) -> EngineResult<()> {
        if let Some(session) = self.session.take() {
            log::debug!("Unloading '{}'", session.title);
            if session.started {
                self.backend.stop()?;
            }
        }
        Ok(())
    }

    /// Unloads the session and releases the backend
    pub fn shutdown(&mut self) -> EngineResult<()> {
        let unloaded = self.unload();
        self.backend.shutdown()?;
        unloaded
    }

    /// Returns the position and volume to persist, `None` without a session
    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        let session = self.session.as_ref()?;
        Some(PlaybackSnapshot {
            file_index: session.current_file_index,
            position_seconds: self.position(),
            volume: self.volume,
        })
    }

    fn play_current_file(&mut self, start: f64) -> EngineResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(EngineError::InvalidState("no audiobook loaded".to_string()));
        };
        let path = session
            .files
            .get(session.current_file_index)
            .cloned()
            .ok_or_else(|| EngineError::InvalidState("file index out of range".to_string()))?;

        self.backend.load(&path)?;
        self.backend.set_volume(self.volume)?;
        self.backend.play()?;
        if start > 0.0 {
            self.backend.seek(start, SeekMode::Absolute)?;
        }

        session.started = true;
        session.playing = true;
        session.restore_position = None;
        log::debug!("Playing {} from {:.1}s", path.display(), start);
        Ok(())
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        if let Err(e) = self.backend.shutdown() {
            log::warn!("Backend shutdown failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::{SimulatedBackend, SimulatedControl};
    use std::sync::Arc;
    use taletiles_core::ManualClock;

    fn engine_with(durations: &[f64]) -> (PlaybackEngine, ManualClock, SimulatedControl, Vec<PathBuf>) {
        let clock = ManualClock::new();
        let backend = SimulatedBackend::with_probing(Arc::new(clock.clone()), false);
        let control = backend.control();
        let files: Vec<PathBuf> = (0..durations.len())
            .map(|i| PathBuf::from(format!("/books/test/{:02}.mp3", i + 1)))
            .collect();
        for (file, duration) in files.iter().zip(durations) {
            control.set_duration(file.clone(), *duration);
        }
        (PlaybackEngine::new(Box::new(backend)), clock, control, files)
    }

    #[test]
    fn test_load_rejects_empty_file_list() {
        let (mut engine, _, _, _) = engine_with(&[]);
        let result = engine.load(Vec::new(), Vec::new(), Vec::new());
        assert!(matches!(result, Err(EngineError::EmptyFileList(_))));
        assert!(!engine.is_loaded());
    }

    #[test]
    fn test_operations_without_session_are_noops() {
        let (mut engine, _, _, _) = engine_with(&[]);
        engine.play().expect("Should ignore play");
        engine.pause().expect("Should ignore pause");
        engine.toggle().expect("Should ignore toggle");
        engine.seek(30.0, true).expect("Should ignore seek");
        assert_eq!(engine.next_chapter().expect("Should ignore next"), None);
        assert_eq!(engine.previous_chapter().expect("Should ignore previous"), None);
        assert_eq!(engine.total_position(), 0.0);
        assert!(engine.snapshot().is_none());
        assert!(engine.restore(0, 0.0).is_err());
    }

    #[test]
    fn test_play_pause_resume() {
        let (mut engine, clock, control, files) = engine_with(&[600.0]);
        engine.load(files.clone(), Vec::new(), Vec::new()).expect("Should load");
        assert!(!engine.is_playing());

        engine.play().expect("Should play");
        assert_eq!(control.current_file(), Some(files[0].clone()));
        clock.advance_secs(20.0);

        engine.toggle().expect("Should pause");
        assert!(!engine.is_playing());
        clock.advance_secs(100.0);
        assert_eq!(engine.position(), 20.0);

        engine.toggle().expect("Should resume");
        clock.advance_secs(5.0);
        assert_eq!(engine.position(), 25.0);
    }

    #[test]
    fn test_volume_is_clamped() {
        let (mut engine, _, control, _) = engine_with(&[]);
        assert_eq!(engine.set_volume(130).expect("Should set"), 100);
        assert_eq!(engine.set_volume(-4).expect("Should set"), 0);
        assert_eq!(control.volume(), 0);
    }

    #[test]
    fn test_restore_applies_volume_before_seek() {
        let (mut engine, _, control, files) = engine_with(&[100.0, 100.0]);
        engine.load(files.clone(), Vec::new(), vec![100.0, 100.0]).expect("Should load");
        engine.set_volume(40).expect("Should set volume");
        engine.restore(1, 42.0).expect("Should restore");
        assert!(!engine.is_playing());
        assert_eq!(engine.position(), 42.0);

        engine.play_from_restored().expect("Should play");
        assert!(engine.is_playing());
        assert_eq!(control.current_file(), Some(files[1].clone()));
        assert_eq!(control.volume(), 40);
        assert_eq!(engine.total_position(), 142.0);
    }

    #[test]
    fn test_restore_out_of_range_starts_over() {
        let (mut engine, _, _, files) = engine_with(&[100.0]);
        engine.load(files, Vec::new(), Vec::new()).expect("Should load");
        engine.restore(7, 12.0).expect("Should restore");
        assert_eq!(engine.current_file_index(), 0);
        assert_eq!(engine.position(), 0.0);
    }

    #[test]
    fn test_file_end_advances_then_finishes() {
        let (mut engine, clock, _, files) = engine_with(&[10.0, 10.0]);
        engine.load(files, Vec::new(), vec![10.0, 10.0]).expect("Should load");
        engine.play().expect("Should play");

        assert_eq!(engine.handle_file_end().expect("Should check"), FileEndOutcome::Idle);

        clock.advance_secs(10.0);
        assert_eq!(engine.handle_file_end().expect("Should advance"), FileEndOutcome::Advanced(1));
        assert_eq!(engine.position(), 0.0);

        clock.advance_secs(10.0);
        assert_eq!(engine.handle_file_end().expect("Should finish"), FileEndOutcome::Finished);
        assert!(!engine.is_playing());
        assert_eq!(engine.handle_file_end().expect("Should ignore"), FileEndOutcome::Idle);
    }

    #[test]
    fn test_next_file_without_chapters() {
        let (mut engine, _, _, files) = engine_with(&[100.0, 100.0]);
        engine.load(files, Vec::new(), Vec::new()).expect("Should load");
        engine.play().expect("Should play");

        engine.next_chapter().expect("Should advance");
        assert_eq!(engine.current_file_index(), 1);
        engine.next_chapter().expect("Should stay");
        assert_eq!(engine.current_file_index(), 1);
    }

    #[test]
    fn test_invalid_chapters_disable_navigation() {
        let (mut engine, _, _, files) = engine_with(&[100.0, 100.0]);
        let unordered = vec![Chapter::new(0, "Late", 1, 0.0), Chapter::new(1, "Early", 0, 0.0)];
        engine.load(files, unordered, Vec::new()).expect("Should still load");
        assert_eq!(engine.chapter_count(), 0);
        assert_eq!(engine.chapter_progress(), "No chapters");
    }

    #[test]
    fn test_total_duration_without_metadata_uses_current_file() {
        let (mut engine, _, _, files) = engine_with(&[80.0, 90.0]);
        engine.load(files, Vec::new(), Vec::new()).expect("Should load");
        engine.play().expect("Should play");
        assert_eq!(engine.total_duration(), 80.0);
    }

    #[test]
    fn test_stop_keeps_session_and_position() {
        let (mut engine, clock, _, files) = engine_with(&[100.0]);
        engine.load(files, Vec::new(), Vec::new()).expect("Should load");
        engine.play().expect("Should play");
        clock.advance_secs(12.0);

        engine.stop().expect("Should stop");
        assert!(engine.is_loaded());
        assert_eq!(engine.position(), 12.0);

        engine.play().expect("Should play again");
        assert_eq!(engine.position(), 12.0);
    }
}
