//! The single writer over playback and persisted state
//!
//! Every card, button and timer event is handled here, one at a time, in
//! the order it was queued.

use crate::error::PlayerResult;
use crate::events::{PlayerAction, PlayerEvent};
use media_engine::{Audiobook, EngineResult, FileEndOutcome, PlaybackEngine};
use std::time::Duration;
use taletiles_config::{AudiobookRegistration, PlayerSettings, StateStore};
use taletiles_core::{
    AppError, ButtonEvent, CardEvent, CardId, DisplayState, PlaybackStatus, RecoveryAction,
};
use taletiles_display::DisplayPresenter;

/// The card whose audiobook is loaded
#[derive(Debug, Clone, PartialEq)]
struct ActiveCard {
    card_id: CardId,
    title: String,
}

pub struct Coordinator {
    engine: PlaybackEngine,
    store: StateStore,
    presenter: DisplayPresenter,
    settings: PlayerSettings,
    active: Option<ActiveCard>,
}

impl Coordinator {
    pub fn new(
        mut engine: PlaybackEngine,
        store: StateStore,
        presenter: DisplayPresenter,
        settings: PlayerSettings,
    ) -> Self {
        if let Err(e) = engine.set_volume(i32::from(store.volume())) {
            log::warn!("Could not apply saved volume: {}", e);
        }
        Self {
            engine,
            store,
            presenter,
            settings,
            active: None,
        }
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn presenter(&self) -> &DisplayPresenter {
        &self.presenter
    }

    pub fn active_card(&self) -> Option<&CardId> {
        self.active.as_ref().map(|a| &a.card_id)
    }

    /// Handles one event. Returns `false` for [`PlayerEvent::Shutdown`].
    pub fn handle(&mut self, event: PlayerEvent) -> PlayerResult<bool> {
        match event {
            PlayerEvent::Card(CardEvent::Placed(card_id)) => self.on_card_placed(&card_id)?,
            PlayerEvent::Card(CardEvent::Removed(card_id)) => self.on_card_removed(&card_id)?,
            PlayerEvent::Button(event) => self.on_button(event)?,
            PlayerEvent::AutosaveTick => self.on_autosave()?,
            PlayerEvent::FileEnded => self.on_file_ended()?,
            PlayerEvent::RefreshDisplay => self.refresh_display(),
            PlayerEvent::Shutdown => return Ok(false),
        }
        Ok(true)
    }

    pub fn on_card_placed(&mut self, card_id: &CardId) -> PlayerResult<()> {
        if self.active.as_ref().is_some_and(|a| &a.card_id == card_id) {
            return Ok(());
        }
        if let Some(previous) = self.active.clone() {
            log::warn!("Card {} replaced without removal", previous.card_id);
            self.close_session()?;
        }

        let Some(registration) = self.store.get(card_id) else {
            log::warn!("Unknown card: {}", card_id);
            self.presenter.show_unknown_card(card_id);
            return Ok(());
        };

        if !registration.folder_path.is_dir() {
            log::error!("Card {} points at a missing folder", card_id);
            self.report(AppError::AudiobookMissing {
                path: registration.folder_path.clone(),
            });
            return Ok(());
        }

        let title = if registration.title.is_empty() {
            media_engine::read_title(&registration.folder_path)
        } else {
            registration.title.clone()
        };
        log::info!("Loading '{}' for card {}", title, card_id);
        self.presenter.show_loading(&title);

        if let Err(e) = self.start_session(&registration) {
            if self.engine.is_loaded() {
                if let Err(unload) = self.engine.unload() {
                    log::warn!("Failed to release session after load failure: {}", unload);
                }
            }
            self.report(AppError::LoadFailed {
                path: registration.folder_path.clone(),
                reason: e.to_string(),
            });
            return Ok(());
        }

        self.active = Some(ActiveCard {
            card_id: card_id.clone(),
            title,
        });
        self.refresh_display();
        Ok(())
    }

    pub fn on_card_removed(&mut self, card_id: &CardId) -> PlayerResult<()> {
        match self.active.as_ref() {
            Some(active) if &active.card_id == card_id => {
                log::info!("Card {} removed, saving position", card_id);
                self.close_session()?;
            }
            Some(active) => {
                log::warn!(
                    "Removal of {} while {} is active, ignoring",
                    card_id,
                    active.card_id
                );
                return Ok(());
            }
            None => {}
        }
        self.presenter.show_ready();
        Ok(())
    }

    pub fn on_button(&mut self, event: ButtonEvent) -> PlayerResult<()> {
        if !self.engine.is_loaded() {
            log::debug!("Ignoring {} with nothing loaded", event.button);
            return Ok(());
        }
        let Some(action) = PlayerAction::for_event(event) else {
            return Ok(());
        };

        let step = i32::from(self.settings.volume_step);
        let skip = self.settings.skip_seconds;
        match action {
            PlayerAction::TogglePlayback => {
                self.engine.toggle()?;
                log::info!("{}", if self.engine.is_playing() { "Playing" } else { "Paused" });
            }
            PlayerAction::VolumeUp | PlayerAction::VolumeDown => {
                let delta = if action == PlayerAction::VolumeUp { step } else { -step };
                let volume = self.engine.set_volume(i32::from(self.engine.volume()) + delta)?;
                self.store.set_volume(i32::from(volume));
                log::info!("Volume: {}", volume);
            }
            PlayerAction::SeekBack => {
                self.engine.seek(-skip, true)?;
                log::info!("Skip back {}s", skip);
            }
            PlayerAction::SeekForward => {
                self.engine.seek(skip, true)?;
                log::info!("Skip forward {}s", skip);
            }
            PlayerAction::PreviousChapter => {
                if let Some(chapter) = self.engine.previous_chapter()? {
                    log::info!("Previous chapter: {}", chapter.title);
                }
            }
            PlayerAction::NextChapter => {
                if let Some(chapter) = self.engine.next_chapter()? {
                    log::info!("Next chapter: {}", chapter.title);
                }
            }
        }

        self.refresh_display();
        Ok(())
    }

    pub fn on_autosave(&mut self) -> PlayerResult<()> {
        if self.engine.is_playing() {
            log::debug!("Autosaving position");
            self.save_position()?;
        }
        Ok(())
    }

    pub fn on_file_ended(&mut self) -> PlayerResult<()> {
        match self.engine.handle_file_end()? {
            FileEndOutcome::Advanced(index) => {
                log::info!("Advanced to file {}", index + 1);
                self.refresh_display();
            }
            FileEndOutcome::Finished => {
                log::info!("Audiobook finished");
                self.save_position()?;
                self.refresh_display();
            }
            FileEndOutcome::Idle => {}
        }
        Ok(())
    }

    /// Writes the active card's position and the global volume to disk.
    /// Returns whether there was anything to save.
    pub fn save_position(&mut self) -> PlayerResult<bool> {
        let (Some(active), Some(snapshot)) = (self.active.as_ref(), self.engine.snapshot()) else {
            return Ok(false);
        };

        self.store
            .update_position(&active.card_id, snapshot.file_index, snapshot.position_seconds);
        self.store.set_volume(i32::from(snapshot.volume));
        self.store.save()?;
        log::debug!(
            "Saved {} at file {}, {:.1}s",
            active.card_id,
            snapshot.file_index,
            snapshot.position_seconds
        );
        Ok(true)
    }

    /// Publishes the playing/paused state of the loaded audiobook
    pub fn refresh_display(&mut self) {
        if let Some(state) = self.playback_state() {
            self.presenter.update(state);
        }
    }

    /// Loads the registration's folder and starts playback at its saved position
    fn start_session(&mut self, registration: &AudiobookRegistration) -> EngineResult<()> {
        let book = Audiobook::open(&registration.folder_path, self.settings.probe_durations)?;
        self.engine.load_audiobook(&book)?;
        self.engine.set_volume(i32::from(self.store.volume()))?;

        if registration.has_saved_position() {
            log::info!(
                "Resuming from file {}, position {:.1}s",
                registration.current_file_index,
                registration.position_seconds
            );
            self.engine
                .restore(registration.current_file_index, registration.position_seconds)?;
            self.engine.play_from_restored()
        } else {
            log::info!("Starting from beginning");
            self.engine.play()
        }
    }

    /// Logs `err` and, when its recovery calls for it, shows it on the display
    fn report(&self, err: AppError) {
        err.log();
        if err.recovery_action() == RecoveryAction::ReportOnDisplay {
            self.presenter.show_error(&err.user_message());
        }
    }

    fn playback_state(&self) -> Option<DisplayState> {
        let active = self.active.as_ref()?;
        if !self.engine.is_loaded() {
            return None;
        }

        let chapter = self.engine.current_chapter();
        let position = self.engine.total_position();
        let duration = self.engine.total_duration();
        let status = if self.engine.is_playing() {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Paused
        };

        Some(DisplayState {
            title: active.title.clone(),
            chapter_current: chapter.as_ref().map_or(0, |c| c.index + 1),
            chapter_total: self.engine.chapter_count(),
            chapter_title: chapter.map(|c| c.title).unwrap_or_default(),
            position_seconds: position,
            duration_seconds: duration,
            time_remaining_seconds: (duration - position).max(0.0),
            volume: self.engine.volume(),
            status,
            message: String::new(),
        })
    }

    fn close_session(&mut self) -> PlayerResult<()> {
        let saved = self.save_position();
        let unloaded = self.engine.unload();
        self.active = None;
        saved?;
        unloaded?;
        Ok(())
    }

    /// Saves if playing, stops the engine and display, then flushes the store.
    pub fn shutdown(&mut self, timeout: Duration) -> PlayerResult<()> {
        if self.engine.is_playing() {
            if let Err(e) = self.save_position() {
                log::error!("Failed to save position on shutdown: {}", e);
            }
        }
        self.active = None;
        if let Err(e) = self.engine.shutdown() {
            log::warn!("Engine shutdown failed: {}", e);
        }
        self.presenter.shutdown(timeout);
        self.store.save()?;
        Ok(())
    }
}
