//! Process-wide state handed to the runtime instead of living in globals

use crate::error::{PlayerError, PlayerResult};
use crate::events::PlayerEvent;
use crossbeam_channel::Sender;
use std::sync::Arc;
use taletiles_config::Settings;
use taletiles_core::{RunningFlag, SharedClock};

#[derive(Clone)]
pub struct PlayerContext {
    settings: Arc<Settings>,
    clock: SharedClock,
    running: RunningFlag,
}

impl PlayerContext {
    pub fn new(settings: Settings, clock: SharedClock) -> Self {
        Self {
            settings: Arc::new(settings),
            clock,
            running: RunningFlag::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn clock(&self) -> SharedClock {
        Arc::clone(&self.clock)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    pub fn request_shutdown(&self) {
        if self.running.is_running() {
            log::info!("Shutdown requested");
        }
        self.running.stop();
    }

    /// Routes SIGINT and SIGTERM into a shutdown request. Can be installed
    /// once per process.
    pub fn install_signal_handler(&self, events: Sender<PlayerEvent>) -> PlayerResult<()> {
        let running = self.running.clone();
        ctrlc::set_handler(move || {
            log::info!("Received shutdown signal");
            running.stop();
            let _ = events.send(PlayerEvent::Shutdown);
        })
        .map_err(|e| PlayerError::Signal(e.to_string()))
    }
}
