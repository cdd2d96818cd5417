//! Throttled publication of [`DisplayState`] to a render backend
//!
//! Only the newest unrendered state is kept. A background loop renders it
//! once the minimum interval since the last render has passed. Changes to
//! status, title or message skip the wait.

use crate::backend::RenderBackend;
use crate::error::{DisplayError, DisplayResult};
use crate::factory::effective_type;
use crate::format::truncate;
use crate::lcd::LCD_COLUMNS;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use taletiles_config::DisplayType;
use taletiles_core::{CardId, DisplayState, SharedClock, WorkerHandle};

pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

struct Slot {
    current: DisplayState,
    pending: Option<DisplayState>,
    last_render: Option<Instant>,
}

struct Shared {
    slot: Mutex<Slot>,
    backend: Mutex<Box<dyn RenderBackend>>,
    clock: SharedClock,
    min_interval: Duration,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn backend(&self) -> MutexGuard<'_, Box<dyn RenderBackend>> {
        self.backend.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Renders the pending state; the caller holds the slot lock.
    fn render_pending(&self, slot: &mut Slot, now: Instant) -> bool {
        let Some(state) = slot.pending.take() else {
            return false;
        };
        if let Err(e) = self.backend().render(&state) {
            log::error!("Display render failed: {}", e);
        }
        slot.current = state;
        slot.last_render = Some(now);
        true
    }

    fn tick(&self) -> bool {
        let now = self.clock.now();
        let mut slot = self.slot();

        match slot.pending.as_ref() {
            None => return false,
            Some(pending) if *pending == slot.current => {
                slot.pending = None;
                return false;
            }
            Some(_) => {}
        }

        let due = slot
            .last_render
            .is_none_or(|t| now.saturating_duration_since(t) >= self.min_interval);
        if due {
            self.render_pending(&mut slot, now)
        } else {
            false
        }
    }
}

pub struct DisplayPresenter {
    shared: Arc<Shared>,
    display_type: DisplayType,
    tick: Duration,
    worker: Option<WorkerHandle>,
}

impl DisplayPresenter {
    /// `backend` must already be initialised
    pub fn new(backend: Box<dyn RenderBackend>, min_interval: Duration, clock: SharedClock) -> Self {
        let display_type = effective_type(backend.as_ref());
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    current: DisplayState::default(),
                    pending: None,
                    last_render: None,
                }),
                backend: Mutex::new(backend),
                clock,
                min_interval,
            }),
            display_type,
            tick: DEFAULT_TICK,
            worker: None,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn display_type(&self) -> DisplayType {
        self.display_type
    }

    pub fn min_interval(&self) -> Duration {
        self.shared.min_interval
    }

    pub fn start(&mut self) -> DisplayResult<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        let tick = self.tick;
        let handle = WorkerHandle::spawn("display-presenter", move |running| {
            while running.is_running() {
                shared.tick();
                std::thread::sleep(tick);
            }
        })
        .map_err(DisplayError::SpawnFailed)?;
        self.worker = Some(handle);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.is_running())
    }

    /// Queues `state`, replacing any unrendered one
    pub fn update(&self, state: DisplayState) {
        let mut slot = self.shared.slot();
        let immediate = state.is_discrete_change_from(&slot.current);
        slot.pending = Some(state);
        if immediate {
            let now = self.shared.clock.now();
            self.shared.render_pending(&mut slot, now);
        }
    }

    /// Renders the pending state if the throttle allows. Returns whether it rendered.
    pub fn flush_due(&self) -> bool {
        self.shared.tick()
    }

    /// The last state handed to the backend
    pub fn current(&self) -> DisplayState {
        self.shared.slot().current.clone()
    }

    pub fn has_pending(&self) -> bool {
        self.shared.slot().pending.is_some()
    }

    pub fn show_ready(&self) {
        self.update(DisplayState::ready());
    }

    pub fn show_loading(&self, title: &str) {
        let message = self.fit_message(format!("Loading: {}", title));
        self.update(DisplayState::loading(title, message));
    }

    pub fn show_error(&self, message: &str) {
        self.update(DisplayState::error(self.fit_message(message.to_string())));
    }

    pub fn show_unknown_card(&self, card_id: &CardId) {
        let state = if self.is_compact() {
            DisplayState::error(truncate(
                &format!("Unknown: {}", card_id.abbreviated(8)),
                LCD_COLUMNS,
            ))
        } else {
            DisplayState::unknown_card(card_id)
        };
        self.update(state);
    }

    /// Stops the refresh loop, clears hardware panels and releases the backend.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        let stopped = match self.worker.take() {
            Some(mut worker) => worker.stop(timeout),
            None => true,
        };

        let mut backend = self.shared.backend();
        if self.display_type != DisplayType::Mock {
            if let Err(e) = backend.clear() {
                log::warn!("Display clear failed: {}", e);
            }
        }
        if let Err(e) = backend.cleanup() {
            log::warn!("Display cleanup failed: {}", e);
        }
        log::info!("Display presenter stopped");
        stopped
    }

    fn is_compact(&self) -> bool {
        self.display_type == DisplayType::Lcd1602
    }

    fn fit_message(&self, message: String) -> String {
        if self.is_compact() {
            truncate(&message, LCD_COLUMNS)
        } else {
            message
        }
    }
}

impl Drop for DisplayPresenter {
    fn drop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop(Duration::from_secs(2));
        }
    }
}
