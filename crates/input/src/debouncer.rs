//! Single and double click detection
//!
//! A press on a double-click button emits `Single` at once and opens a
//! window. A second press inside the window emits `Double` and closes it.
//! Expiry of the window emits nothing. Other buttons emit `Single` on every
//! press.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use taletiles_core::{Button, ButtonEvent};

pub const DEFAULT_DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct InputDebouncer {
    window: Duration,
    /// Time of the pending first press, per button
    pending: HashMap<Button, Instant>,
}

impl InputDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn press(&mut self, button: Button, now: Instant) -> ButtonEvent {
        if !button.supports_double_click() {
            return ButtonEvent::single(button);
        }

        if let Some(first) = self.pending.remove(&button) {
            if now.saturating_duration_since(first) < self.window {
                return ButtonEvent::double(button);
            }
        }

        self.pending.insert(button, now);
        ButtonEvent::single(button)
    }

    /// Clears windows that have run out by `now`. Returns how many closed.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.pending.len();
        let window = self.window;
        self.pending
            .retain(|_, first| now.saturating_duration_since(*first) < window);
        before - self.pending.len()
    }

    pub fn is_pending(&self, button: Button) -> bool {
        self.pending.contains_key(&button)
    }

    pub fn cancel(&mut self, button: Button) {
        self.pending.remove(&button);
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending double-click window(s)", self.pending.len());
        }
        self.pending.clear();
    }
}

impl Default for InputDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK_WINDOW)
    }
}
