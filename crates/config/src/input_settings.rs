//! Card reader and button timing

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputSettings {
    /// Delay between card reads
    pub poll_interval_ms: u64,

    /// Minimum spacing between two confirmed card placements
    pub card_debounce_ms: u64,

    /// Consecutive empty reads before a card counts as removed
    pub removal_threshold: u32,

    /// Maximum gap between the two presses of a double click
    pub double_click_window_ms: u64,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            card_debounce_ms: 300,
            removal_threshold: 3,
            double_click_window_ms: 300,
        }
    }
}

impl InputSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn card_debounce(&self) -> Duration {
        Duration::from_millis(self.card_debounce_ms)
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_window_ms)
    }
}

impl ConfigSection for InputSettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.poll_interval_ms, 10, 1000, "input.poll_interval_ms"),
            Validator::in_range(self.card_debounce_ms, 0, 5000, "input.card_debounce_ms"),
            Validator::in_range(self.removal_threshold, 1, 50, "input.removal_threshold"),
            Validator::in_range(
                self.double_click_window_ms,
                50,
                2000,
                "input.double_click_window_ms",
            ),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.poll_interval_ms = other.poll_interval_ms;
        self.card_debounce_ms = other.card_debounce_ms;
        self.removal_threshold = other.removal_threshold;
        self.double_click_window_ms = other.double_click_window_ms;
    }

    fn section_name(&self) -> &'static str {
        "input"
    }
}
