//! Playback behaviour settings

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerSettings {
    /// How often the position is saved while audio is playing
    pub autosave_interval_secs: u64,

    /// Volume change per button press (0-100)
    pub volume_step: u8,

    /// Seek distance of a single skip press
    pub skip_seconds: f64,

    /// Past this point "previous" restarts the current chapter or file
    pub restart_threshold_secs: f64,

    /// Probe file durations when the metadata has no spine
    pub probe_durations: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            autosave_interval_secs: 30,
            volume_step: 5,
            skip_seconds: 30.0,
            restart_threshold_secs: 5.0,
            probe_durations: true,
        }
    }
}

impl PlayerSettings {
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }
}

impl ConfigSection for PlayerSettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(
                self.autosave_interval_secs,
                1,
                3600,
                "player.autosave_interval_secs",
            ),
            Validator::in_range(self.volume_step, 1, 50, "player.volume_step"),
            Validator::in_range(self.skip_seconds, 1.0, 600.0, "player.skip_seconds"),
            Validator::in_range(
                self.restart_threshold_secs,
                0.0,
                60.0,
                "player.restart_threshold_secs",
            ),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.autosave_interval_secs = other.autosave_interval_secs;
        self.volume_step = other.volume_step;
        self.skip_seconds = other.skip_seconds;
        self.restart_threshold_secs = other.restart_threshold_secs;
        self.probe_durations = other.probe_durations;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}
