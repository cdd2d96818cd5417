//! The small status struct published to the display

use super::CardId;
use std::fmt;

/// Playback status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
    Loading,
}

impl PlaybackStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Loading => "Loading",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a display needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub title: String,
    pub chapter_current: usize,
    pub chapter_total: usize,
    pub chapter_title: String,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub time_remaining_seconds: f64,
    pub volume: u8,
    pub status: PlaybackStatus,
    /// Transient status text ("Ready", "Unknown card: ..."), shown instead of the title
    pub message: String,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            title: String::new(),
            chapter_current: 0,
            chapter_total: 0,
            chapter_title: String::new(),
            position_seconds: 0.0,
            duration_seconds: 0.0,
            time_remaining_seconds: 0.0,
            volume: 75,
            status: PlaybackStatus::Stopped,
            message: String::new(),
        }
    }
}

impl DisplayState {
    pub fn ready() -> Self {
        Self::with_message("Ready", PlaybackStatus::Stopped)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_message(message, PlaybackStatus::Stopped)
    }

    pub fn loading(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            status: PlaybackStatus::Loading,
            ..Self::default()
        }
    }

    /// "Unknown card: 04a1b2c3..." with the id cut to 8 characters
    pub fn unknown_card(card_id: &CardId) -> Self {
        Self::error(format!("Unknown card: {}", card_id.abbreviated(8)))
    }

    pub fn playing(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: PlaybackStatus::Playing,
            ..Self::default()
        }
    }

    pub fn paused(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: PlaybackStatus::Paused,
            ..Self::default()
        }
    }

    pub fn with_message(message: impl Into<String>, status: PlaybackStatus) -> Self {
        Self {
            message: message.into(),
            status,
            ..Self::default()
        }
    }

    /// True when the change from `previous` must be shown without throttling
    pub fn is_discrete_change_from(&self, previous: &DisplayState) -> bool {
        self.status != previous.status
            || self.title != previous.title
            || self.message != previous.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_volume() {
        assert_eq!(DisplayState::default().volume, 75);
        assert_eq!(DisplayState::default().status, PlaybackStatus::Stopped);
    }

    #[test]
    fn test_ready_state() {
        let state = DisplayState::ready();
        assert_eq!(state.message, "Ready");
        assert_eq!(state.status, PlaybackStatus::Stopped);
    }

    #[test]
    fn test_unknown_card_message_is_shortened() {
        let state = DisplayState::unknown_card(&CardId::new("04a1b2c3d4e5f6"));
        assert_eq!(state.message, "Unknown card: 04a1b2c3...");
        assert_eq!(state.status, PlaybackStatus::Stopped);
    }

    #[test]
    fn test_discrete_change_detection() {
        let base = DisplayState {
            title: "Dune".to_string(),
            status: PlaybackStatus::Playing,
            ..DisplayState::default()
        };

        let mut volume_only = base.clone();
        volume_only.volume = 80;
        assert!(!volume_only.is_discrete_change_from(&base));
        assert_ne!(volume_only, base);

        let mut paused = base.clone();
        paused.status = PlaybackStatus::Paused;
        assert!(paused.is_discrete_change_from(&base));
    }
}
