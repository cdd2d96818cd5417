//! Events consumed by the coordinator's dispatch loop

use taletiles_core::{Button, ButtonEvent, CardEvent, ClickKind};

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Card(CardEvent),
    Button(ButtonEvent),
    /// Periodic position save
    AutosaveTick,
    /// The audio backend reached the end of the current file
    FileEnded,
    /// Republish the display state without changing anything
    RefreshDisplay,
    Shutdown,
}

impl PlayerEvent {
    /// Short name used when logging handler faults
    pub fn label(&self) -> &'static str {
        match self {
            Self::Card(CardEvent::Placed(_)) => "card placed",
            Self::Card(CardEvent::Removed(_)) => "card removed",
            Self::Button(_) => "button",
            Self::AutosaveTick => "autosave",
            Self::FileEnded => "file ended",
            Self::RefreshDisplay => "display refresh",
            Self::Shutdown => "shutdown",
        }
    }
}

impl From<CardEvent> for PlayerEvent {
    fn from(event: CardEvent) -> Self {
        Self::Card(event)
    }
}

impl From<ButtonEvent> for PlayerEvent {
    fn from(event: ButtonEvent) -> Self {
        Self::Button(event)
    }
}

/// What a click asks the player to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    TogglePlayback,
    VolumeUp,
    VolumeDown,
    SeekBack,
    SeekForward,
    PreviousChapter,
    NextChapter,
}

impl PlayerAction {
    /// Maps a click to its action. Double clicks on the skip buttons move by
    /// chapter; the single click that preceded them has already seeked.
    pub fn for_event(event: ButtonEvent) -> Option<Self> {
        match (event.button, event.kind) {
            (Button::PlayPause, ClickKind::Single) => Some(Self::TogglePlayback),
            (Button::VolumeUp, ClickKind::Single) => Some(Self::VolumeUp),
            (Button::VolumeDown, ClickKind::Single) => Some(Self::VolumeDown),
            (Button::SkipBack, ClickKind::Single) => Some(Self::SeekBack),
            (Button::SkipBack, ClickKind::Double) => Some(Self::PreviousChapter),
            (Button::SkipForward, ClickKind::Single) => Some(Self::SeekForward),
            (Button::SkipForward, ClickKind::Double) => Some(Self::NextChapter),
            _ => None,
        }
    }
}
