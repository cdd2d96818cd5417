//! Logical buttons and the click events derived from them

use std::fmt;

/// The five transport buttons on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    PlayPause,
    VolumeUp,
    VolumeDown,
    SkipBack,
    SkipForward,
}

impl Button {
    pub const ALL: [Button; 5] = [
        Button::PlayPause,
        Button::VolumeUp,
        Button::VolumeDown,
        Button::SkipBack,
        Button::SkipForward,
    ];

    /// Only the skip buttons distinguish single from double presses
    pub fn supports_double_click(&self) -> bool {
        matches!(self, Self::SkipBack | Self::SkipForward)
    }

    /// Keyboard binding used by the mock input mode
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            ' ' => Some(Self::PlayPause),
            '+' | '=' => Some(Self::VolumeUp),
            '-' => Some(Self::VolumeDown),
            ',' | '<' => Some(Self::SkipBack),
            '.' | '>' => Some(Self::SkipForward),
            _ => None,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PlayPause => "play/pause",
            Self::VolumeUp => "volume up",
            Self::VolumeDown => "volume down",
            Self::SkipBack => "skip back",
            Self::SkipForward => "skip forward",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
}

/// Semantic click produced by the input debouncer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: Button,
    pub kind: ClickKind,
}

impl ButtonEvent {
    pub fn single(button: Button) -> Self {
        Self {
            button,
            kind: ClickKind::Single,
        }
    }

    pub fn double(button: Button) -> Self {
        Self {
            button,
            kind: ClickKind::Double,
        }
    }
}
