//! Card identity and presence events

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity read from a physical card
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for narrow displays: first `max` characters followed by `...`
    pub fn abbreviated(&self, max: usize) -> String {
        if self.0.chars().count() <= max {
            self.0.clone()
        } else {
            let head: String = self.0.chars().take(max).collect();
            format!("{}...", head)
        }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Presence transition reported by the card monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardEvent {
    Placed(CardId),
    Removed(CardId),
}

impl CardEvent {
    pub fn card_id(&self) -> &CardId {
        match self {
            Self::Placed(id) | Self::Removed(id) => id,
        }
    }
}
