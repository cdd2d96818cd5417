//! Domain types for TaleTiles
//!
//! - `card`: card identity and presence events
//! - `button`: logical buttons and click events
//! - `chapter`: chapter markers within an audiobook spine
//! - `display`: the status struct published to displays

mod button;
mod card;
mod chapter;
mod display;

pub use button::{Button, ButtonEvent, ClickKind};
pub use card::{CardEvent, CardId};
pub use chapter::Chapter;
pub use display::{DisplayState, PlaybackStatus};
