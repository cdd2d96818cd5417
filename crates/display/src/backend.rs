//! Render backend seam

use crate::error::DisplayResult;
use taletiles_core::{DisplayState, PlaybackStatus};

/// A display that can draw one [`DisplayState`] at a time.
///
/// The set of implementations is closed: [`MockDisplay`](crate::MockDisplay),
/// [`CharLcdDisplay`](crate::CharLcdDisplay) and
/// [`EinkDisplay`](crate::EinkDisplay).
pub trait RenderBackend: Send {
    fn name(&self) -> &'static str;

    /// Prepares the hardware. Called once before the first render.
    fn init(&mut self) -> DisplayResult<()>;

    fn render(&mut self, state: &DisplayState) -> DisplayResult<()>;

    fn clear(&mut self) -> DisplayResult<()>;

    /// Releases the hardware. No renders follow.
    fn cleanup(&mut self) -> DisplayResult<()>;
}

/// Single-character status marker for narrow displays
pub(crate) fn status_char(status: PlaybackStatus) -> char {
    match status {
        PlaybackStatus::Stopped => ' ',
        PlaybackStatus::Playing => '>',
        PlaybackStatus::Paused => '=',
        PlaybackStatus::Loading => '*',
    }
}
