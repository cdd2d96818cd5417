// FILE: crates/media-engine/src/backend.rs
//! The seam between the playback model and whatever produces sound

use crate::error::EngineResult;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    /// Offset from the current position
    Relative,
    /// Offset from the start of the current file
    Absolute,
}

/// Invoked from the backend's own thread when the current file plays out
pub type EndOfFileCallback = Arc<dyn Fn() + Send + Sync>;

/// A player that handles one file at a time.
///
/// Implementations clamp seeks to `[0, duration]` and report positions in
/// seconds from the start of the loaded file.
pub trait AudioBackend: Send {
    fn name(&self) -> &'static str;

    /// Loads a file, replacing the previous one. Playback does not start.
    fn load(&mut self, path: &Path) -> EngineResult<()>;

    /// Starts or resumes the loaded file
    fn play(&mut self) -> EngineResult<()>;

    fn pause(&mut self) -> EngineResult<()>;

    /// True when a file is loaded and paused
    fn is_paused(&self) -> bool;

    fn seek(&mut self, offset: f64, mode: SeekMode) -> EngineResult<()>;

    /// Unloads the current file
    fn stop(&mut self) -> EngineResult<()>;

    /// Position within the loaded file, `None` when nothing is loaded
    fn position(&self) -> Option<f64>;

    /// Duration of the loaded file if known
    fn duration(&self) -> Option<f64>;

    /// True once the loaded file has played to its end
    fn is_finished(&self) -> bool;

    fn set_volume(&mut self, volume: u8) -> EngineResult<()>;

    fn set_end_of_file_callback(&mut self, callback: EndOfFileCallback);

    /// Releases the output device and any helper threads
    fn shutdown(&mut self) -> EngineResult<()>;
}
