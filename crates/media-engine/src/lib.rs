//! Media Engine - audiobook playback model for TaleTiles

mod backend;
mod chapters;
mod engine;
mod error;
mod loader;
mod probe;
mod simulated;

pub use backend::{AudioBackend, EndOfFileCallback, SeekMode};
pub use chapters::ChapterList;
pub use engine::{
    FileEndOutcome, PlaybackEngine, PlaybackSession, PlaybackSnapshot, DEFAULT_RESTART_THRESHOLD_SECS,
    DEFAULT_VOLUME,
};
pub use error::{EngineError, EngineResult};
pub use loader::{audio_files, is_audio_file, read_title, Audiobook, AUDIO_EXTENSIONS};
pub use probe::{probe_all, probe_duration};
pub use simulated::{SimulatedBackend, SimulatedControl};
pub use taletiles_core::Chapter;
