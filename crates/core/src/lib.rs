//! Shared domain types, error taxonomy and threading primitives for TaleTiles

pub mod clock;
pub mod error;
pub mod types;
pub mod worker;

pub use clock::{system_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    Button, ButtonEvent, CardEvent, CardId, Chapter, ClickKind, DisplayState, PlaybackStatus,
};
pub use worker::{RunningFlag, WorkerHandle};
