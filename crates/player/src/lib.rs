//! TaleTiles player: the coordinator and the runtime around it
//!
//! Card and button workers, the autosave timer and the audio backend's
//! end-of-file notification all push [`PlayerEvent`]s into one queue. The
//! [`PlayerRuntime`] drains that queue into the [`Coordinator`], which is the
//! only code that touches the playback engine and the state store.

mod autosave;
mod context;
mod coordinator;
mod error;
mod events;
mod runtime;

pub use autosave::AutosaveLoop;
pub use context::PlayerContext;
pub use coordinator::Coordinator;
pub use error::{PlayerError, PlayerResult};
pub use events::{PlayerAction, PlayerEvent};
pub use runtime::{PlayerRuntime, RuntimeHandles, RuntimeOptions};
