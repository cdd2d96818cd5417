//! Error types for card reading and button dispatch

use taletiles_core::AppError;
use thiserror::Error;

pub type InputResult<T> = Result<T, InputError>;

/// A single failed attempt to talk to the card reader
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Reader not available: {0}")]
    Unavailable(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to start {worker}: {source}")]
    SpawnFailed {
        worker: String,
        source: std::io::Error,
    },

    #[error("Handler for {event} failed: {message}")]
    HandlerFailed { event: String, message: String },

    #[error("Handler for {event} panicked: {message}")]
    HandlerPanicked { event: String, message: String },

    #[error(transparent)]
    Reader(#[from] ReaderError),
}

impl From<ReaderError> for AppError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::Unavailable(reason) => AppError::HardwareUnavailable {
                device: "card reader".to_string(),
                reason,
            },
            other => AppError::transient("card reader", other.to_string()),
        }
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::HandlerFailed { event, message }
            | InputError::HandlerPanicked { event, message } => {
                AppError::HandlerFault { event, message }
            }
            InputError::SpawnFailed { worker, source } => {
                AppError::startup(format!("could not start {}", worker), source)
            }
            InputError::Reader(e) => e.into(),
        }
    }
}
