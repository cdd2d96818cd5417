use thiserror::Error;

pub type DisplayResult<T> = Result<T, DisplayError>;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Failed to initialise {backend} display: {reason}")]
    InitFailed { backend: String, reason: String },

    #[error("{backend} display not initialised")]
    NotInitialized { backend: String },

    #[error("Render failed on {backend}: {reason}")]
    RenderFailed { backend: String, reason: String },

    #[error("Failed to start display loop: {0}")]
    SpawnFailed(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
