use media_engine::EngineError;
use taletiles_config::ConfigError;
use taletiles_display::DisplayError;
use taletiles_input::InputError;
use thiserror::Error;

pub type PlayerResult<T> = Result<T, PlayerError>;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Playback error: {0}")]
    Engine(#[from] EngineError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Failed to install signal handler: {0}")]
    Signal(String),

    #[error("Failed to start {worker}: {source}")]
    Spawn {
        worker: String,
        source: std::io::Error,
    },
}
