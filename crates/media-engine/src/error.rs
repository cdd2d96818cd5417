// FILE: crates/media-engine/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No playable audio files in {0}")]
    EmptyFileList(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid chapter list: {0}")]
    InvalidChapters(String),

    #[error("Metadata error in {path}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    #[error("Probe error for {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
