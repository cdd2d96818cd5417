//! Application-level settings section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ValidationError::with_value(
                "app.log_level",
                "must be one of: error, warn, info, debug, trace",
                other,
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub log_level: LogLevel,

    /// State document path (relative to the settings directory if not absolute)
    pub state_file: PathBuf,

    /// Folder holding one sub-folder per audiobook
    pub audiobooks_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            state_file: PathBuf::from("config.json"),
            audiobooks_dir: PathBuf::from("AudioBooks"),
        }
    }
}

impl ConfigSection for AppSettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::not_empty(&self.state_file.to_string_lossy(), "app.state_file"),
            Validator::not_empty(&self.audiobooks_dir.to_string_lossy(), "app.audiobooks_dir"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.log_level = other.log_level;
        self.state_file = other.state_file;
        self.audiobooks_dir = other.audiobooks_dir;
    }

    fn section_name(&self) -> &'static str {
        "app"
    }
}
