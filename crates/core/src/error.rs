//! Error taxonomy and recovery strategies for TaleTiles
//!
//! Every failure the device can run into is classified into one of three tiers:
//! - **Recoverable**: skipped for this tick and retried naturally (a flaky card read)
//! - **Degraded**: a capability is replaced by its fallback (no display panel, no reader)
//! - **Fatal**: the process cannot start (state file location is unwritable)
//!
//! Each error also carries a recovery action. [`AppError::log`] picks the log
//! level from both, and the coordinator shows an error on the display only
//! when the action is [`RecoveryAction::ReportOnDisplay`].

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Treat as "no event this tick" and try again on the next poll
    SkipTick,
    /// Swap the failing hardware capability for its mock/degraded variant
    UseFallback,
    /// Copy the damaged file aside and continue with defaults
    ResetToDefaults,
    /// Show the problem on the display and wait for the next card
    ReportOnDisplay,
    /// Log the fault and continue with the next event
    IsolateEvent,
    /// Stop the process with a clear startup error
    Abort,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkipTick => write!(f, "Skipping this tick"),
            Self::UseFallback => write!(f, "Using fallback"),
            Self::ResetToDefaults => write!(f, "Resetting to defaults"),
            Self::ReportOnDisplay => write!(f, "Reporting on display"),
            Self::IsolateEvent => write!(f, "Isolating event"),
            Self::Abort => write!(f, "Aborting"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be automatically recovered from
    Recoverable,
    /// Feature degraded but the device keeps running
    Degraded,
    /// The process cannot continue
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type shared by the TaleTiles crates
#[derive(Error, Debug)]
pub enum AppError {
    /// A card or button read failed
    #[error("Transient I/O on {device}: {message}")]
    TransientIo { device: String, message: String },

    /// A hardware capability could not be initialised
    #[error("Hardware unavailable: {device} ({reason})")]
    HardwareUnavailable { device: String, reason: String },

    /// The state document could not be parsed
    #[error("Configuration corrupted: {path}")]
    ConfigurationCorrupted { path: PathBuf },

    /// A registered audiobook folder no longer exists
    #[error("Audiobook folder missing: {path}")]
    AudiobookMissing { path: PathBuf },

    /// An audiobook folder contained nothing playable
    #[error("Failed to load audiobook {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    /// An event handler returned an error or panicked
    #[error("Handler fault while processing {event}: {message}")]
    HandlerFault { event: String, message: String },

    /// Unrecoverable startup problem
    #[error("Startup failed: {message}")]
    StartupFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TransientIo { .. } | Self::HandlerFault { .. } => ErrorSeverity::Recoverable,

            Self::HardwareUnavailable { .. }
            | Self::ConfigurationCorrupted { .. }
            | Self::AudiobookMissing { .. }
            | Self::LoadFailed { .. } => ErrorSeverity::Degraded,

            Self::StartupFailed { .. } => ErrorSeverity::Fatal,

            _ => ErrorSeverity::Degraded,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::TransientIo { .. } => RecoveryAction::SkipTick,
            Self::HardwareUnavailable { .. } => RecoveryAction::UseFallback,
            Self::ConfigurationCorrupted { .. } => RecoveryAction::ResetToDefaults,
            Self::AudiobookMissing { .. } | Self::LoadFailed { .. } => {
                RecoveryAction::ReportOnDisplay
            }
            Self::HandlerFault { .. } | Self::InvalidArgument { .. } | Self::IoError { .. } => {
                RecoveryAction::IsolateEvent
            }
            Self::StartupFailed { .. } => RecoveryAction::Abort,
        }
    }

    /// Short message that fits the device display
    pub fn user_message(&self) -> String {
        match self {
            Self::TransientIo { .. } => "Read error".to_string(),
            Self::HardwareUnavailable { device, .. } => format!("No {}", device),
            Self::ConfigurationCorrupted { .. } => "Settings reset".to_string(),
            Self::AudiobookMissing { .. } => "Book not found".to_string(),
            Self::LoadFailed { .. } => "Load failed".to_string(),
            Self::HandlerFault { .. } => "Internal error".to_string(),
            Self::StartupFailed { .. } => "Startup failed".to_string(),
            Self::InvalidArgument { .. } => "Invalid input".to_string(),
            Self::IoError { .. } => "File error".to_string(),
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Returns true if the failing operation is simply retried on the next tick
    pub fn is_retryable(&self) -> bool {
        self.recovery_action() == RecoveryAction::SkipTick
    }

    /// Log level matching the severity and recovery action
    pub fn log_level(&self) -> log::Level {
        if self.is_critical() {
            return log::Level::Error;
        }
        match self.recovery_action() {
            RecoveryAction::SkipTick => log::Level::Debug,
            RecoveryAction::UseFallback | RecoveryAction::ResetToDefaults => log::Level::Warn,
            RecoveryAction::ReportOnDisplay
            | RecoveryAction::IsolateEvent
            | RecoveryAction::Abort => log::Level::Error,
        }
    }

    /// Logs the error together with what happens next
    pub fn log(&self) {
        log::log!(self.log_level(), "{} ({})", self, self.recovery_action());
    }

    /// Helper to create a startup error from any error type
    pub fn startup<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::StartupFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create a transient read error
    pub fn transient(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransientIo {
            device: device.into(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}
