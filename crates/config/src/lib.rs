//! TaleTiles configuration and persistence
//!
//! Two files live here:
//!
//! - **`config.json`**, the state document owned by [`StateStore`]: card
//!   registrations, saved playback positions, global volume and the display
//!   block. Saved atomically; a corrupt document is backed up and reset.
//! - **`settings.toml`**, runtime tuning loaded by [`SettingsManager`]:
//!   timing windows, paths and log level. Each section implements
//!   [`ConfigSection`] and invalid values fall back with a warning.
//!
//! # Example
//!
//! ```rust,no_run
//! use taletiles_config::StateStore;
//! use taletiles_core::CardId;
//!
//! let mut store = StateStore::open("config.json").expect("Failed to open state");
//! store.update_position(&CardId::new("584190243221"), 2, 145.5);
//! store.save().expect("Failed to save state");
//! ```

mod atomic;
mod error;
mod manager;
mod persistence;
mod validation;

pub mod document;
pub mod store;

pub mod app_settings;
pub mod display_config;
pub mod display_settings;
pub mod input_settings;
pub mod player_settings;
pub mod settings;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::SettingsManager;
pub use validation::{ConfigSection, Validator};

pub use app_settings::{AppSettings, LogLevel};
pub use display_config::{DisplayConfig, DisplayType};
pub use display_settings::DisplaySettings;
pub use document::{AudiobookRecord, AudiobookRegistration, MissingAudiobook, StateDocument};
pub use input_settings::InputSettings;
pub use player_settings::PlayerSettings;
pub use settings::Settings;
pub use store::StateStore;
