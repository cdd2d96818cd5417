//! TOML persistence for runtime settings
//!
//! Mirrors the state store's write path: validate, back up the previous
//! file, then write through a temporary sibling and rename.

use crate::atomic;
use crate::error::join_errors;
use crate::{ConfigError, ConfigResult, Settings};
use std::fs;
use std::path::{Path, PathBuf};

pub struct SettingsPersistence {
    settings_path: PathBuf,
}

impl SettingsPersistence {
    pub fn new(settings_path: PathBuf) -> Self {
        Self { settings_path }
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    /// Loads settings; a missing file yields defaults.
    ///
    /// Validation problems are logged but not fatal so a hand-edited file
    /// with one bad value still starts the device.
    pub fn load(&self) -> ConfigResult<Settings> {
        if !self.settings_path.exists() {
            log::info!(
                "Settings file not found at {}, using defaults",
                self.settings_path.display()
            );
            return Ok(Settings::default());
        }

        let contents =
            fs::read_to_string(&self.settings_path).map_err(|e| ConfigError::ReadError {
                path: self.settings_path.clone(),
                source: e,
            })?;

        let settings: Settings =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: self.settings_path.clone(),
                source: e,
            })?;

        if let Err(errors) = settings.validate() {
            log::warn!("Settings validation warnings: {}", join_errors(&errors));
        }

        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> ConfigResult<()> {
        if let Err(errors) = settings.validate() {
            return Err(ConfigError::ValidationError(join_errors(&errors)));
        }

        if self.settings_path.exists() {
            let backup = atomic::backup_file(&self.settings_path)?;
            log::debug!("Backed up settings to {}", backup.display());
        }

        let toml_string = toml::to_string_pretty(settings)?;
        atomic::write_atomic(&self.settings_path, &toml_string)?;

        log::info!("Settings saved to {}", self.settings_path.display());
        Ok(())
    }
}
