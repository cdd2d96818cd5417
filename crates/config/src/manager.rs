//! Settings manager - locates, loads and saves `settings.toml`

use crate::persistence::SettingsPersistence;
use crate::{ConfigError, ConfigResult, Settings};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const SETTINGS_FILE: &str = "settings.toml";

pub struct SettingsManager {
    persistence: SettingsPersistence,
    config_dir: PathBuf,
}

impl SettingsManager {
    /// Uses the platform config directory:
    /// - Linux: `~/.config/taletiles/`
    /// - macOS: `~/Library/Application Support/taletiles/`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Ok(Self::with_directory(config_dir))
    }

    pub fn with_directory(config_dir: PathBuf) -> Self {
        Self {
            persistence: SettingsPersistence::new(config_dir.join(SETTINGS_FILE)),
            config_dir,
        }
    }

    /// Uses an explicit settings file; its directory anchors relative paths
    pub fn with_file(settings_path: PathBuf) -> Self {
        let config_dir = settings_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            persistence: SettingsPersistence::new(settings_path),
            config_dir,
        }
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "taletiles")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Path {
        self.persistence.path()
    }

    pub fn load(&self) -> ConfigResult<Settings> {
        self.persistence.load()
    }

    /// Never fails; problems are logged and defaults used
    pub fn load_or_default(&self) -> Settings {
        match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {}, using defaults", e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> ConfigResult<()> {
        self.persistence.save(settings)
    }

    /// Writes a default settings file if none exists. Returns whether one was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.settings_path().exists() {
            return Ok(false);
        }
        self.save(&Settings::default())?;
        Ok(true)
    }

    /// Resolves a settings path against the settings directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    /// Loads the file, then applies `TALETILES_<SECTION>_<FIELD>` overrides
    pub fn load_with_env_overrides(&self) -> ConfigResult<Settings> {
        let mut settings = self.load()?;
        apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

        if let Err(errors) = settings.validate() {
            log::warn!(
                "Settings validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(settings)
    }
}

fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = lookup("TALETILES_APP_LOG_LEVEL") {
        match crate::LogLevel::from_str(&level) {
            Ok(level) => settings.app.log_level = level,
            Err(e) => log::warn!("Ignoring TALETILES_APP_LOG_LEVEL: {}", e),
        }
    }

    if let Some(path) = lookup("TALETILES_APP_STATE_FILE") {
        settings.app.state_file = PathBuf::from(path);
    }

    if let Some(path) = lookup("TALETILES_APP_AUDIOBOOKS_DIR") {
        settings.app.audiobooks_dir = PathBuf::from(path);
    }

    if let Some(secs) = lookup("TALETILES_PLAYER_AUTOSAVE_INTERVAL_SECS") {
        if let Ok(v) = secs.parse::<u64>() {
            settings.player.autosave_interval_secs = v;
        }
    }

    if let Some(ms) = lookup("TALETILES_INPUT_DOUBLE_CLICK_WINDOW_MS") {
        if let Ok(v) = ms.parse::<u64>() {
            settings.input.double_click_window_ms = v;
        }
    }
}
