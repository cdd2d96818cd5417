//! Root of the runtime settings file (`settings.toml`)

use crate::app_settings::AppSettings;
use crate::display_settings::DisplaySettings;
use crate::input_settings::InputSettings;
use crate::player_settings::PlayerSettings;
use crate::validation::{ConfigSection, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub app: AppSettings,
    pub input: InputSettings,
    pub player: PlayerSettings,
    pub display: DisplaySettings,
}

impl Settings {
    /// Validates every section and returns all problems found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }
        if let Err(mut e) = self.input.validate() {
            errors.append(&mut e);
        }
        if let Err(mut e) = self.player.validate() {
            errors.append(&mut e);
        }
        if let Err(mut e) = self.display.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn merge(&mut self, other: Settings) {
        self.app.merge(other.app);
        self.input.merge(other.input);
        self.player.merge(other.player);
        self.display.merge(other.display);
    }
}
