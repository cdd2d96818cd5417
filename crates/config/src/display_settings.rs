//! Display refresh timing

use crate::display_config::DisplayType;
use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplaySettings {
    /// Wake-up period of the refresh loop
    pub tick_ms: u64,
    pub lcd_min_interval_ms: u64,
    pub eink_min_interval_ms: u64,
    /// Upper bound on joining each background loop at shutdown
    pub shutdown_timeout_ms: u64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            lcd_min_interval_ms: DisplayType::Lcd1602.min_update_interval().as_millis() as u64,
            eink_min_interval_ms: DisplayType::Eink.min_update_interval().as_millis() as u64,
            shutdown_timeout_ms: 2000,
        }
    }
}

impl DisplaySettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn min_update_interval(&self, display_type: DisplayType) -> Duration {
        match display_type {
            DisplayType::Lcd1602 => Duration::from_millis(self.lcd_min_interval_ms),
            DisplayType::Eink | DisplayType::Mock => Duration::from_millis(self.eink_min_interval_ms),
        }
    }
}

impl ConfigSection for DisplaySettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.tick_ms, 10, 1000, "display.tick_ms"),
            Validator::in_range(self.lcd_min_interval_ms, 0, 60_000, "display.lcd_min_interval_ms"),
            Validator::in_range(self.eink_min_interval_ms, 0, 60_000, "display.eink_min_interval_ms"),
            Validator::in_range(self.shutdown_timeout_ms, 100, 10_000, "display.shutdown_timeout_ms"),
        ])
    }

    fn merge(&mut self, other: Self) {
        *self = other;
    }

    fn section_name(&self) -> &'static str {
        "display"
    }
}
