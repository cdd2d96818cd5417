//! Display block of the state document

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which display the device is fitted with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    /// Waveshare 2.13" e-ink panel
    #[default]
    Eink,
    /// HD44780-compatible 16x2 character LCD
    Lcd1602,
    /// Console output
    Mock,
}

impl DisplayType {
    /// Minimum spacing between throttled renders on this panel
    pub fn min_update_interval(&self) -> Duration {
        match self {
            Self::Lcd1602 => Duration::from_millis(500),
            Self::Eink | Self::Mock => Duration::from_millis(2000),
        }
    }
}

impl std::fmt::Display for DisplayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eink => write!(f, "eink"),
            Self::Lcd1602 => write!(f, "lcd1602"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// Display selection plus LCD wiring (BCM numbering, 4-bit mode)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    #[serde(rename = "type")]
    pub display_type: DisplayType,
    pub lcd_rs: u8,
    pub lcd_e: u8,
    pub lcd_d4: u8,
    pub lcd_d5: u8,
    pub lcd_d6: u8,
    pub lcd_d7: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            display_type: DisplayType::Eink,
            lcd_rs: 16,
            lcd_e: 18,
            lcd_d4: 20,
            lcd_d5: 21,
            lcd_d6: 22,
            lcd_d7: 23,
        }
    }
}

impl DisplayConfig {
    pub fn data_pins(&self) -> [u8; 4] {
        [self.lcd_d4, self.lcd_d5, self.lcd_d6, self.lcd_d7]
    }
}

const MAX_BCM_PIN: u8 = 27;

impl ConfigSection for DisplayConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let pins = [
            ("lcd_rs", self.lcd_rs),
            ("lcd_e", self.lcd_e),
            ("lcd_d4", self.lcd_d4),
            ("lcd_d5", self.lcd_d5),
            ("lcd_d6", self.lcd_d6),
            ("lcd_d7", self.lcd_d7),
        ];

        let mut results: Vec<_> = pins
            .iter()
            .map(|(name, pin)| {
                Validator::in_range(*pin, 0, MAX_BCM_PIN, &format!("display.{}", name))
            })
            .collect();
        results.push(Validator::distinct(&pins, "display"));

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        *self = other;
    }

    fn section_name(&self) -> &'static str {
        "display"
    }
}
