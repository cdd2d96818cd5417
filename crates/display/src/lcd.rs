//! 16x2 character LCD layout
//!
//! ```text
//! >The Hobbit
//! C3/19 V75 -5h2m
//! ```

use crate::backend::{status_char, RenderBackend};
use crate::error::{DisplayError, DisplayResult};
use crate::format::{fit, format_time, truncate};
use crate::panel::TextPanel;
use taletiles_config::DisplayConfig;
use taletiles_core::DisplayState;

pub const LCD_COLUMNS: usize = 16;

pub struct CharLcdDisplay {
    panel: Box<dyn TextPanel>,
    config: DisplayConfig,
    initialized: bool,
    last_lines: Option<[String; 2]>,
}

impl CharLcdDisplay {
    pub fn new(panel: Box<dyn TextPanel>, config: DisplayConfig) -> Self {
        Self {
            panel,
            config,
            initialized: false,
            last_lines: None,
        }
    }

    /// Both rows, padded to the panel width
    pub fn lines(state: &DisplayState) -> [String; 2] {
        let line1 = if !state.message.is_empty() {
            state.message.clone()
        } else if !state.title.is_empty() {
            format!(
                "{}{}",
                status_char(state.status),
                truncate(&state.title, LCD_COLUMNS - 1)
            )
        } else {
            "TaleTiles".to_string()
        };

        let line2 = if state.chapter_total > 0 {
            let remaining = format_time(state.time_remaining_seconds);
            let chapter = format!("C{}/{}", state.chapter_current, state.chapter_total);
            [
                format!("{} V{} -{}", chapter, state.volume, remaining),
                format!("{} -{}", chapter, remaining),
                format!("Ch{} -{}", state.chapter_current, remaining),
            ]
            .into_iter()
            .find(|candidate| candidate.chars().count() <= LCD_COLUMNS)
            .unwrap_or_else(|| format!("Ch{}", state.chapter_current))
        } else {
            format!("Vol: {}%", state.volume)
        };

        [fit(&line1, LCD_COLUMNS), fit(&line2, LCD_COLUMNS)]
    }
}

impl RenderBackend for CharLcdDisplay {
    fn name(&self) -> &'static str {
        "lcd1602"
    }

    fn init(&mut self) -> DisplayResult<()> {
        if self.panel.columns() < LCD_COLUMNS || self.panel.rows() < 2 {
            return Err(DisplayError::InitFailed {
                backend: self.name().to_string(),
                reason: format!(
                    "panel is {}x{}, need {}x2",
                    self.panel.columns(),
                    self.panel.rows(),
                    LCD_COLUMNS
                ),
            });
        }
        self.panel.init()?;
        self.panel.clear()?;
        self.initialized = true;

        let [d4, d5, d6, d7] = self.config.data_pins();
        log::info!(
            "LCD1602 initialized (RS={}, E={}, D4-D7={},{},{},{})",
            self.config.lcd_rs,
            self.config.lcd_e,
            d4,
            d5,
            d6,
            d7
        );
        Ok(())
    }

    fn render(&mut self, state: &DisplayState) -> DisplayResult<()> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized {
                backend: self.name().to_string(),
            });
        }

        let lines = Self::lines(state);
        if self.last_lines.as_ref() == Some(&lines) {
            return Ok(());
        }

        for (row, line) in lines.iter().enumerate() {
            self.panel.write_line(row, line)?;
        }
        self.panel.flush()?;
        self.last_lines = Some(lines);
        Ok(())
    }

    fn clear(&mut self) -> DisplayResult<()> {
        self.last_lines = None;
        self.panel.clear()
    }

    fn cleanup(&mut self) -> DisplayResult<()> {
        if self.initialized {
            self.clear()?;
            self.panel.close();
            self.initialized = false;
        }
        Ok(())
    }
}
