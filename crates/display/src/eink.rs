//! Text layout for the 250x122 e-paper panel
//!
//! Rows: title or message, chapter progress with time left, chapter title,
//! then a footer with status on the left and volume on the right.

use crate::backend::RenderBackend;
use crate::error::{DisplayError, DisplayResult};
use crate::format::{ellipsize, format_time};
use crate::panel::TextPanel;
use taletiles_core::{DisplayState, PlaybackStatus};

pub const EINK_ROWS: usize = 4;
pub const EINK_COLUMNS: usize = 30;
/// The title row uses the large font
const TITLE_COLUMNS: usize = 22;

pub struct EinkDisplay {
    panel: Box<dyn TextPanel>,
    initialized: bool,
}

impl EinkDisplay {
    pub fn new(panel: Box<dyn TextPanel>) -> Self {
        Self {
            panel,
            initialized: false,
        }
    }

    pub fn lines(state: &DisplayState) -> [String; EINK_ROWS] {
        let title = if !state.message.is_empty() {
            ellipsize(&state.message, EINK_COLUMNS)
        } else if !state.title.is_empty() {
            ellipsize(&state.title, TITLE_COLUMNS)
        } else {
            "TaleTiles".to_string()
        };

        let progress = if state.chapter_total > 0 {
            format!(
                "Ch {}/{}  |  {} left",
                state.chapter_current,
                state.chapter_total,
                format_time(state.time_remaining_seconds)
            )
        } else {
            String::new()
        };

        let chapter = if state.message.is_empty() {
            ellipsize(&state.chapter_title, EINK_COLUMNS)
        } else {
            String::new()
        };

        let icon = match state.status {
            PlaybackStatus::Stopped => "■",
            PlaybackStatus::Playing => "▶",
            PlaybackStatus::Paused => "II",
            PlaybackStatus::Loading => "...",
        };
        let status = format!("{} {}", icon, state.status.label());
        let volume = format!("Vol {}%", state.volume);
        let gap = EINK_COLUMNS.saturating_sub(status.chars().count() + volume.chars().count());
        let footer = format!("{}{}{}", status, " ".repeat(gap.max(1)), volume);

        [title, progress, chapter, footer]
    }
}

impl RenderBackend for EinkDisplay {
    fn name(&self) -> &'static str {
        "eink"
    }

    fn init(&mut self) -> DisplayResult<()> {
        if self.panel.rows() < EINK_ROWS {
            return Err(DisplayError::InitFailed {
                backend: self.name().to_string(),
                reason: format!("panel has {} rows, need {}", self.panel.rows(), EINK_ROWS),
            });
        }
        self.panel.init()?;
        self.panel.clear()?;
        self.panel.flush()?;
        self.initialized = true;
        log::info!("E-ink display initialized");
        Ok(())
    }

    fn render(&mut self, state: &DisplayState) -> DisplayResult<()> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized {
                backend: self.name().to_string(),
            });
        }
        for (row, line) in Self::lines(state).iter().enumerate() {
            self.panel.write_line(row, line)?;
        }
        self.panel.flush()
    }

    fn clear(&mut self) -> DisplayResult<()> {
        self.panel.clear()?;
        self.panel.flush()
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
