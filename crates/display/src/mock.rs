//! Console frame used in mock mode and as the hardware fallback

use crate::backend::RenderBackend;
use crate::error::DisplayResult;
use crate::format::{format_time, truncate};
use std::io::{self, Write};
use taletiles_core::{DisplayState, PlaybackStatus};

const WIDTH: usize = 40;

pub struct MockDisplay {
    out: Box<dyn Write + Send>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// The four text rows of the frame, unpadded
    pub fn lines(state: &DisplayState) -> [String; 4] {
        let line1 = if !state.message.is_empty() {
            truncate(&state.message, WIDTH)
        } else if !state.title.is_empty() {
            truncate(&state.title, WIDTH)
        } else {
            "TaleTiles".to_string()
        };

        let line2 = if state.chapter_total > 0 {
            format!(
                "Ch {}/{}  {} left",
                state.chapter_current,
                state.chapter_total,
                format_time(state.time_remaining_seconds)
            )
        } else {
            String::new()
        };

        let line3 = if state.message.is_empty() {
            truncate(&state.chapter_title, WIDTH)
        } else {
            String::new()
        };

        let icon = match state.status {
            PlaybackStatus::Stopped => "■",
            PlaybackStatus::Playing => "▶",
            PlaybackStatus::Paused => "⏸",
            PlaybackStatus::Loading => "◌",
        };
        let line4 = format!("{} {:<12} Vol {}%", icon, state.status.label(), state.volume);

        [line1, line2, line3, line4]
    }
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for MockDisplay {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn init(&mut self) -> DisplayResult<()> {
        log::info!("Mock display initialized");
        Ok(())
    }

    fn render(&mut self, state: &DisplayState) -> DisplayResult<()> {
        let border = "─".repeat(WIDTH + 2);
        let mut frame = format!("\n┌{}┐\n", border);
        for line in Self::lines(state) {
            frame.push_str(&format!("│ {:<width$} │\n", line, width = WIDTH));
        }
        frame.push_str(&format!("└{}┘\n", border));

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> DisplayResult<()> {
        writeln!(self.out, "\n[Display cleared]")?;
        self.out.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> DisplayResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_replaces_title_and_chapter() {
        let state = DisplayState {
            title: "Dune".to_string(),
            chapter_title: "Book One".to_string(),
            message: "Ready".to_string(),
            ..DisplayState::default()
        };
        let lines = MockDisplay::lines(&state);
        assert_eq!(lines[0], "Ready");
        assert_eq!(lines[2], "");
    }

    #[test]
    fn test_playing_frame() {
        let state = DisplayState {
            title: "Dune".to_string(),
            chapter_current: 3,
            chapter_total: 12,
            chapter_title: "The Spice".to_string(),
            time_remaining_seconds: 3.0 * 3600.0 + 600.0,
            volume: 60,
            status: PlaybackStatus::Playing,
            ..DisplayState::default()
        };
        let lines = MockDisplay::lines(&state);
        assert_eq!(lines[0], "Dune");
        assert_eq!(lines[1], "Ch 3/12  3h10m left");
        assert_eq!(lines[2], "The Spice");
        assert_eq!(lines[3], "▶ Playing      Vol 60%");
    }

    #[test]
    fn test_render_writes_frame() {
        let mut display = MockDisplay::with_writer(Box::new(Vec::new()));
        display.render(&DisplayState::ready()).expect("Should render");
        display.clear().expect("Should clear");
    }
}
