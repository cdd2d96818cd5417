//! Text-addressable panels driven by the LCD and e-ink layouts
//!
//! Drivers for the physical parts (HD44780 over GPIO, the 2.13" e-paper
//! module) live outside this crate and plug in through [`TextPanel`].

use crate::error::DisplayResult;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait TextPanel: Send {
    fn init(&mut self) -> DisplayResult<()>;

    fn rows(&self) -> usize;

    fn columns(&self) -> usize;

    fn write_line(&mut self, row: usize, text: &str) -> DisplayResult<()>;

    fn clear(&mut self) -> DisplayResult<()>;

    /// Pushes buffered lines to the glass. Panels without a buffer ignore it.
    fn flush(&mut self) -> DisplayResult<()> {
        Ok(())
    }

    fn close(&mut self) {}
}

#[derive(Debug, Default)]
struct MemoryState {
    lines: Vec<String>,
    writes: usize,
    flushes: usize,
}

/// Panel that keeps its rows in memory. Clones share the same rows.
#[derive(Debug, Clone)]
pub struct MemoryPanel {
    rows: usize,
    columns: usize,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryPanel {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            state: Arc::new(Mutex::new(MemoryState {
                lines: vec![String::new(); rows],
                ..MemoryState::default()
            })),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.state().lines.clone()
    }

    /// Number of `write_line` calls so far
    pub fn writes(&self) -> usize {
        self.state().writes
    }

    pub fn flushes(&self) -> usize {
        self.state().flushes
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TextPanel for MemoryPanel {
    fn init(&mut self) -> DisplayResult<()> {
        Ok(())
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn write_line(&mut self, row: usize, text: &str) -> DisplayResult<()> {
        let mut state = self.state();
        if let Some(line) = state.lines.get_mut(row) {
            *line = text.chars().take(self.columns).collect();
        }
        state.writes += 1;
        Ok(())
    }

    fn clear(&mut self) -> DisplayResult<()> {
        let mut state = self.state();
        state.lines.iter_mut().for_each(String::clear);
        Ok(())
    }

    fn flush(&mut self) -> DisplayResult<()> {
        self.state().flushes += 1;
        Ok(())
    }
}
