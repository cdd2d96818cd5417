// FILE: crates/media-engine/src/simulated.rs
//! Clock-driven backend used in mock mode and when no audio output exists
//!
//! Position advances with the injected clock while "playing". Durations come
//! from [`SimulatedControl::set_duration`] or, failing that, from probing the
//! file header. A watcher thread fires the end-of-file callback once per
//! loaded file.

use crate::backend::{AudioBackend, EndOfFileCallback, SeekMode};
use crate::error::{EngineError, EngineResult};
use crate::probe;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use taletiles_core::{SharedClock, WorkerHandle};

#[derive(Debug, Default)]
struct SimState {
    file: Option<PathBuf>,
    duration: Option<f64>,
    base_position: f64,
    started_at: Option<Instant>,
    paused: bool,
    end_reported: bool,
    volume: u8,
}

impl SimState {
    fn position(&self, now: Instant) -> f64 {
        let elapsed = self
            .started_at
            .map(|t| now.saturating_duration_since(t).as_secs_f64())
            .unwrap_or(0.0);
        let position = self.base_position + elapsed;
        match self.duration {
            Some(d) => position.min(d),
            None => position,
        }
    }

    fn is_finished(&self, now: Instant) -> bool {
        match (self.file.as_ref(), self.duration) {
            (Some(_), Some(d)) => self.position(now) >= d,
            _ => false,
        }
    }

    fn freeze(&mut self, now: Instant) {
        self.base_position = self.position(now);
        self.started_at = None;
    }
}

struct Inner {
    clock: SharedClock,
    state: Mutex<SimState>,
    durations: Mutex<HashMap<PathBuf, f64>>,
    callback: Mutex<Option<EndOfFileCallback>>,
    probe_unknown: bool,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Shared handle for inspecting and steering a [`SimulatedBackend`]
#[derive(Clone)]
pub struct SimulatedControl {
    inner: Arc<Inner>,
}

impl SimulatedControl {
    /// Registers a duration so the file is not probed
    pub fn set_duration(&self, path: impl Into<PathBuf>, seconds: f64) {
        self.inner
            .durations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), seconds.max(0.0));
    }

    pub fn current_file(&self) -> Option<PathBuf> {
        self.inner.state().file.clone()
    }

    pub fn position(&self) -> Option<f64> {
        let now = self.inner.clock.now();
        let state = self.inner.state();
        state.file.as_ref().map(|_| state.position(now))
    }

    pub fn volume(&self) -> u8 {
        self.inner.state().volume
    }

    /// Fires the end-of-file callback if the file has played out and it has
    /// not fired yet for this file. Returns whether it fired.
    pub fn check_end_of_file(&self) -> bool {
        let now = self.inner.clock.now();
        {
            let mut state = self.inner.state();
            if state.end_reported || !state.is_finished(now) {
                return false;
            }
            state.end_reported = true;
            state.freeze(now);
        }

        let callback = self
            .inner
            .callback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback();
        }
        true
    }
}

pub struct SimulatedBackend {
    control: SimulatedControl,
    watcher: Option<WorkerHandle>,
}

impl SimulatedBackend {
    pub fn new(clock: SharedClock) -> Self {
        Self::with_probing(clock, true)
    }

    /// `probe_unknown` controls whether files without a registered duration are probed
    pub fn with_probing(clock: SharedClock, probe_unknown: bool) -> Self {
        let inner = Inner {
            clock,
            state: Mutex::new(SimState {
                volume: 100,
                ..SimState::default()
            }),
            durations: Mutex::new(HashMap::new()),
            callback: Mutex::new(None),
            probe_unknown,
        };
        Self {
            control: SimulatedControl {
                inner: Arc::new(inner),
            },
            watcher: None,
        }
    }

    pub fn control(&self) -> SimulatedControl {
        self.control.clone()
    }

    /// Starts a thread that checks for end of file every `interval`
    pub fn start_watcher(&mut self, interval: Duration) -> EngineResult<()> {
        if self.watcher.is_some() {
            return Ok(());
        }
        let control = self.control.clone();
        let handle = WorkerHandle::spawn("simulated-audio", move |running| {
            while running.is_running() {
                control.check_end_of_file();
                std::thread::sleep(interval);
            }
        })?;
        self.watcher = Some(handle);
        Ok(())
    }

    fn lookup_duration(&self, path: &Path) -> Option<f64> {
        let known = self
            .control
            .inner
            .durations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .copied();
        if known.is_some() || !self.control.inner.probe_unknown {
            return known;
        }
        match probe::probe_duration(path) {
            Ok(d) => Some(d),
            Err(e) => {
                log::debug!("Simulated backend has no duration for {}: {}", path.display(), e);
                None
            }
        }
    }

    fn now(&self) -> Instant {
        self.control.inner.clock.now()
    }
}

impl AudioBackend for SimulatedBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn load(&mut self, path: &Path) -> EngineResult<()> {
        let duration = self.lookup_duration(path);
        let mut state = self.control.inner.state();
        let volume = state.volume;
        *state = SimState {
            file: Some(path.to_path_buf()),
            duration,
            volume,
            ..SimState::default()
        };
        log::debug!("Simulated backend loaded {}", path.display());
        Ok(())
    }

    fn play(&mut self) -> EngineResult<()> {
        let now = self.now();
        let mut state = self.control.inner.state();
        if state.file.is_none() {
            return Err(EngineError::Backend("no file loaded".to_string()));
        }
        if state.started_at.is_none() && !state.end_reported {
            state.started_at = Some(now);
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) -> EngineResult<()> {
        let now = self.now();
        let mut state = self.control.inner.state();
        if state.file.is_some() {
            state.freeze(now);
            state.paused = true;
        }
        Ok(())
    }

    fn is_paused(&self) -> bool {
        let state = self.control.inner.state();
        state.file.is_some() && state.paused
    }

    fn seek(&mut self, offset: f64, mode: SeekMode) -> EngineResult<()> {
        let now = self.now();
        let mut state = self.control.inner.state();
        if state.file.is_none() {
            return Ok(());
        }
        let target = match mode {
            SeekMode::Relative => state.position(now) + offset,
            SeekMode::Absolute => offset,
        };
        let upper = state.duration.unwrap_or(f64::INFINITY);
        state.base_position = target.clamp(0.0, upper);
        if state.started_at.is_some() {
            state.started_at = Some(now);
        }
        if state.base_position < upper {
            state.end_reported = false;
        }
        Ok(())
    }

    fn stop(&mut self) -> EngineResult<()> {
        let mut state = self.control.inner.state();
        let volume = state.volume;
        *state = SimState {
            volume,
            ..SimState::default()
        };
        Ok(())
    }

    fn position(&self) -> Option<f64> {
        self.control.position()
    }

    fn duration(&self) -> Option<f64> {
        self.control.inner.state().duration
    }

    fn is_finished(&self) -> bool {
        let now = self.now();
        self.control.inner.state().is_finished(now)
    }

    fn set_volume(&mut self, volume: u8) -> EngineResult<()> {
        self.control.inner.state().volume = volume.min(100);
        Ok(())
    }

    fn set_end_of_file_callback(&mut self, callback: EndOfFileCallback) {
        *self
            .control
            .inner
            .callback
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(callback);
    }

    fn shutdown(&mut self) -> EngineResult<()> {
        self.stop()?;
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop(Duration::from_secs(1));
        }
        Ok(())
    }
}

impl Drop for SimulatedBackend {
    fn drop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop(Duration::from_secs(1));
        }
    }
}
