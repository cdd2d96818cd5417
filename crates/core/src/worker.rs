//! Handle for background loops that poll a shared running flag
//!
//! Every periodic loop in the player (card polling, button dispatch, display
//! refresh, autosave) checks `running` once per iteration. Stopping clears the
//! flag and waits for the thread to notice, but never longer than the given
//! timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Shared flag observed by a background loop
#[derive(Debug, Clone)]
pub struct RunningFlag(Arc<AtomicBool>);

impl RunningFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Sleeps for `total` in short slices, returning early once stopped.
    /// Returns whether the flag is still set.
    pub fn sleep(&self, total: Duration, slice: Duration) -> bool {
        let deadline = Instant::now() + total;
        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(slice.min(deadline - now));
        }
        self.is_running()
    }
}

impl Default for RunningFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned handle to a named background thread
#[derive(Debug)]
pub struct WorkerHandle {
    name: String,
    running: RunningFlag,
    handle: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawns `body` on a named thread; `body` receives the running flag it must poll.
    pub fn spawn<F>(name: impl Into<String>, body: F) -> std::io::Result<Self>
    where
        F: FnOnce(RunningFlag) + Send + 'static,
    {
        let name = name.into();
        let running = RunningFlag::new();
        let flag = running.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || body(flag))?;

        log::info!("{} started", name);

        Ok(Self {
            name,
            running,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.running.is_running() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Clears the running flag and joins with a bounded wait.
    ///
    /// Returns `false` if the thread did not finish in time; it is then
    /// detached and left to exit on its own.
    pub fn stop(&mut self, timeout: Duration) -> bool {
        self.running.stop();

        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                log::warn!("{} did not stop within {:?}", self.name, timeout);
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }

        if handle.join().is_err() {
            log::error!("{} panicked", self.name);
        }
        log::info!("{} stopped", self.name);
        true
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop(Duration::from_secs(2));
        }
    }
}
