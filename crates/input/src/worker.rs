//! Thread that turns raw presses into click events

use crate::debouncer::InputDebouncer;
use crate::dispatch::dispatch_guarded;
use crate::error::{InputError, InputResult};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use taletiles_core::{Button, ButtonEvent, SharedClock, WorkerHandle};

/// How often pending double-click windows are swept while idle
const SWEEP_INTERVAL: Duration = Duration::from_millis(50);

/// Where raw presses are pushed, from GPIO glue or the mock keyboard
#[derive(Debug, Clone)]
pub struct ButtonSignal {
    tx: Sender<Button>,
}

impl ButtonSignal {
    /// Returns false once the worker has gone away
    pub fn press(&self, button: Button) -> bool {
        self.tx.send(button).is_ok()
    }
}

pub struct ButtonWorker;

impl ButtonWorker {
    /// Starts the click detector. Presses sent through the returned
    /// [`ButtonSignal`] come out of `on_event` as single or double clicks.
    pub fn spawn<F, E>(
        window: Duration,
        clock: SharedClock,
        mut on_event: F,
    ) -> InputResult<(ButtonSignal, WorkerHandle)>
    where
        F: FnMut(ButtonEvent) -> Result<(), E> + Send + 'static,
        E: std::fmt::Display,
    {
        let (tx, rx): (Sender<Button>, Receiver<Button>) = unbounded();

        let handle = WorkerHandle::spawn("button-worker", move |running| {
            let mut debouncer = InputDebouncer::new(window);

            while running.is_running() {
                match rx.recv_timeout(SWEEP_INTERVAL) {
                    Ok(button) => {
                        let event = debouncer.press(button, clock.now());
                        log::debug!("Button {} -> {:?}", event.button, event.kind);
                        let _ = dispatch_guarded("button", || on_event(event));
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                debouncer.expire(clock.now());
            }

            debouncer.cancel_all();
        })
        .map_err(|source| InputError::SpawnFailed {
            worker: "button-worker".to_string(),
            source,
        })?;

        Ok((ButtonSignal { tx }, handle))
    }
}
