//! Timer that asks the coordinator to save the playing position

use crate::error::{PlayerError, PlayerResult};
use crate::events::PlayerEvent;
use crossbeam_channel::Sender;
use std::time::Duration;
use taletiles_core::WorkerHandle;

pub struct AutosaveLoop;

impl AutosaveLoop {
    /// Sends [`PlayerEvent::AutosaveTick`] every `interval` until stopped or
    /// the coordinator goes away.
    pub fn spawn(interval: Duration, events: Sender<PlayerEvent>) -> PlayerResult<WorkerHandle> {
        let slice = interval.min(Duration::from_millis(100));
        WorkerHandle::spawn("autosave", move |running| {
            while running.sleep(interval, slice) {
                if events.send(PlayerEvent::AutosaveTick).is_err() {
                    break;
                }
            }
        })
        .map_err(|source| PlayerError::Spawn {
            worker: "autosave".to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_ticks_until_stopped() {
        let (tx, rx) = unbounded();
        let mut worker = AutosaveLoop::spawn(Duration::from_millis(10), tx).expect("Should spawn");

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).expect("Should tick"),
            PlayerEvent::AutosaveTick
        );
        assert!(worker.stop(Duration::from_secs(1)));
    }
}
