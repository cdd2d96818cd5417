//! Debounced card presence
//!
//! [`CardPresence`] is the state machine: `Absent -> Present` on a confirmed
//! read, `Present -> Absent` after `removal_threshold` consecutive empty
//! reads. A different card replacing the present one is removed at once and
//! then placed subject to the placement debounce. [`CardMonitor`] runs it on a
//! polling thread.

use crate::card::CardReader;
use crate::dispatch::dispatch_guarded;
use crate::error::{InputError, InputResult};
use std::time::{Duration, Instant};
use taletiles_core::{AppError, CardEvent, CardId, SharedClock, WorkerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardMonitorConfig {
    pub poll_interval: Duration,
    pub debounce: Duration,
    pub removal_threshold: u32,
}

impl Default for CardMonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            debounce: Duration::from_millis(300),
            removal_threshold: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardPresence {
    debounce: Duration,
    removal_threshold: u32,
    current: Option<CardId>,
    missed_reads: u32,
    last_placement: Option<Instant>,
}

impl CardPresence {
    pub fn new(debounce: Duration, removal_threshold: u32) -> Self {
        Self {
            debounce,
            removal_threshold: removal_threshold.max(1),
            current: None,
            missed_reads: 0,
            last_placement: None,
        }
    }

    pub fn current(&self) -> Option<&CardId> {
        self.current.as_ref()
    }

    pub fn missed_reads(&self) -> u32 {
        self.missed_reads
    }

    /// Feeds one poll result taken at `now`; returns the events it triggers in order.
    pub fn process(&mut self, now: Instant, read: Option<CardId>) -> Vec<CardEvent> {
        let mut events = Vec::new();

        match read {
            Some(card_id) => {
                self.missed_reads = 0;
                if self.current.as_ref() == Some(&card_id) {
                    return events;
                }

                if let Some(previous) = self.current.take() {
                    events.push(CardEvent::Removed(previous));
                }

                let debounced = self
                    .last_placement
                    .is_none_or(|t| now.saturating_duration_since(t) >= self.debounce);
                if debounced {
                    self.last_placement = Some(now);
                    self.current = Some(card_id.clone());
                    events.push(CardEvent::Placed(card_id));
                }
            }
            None => {
                if self.current.is_some() {
                    self.missed_reads += 1;
                    if self.missed_reads >= self.removal_threshold {
                        self.missed_reads = 0;
                        if let Some(previous) = self.current.take() {
                            events.push(CardEvent::Removed(previous));
                        }
                    }
                }
            }
        }

        events
    }
}

/// Polling loop around a [`CardReader`]
pub struct CardMonitor;

impl CardMonitor {
    /// Starts polling `reader` on its own thread, passing each event to `on_event`.
    ///
    /// Reader errors count as empty reads. Handler errors and panics are
    /// logged and do not stop the loop.
    pub fn spawn<F, E>(
        mut reader: Box<dyn CardReader>,
        config: CardMonitorConfig,
        clock: SharedClock,
        mut on_event: F,
    ) -> InputResult<WorkerHandle>
    where
        F: FnMut(CardEvent) -> Result<(), E> + Send + 'static,
        E: std::fmt::Display,
    {
        let name = format!("card-monitor ({})", reader.name());
        WorkerHandle::spawn(name.clone(), move |running| {
            let mut presence = CardPresence::new(config.debounce, config.removal_threshold);
            let slice = config.poll_interval.min(Duration::from_millis(50));

            let mut reader_down = false;

            while running.is_running() {
                let read = match reader.attempt_read() {
                    Ok(read) => {
                        reader_down = false;
                        read
                    }
                    Err(e) => {
                        let err = AppError::from(e);
                        // Warn once per run of non-transient failures
                        if err.is_retryable() || !reader_down {
                            err.log();
                        }
                        reader_down = !err.is_retryable();
                        None
                    }
                };

                for event in presence.process(clock.now(), read) {
                    let label = match &event {
                        CardEvent::Placed(id) => {
                            log::info!("Card placed: {}", id);
                            "card placed"
                        }
                        CardEvent::Removed(id) => {
                            log::info!("Card removed: {}", id);
                            "card removed"
                        }
                    };
                    let _ = dispatch_guarded(label, || on_event(event));
                }

                running.sleep(config.poll_interval, slice);
            }

            reader.close();
        })
        .map_err(|source| InputError::SpawnFailed {
            worker: name,
            source,
        })
    }
}
