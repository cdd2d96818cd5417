//! Wires inputs, playback, display and timers together and runs the
//! dispatch loop until shutdown.

use crate::autosave::AutosaveLoop;
use crate::context::PlayerContext;
use crate::coordinator::Coordinator;
use crate::error::PlayerResult;
use crate::events::PlayerEvent;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use media_engine::{AudioBackend, PlaybackEngine, SimulatedBackend};
use std::sync::Arc;
use std::time::Duration;
use taletiles_config::StateStore;
use taletiles_core::{AppError, WorkerHandle};
use taletiles_display::{create_backend, effective_type, DisplayPresenter, TextPanel};
use taletiles_input::{
    dispatch_guarded, ButtonSignal, ButtonWorker, CardMonitor, CardMonitorConfig, CardReader,
    MockCardReader,
};

/// How often the dispatch loop re-checks the running flag while idle
const DISPATCH_POLL: Duration = Duration::from_millis(100);
/// How often the simulated backend checks for end of file
const END_OF_FILE_POLL: Duration = Duration::from_millis(200);

/// Hardware and overrides for [`PlayerRuntime::start`]. Anything left `None`
/// falls back to the simulated or mock variant.
#[derive(Default)]
pub struct RuntimeOptions {
    pub mock: bool,
    pub reader: Option<Box<dyn CardReader>>,
    pub panel: Option<Box<dyn TextPanel>>,
    pub audio: Option<Box<dyn AudioBackend>>,
}

/// Cloneable handles for feeding the running player from outside
#[derive(Clone)]
pub struct RuntimeHandles {
    pub context: PlayerContext,
    pub events: Sender<PlayerEvent>,
    pub buttons: ButtonSignal,
    /// Present when the card reader is the in-memory mock
    pub mock_reader: Option<MockCardReader>,
}

pub struct PlayerRuntime {
    context: PlayerContext,
    events_tx: Sender<PlayerEvent>,
    events_rx: Receiver<PlayerEvent>,
    coordinator: Coordinator,
    card_monitor: Option<WorkerHandle>,
    button_worker: Option<WorkerHandle>,
    autosave: Option<WorkerHandle>,
    buttons: ButtonSignal,
    mock_reader: Option<MockCardReader>,
}

impl PlayerRuntime {
    pub fn start(context: PlayerContext, store: StateStore, options: RuntimeOptions) -> PlayerResult<Self> {
        let settings = context.settings().clone();
        let clock = context.clock();
        let (events_tx, events_rx) = unbounded();

        let backend = create_backend(store.display_config(), options.mock, options.panel);
        let min_interval = settings.display.min_update_interval(effective_type(backend.as_ref()));
        let mut presenter = DisplayPresenter::new(backend, min_interval, context.clock())
            .with_tick(settings.display.tick());
        presenter.start()?;

        let mut audio: Box<dyn AudioBackend> = match options.audio {
            Some(audio) => audio,
            None => {
                if !options.mock {
                    AppError::HardwareUnavailable {
                        device: "audio output".to_string(),
                        reason: "no backend supplied".to_string(),
                    }
                    .log();
                }
                log::info!("Using simulated playback");
                let mut simulated =
                    SimulatedBackend::with_probing(context.clock(), settings.player.probe_durations);
                simulated.start_watcher(END_OF_FILE_POLL)?;
                Box::new(simulated)
            }
        };
        let file_ended = events_tx.clone();
        audio.set_end_of_file_callback(Arc::new(move || {
            let _ = file_ended.send(PlayerEvent::FileEnded);
        }));

        let engine = PlaybackEngine::new(audio)
            .with_restart_threshold(settings.player.restart_threshold_secs);
        let coordinator = Coordinator::new(engine, store, presenter, settings.player.clone());

        let (reader, mock_reader): (Box<dyn CardReader>, Option<MockCardReader>) = match options.reader {
            Some(reader) => (reader, None),
            None => {
                if !options.mock {
                    AppError::HardwareUnavailable {
                        device: "card reader".to_string(),
                        reason: "no reader supplied".to_string(),
                    }
                    .log();
                }
                log::info!("Using mock card reader");
                let mock = MockCardReader::new();
                (Box::new(mock.clone()), Some(mock))
            }
        };

        let monitor_config = CardMonitorConfig {
            poll_interval: settings.input.poll_interval(),
            debounce: settings.input.card_debounce(),
            removal_threshold: settings.input.removal_threshold,
        };
        let card_events = events_tx.clone();
        let card_monitor = CardMonitor::spawn(reader, monitor_config, clock.clone(), move |event| {
            card_events.send(PlayerEvent::Card(event))
        })?;

        let button_events = events_tx.clone();
        let (buttons, button_worker) = ButtonWorker::spawn(
            settings.input.double_click_window(),
            clock,
            move |event| button_events.send(PlayerEvent::Button(event)),
        )?;

        let autosave = AutosaveLoop::spawn(settings.player.autosave_interval(), events_tx.clone())?;

        coordinator.presenter().show_ready();
        log::info!("Player started");

        Ok(Self {
            context,
            events_tx,
            events_rx,
            coordinator,
            card_monitor: Some(card_monitor),
            button_worker: Some(button_worker),
            autosave: Some(autosave),
            buttons,
            mock_reader,
        })
    }

    pub fn handles(&self) -> RuntimeHandles {
        RuntimeHandles {
            context: self.context.clone(),
            events: self.events_tx.clone(),
            buttons: self.buttons.clone(),
            mock_reader: self.mock_reader.clone(),
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Dispatches events until shutdown is requested, then shuts down.
    pub fn run(mut self) -> PlayerResult<()> {
        while self.context.is_running() {
            match self.events_rx.recv_timeout(DISPATCH_POLL) {
                Ok(PlayerEvent::Shutdown) => break,
                Ok(event) => {
                    let label = event.label();
                    let coordinator = &mut self.coordinator;
                    let _ = dispatch_guarded(label, || coordinator.handle(event).map(|_| ()));
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.shutdown()
    }

    /// Stops every component in reverse dependency order
    pub fn shutdown(mut self) -> PlayerResult<()> {
        log::info!("Shutting down...");
        self.context.request_shutdown();
        let timeout = self.context.settings().display.shutdown_timeout();

        for mut worker in [
            self.card_monitor.take(),
            self.button_worker.take(),
            self.autosave.take(),
        ]
        .into_iter()
        .flatten()
        {
            worker.stop(timeout);
        }

        self.coordinator.shutdown(timeout)?;
        log::info!("Shutdown complete");
        Ok(())
    }
}
