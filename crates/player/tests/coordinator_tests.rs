// crates/player/tests/coordinator_tests.rs
//! Card and button handling against a real state file and simulated audio

use media_engine::{
    AudioBackend, EndOfFileCallback, EngineError, EngineResult, PlaybackEngine, SeekMode,
    SimulatedBackend, SimulatedControl,
};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use taletiles_config::{PlayerSettings, StateStore};
use taletiles_core::{Button, ButtonEvent, CardEvent, CardId, ManualClock, PlaybackStatus};
use taletiles_display::{DisplayPresenter, MockDisplay};
use taletiles_player::{Coordinator, PlayerEvent};
use tempfile::TempDir;

const CARD: &str = "card_abc123";

struct Fixture {
    _dir: TempDir,
    state_path: PathBuf,
    folder: PathBuf,
    clock: ManualClock,
    control: SimulatedControl,
    coordinator: Coordinator,
}

fn write_book(folder: &Path, chapters: bool) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(folder.join("metadata"))?;
    fs::write(folder.join("01.mp3"), b"")?;
    fs::write(folder.join("02.mp3"), b"")?;
    let chapter_json = if chapters {
        r#"[{"title": "An Unexpected Party", "spine": 0, "offset": 0},
            {"title": "Roast Mutton", "spine": 0, "offset": 600},
            {"title": "A Short Rest", "spine": 1, "offset": 0}]"#
    } else {
        "[]"
    };
    fs::write(
        folder.join("metadata").join("metadata.json"),
        format!(
            r#"{{"title": "The Hobbit", "spine": [{{"duration": 1200}}, {{"duration": 900}}], "chapters": {}}}"#,
            chapter_json
        ),
    )?;
    Ok(())
}

fn coordinator_for(
    state_path: &Path,
    clock: &ManualClock,
) -> Result<(Coordinator, SimulatedControl), Box<dyn Error>> {
    let store = StateStore::open(state_path)?;
    let backend = SimulatedBackend::with_probing(Arc::new(clock.clone()), false);
    let control = backend.control();
    for registration in store.all() {
        for (name, duration) in [("01.mp3", 1200.0), ("02.mp3", 900.0)] {
            control.set_duration(registration.folder_path.join(name), duration);
        }
    }

    let presenter = DisplayPresenter::new(
        Box::new(MockDisplay::with_writer(Box::new(std::io::sink()))),
        Duration::from_secs(2),
        Arc::new(clock.clone()),
    );
    let coordinator = Coordinator::new(
        PlaybackEngine::new(Box::new(backend)),
        store,
        presenter,
        PlayerSettings::default(),
    );
    Ok((coordinator, control))
}

fn fixture(chapters: bool) -> Result<Fixture, Box<dyn Error>> {
    let dir = TempDir::new()?;
    let folder = dir.path().join("The Hobbit");
    write_book(&folder, chapters)?;

    let state_path = dir.path().join("config.json");
    let mut store = StateStore::open(&state_path)?;
    store.register(CardId::new(CARD), &folder, "The Hobbit")?;
    drop(store);

    let clock = ManualClock::new();
    let (coordinator, control) = coordinator_for(&state_path, &clock)?;
    Ok(Fixture {
        _dir: dir,
        state_path,
        folder,
        clock,
        control,
        coordinator,
    })
}

fn card(event: fn(CardId) -> CardEvent) -> PlayerEvent {
    PlayerEvent::Card(event(CardId::new(CARD)))
}

fn press(button: Button) -> PlayerEvent {
    PlayerEvent::Button(ButtonEvent::single(button))
}

#[test]
fn test_place_play_remove_resume() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;

    f.coordinator.handle(card(CardEvent::Placed))?;
    assert!(f.coordinator.engine().is_playing());
    assert_eq!(f.coordinator.engine().current_file_index(), 0);
    assert_eq!(f.coordinator.engine().position(), 0.0);
    assert!(f.control.current_file().is_some_and(|p| p.ends_with("01.mp3")));

    f.clock.advance_secs(30.0);
    f.coordinator.handle(card(CardEvent::Removed))?;
    assert!(!f.coordinator.engine().is_loaded());
    assert_eq!(f.coordinator.presenter().current().message, "Ready");

    let saved = StateStore::open(&f.state_path)?
        .get(&CardId::new(CARD))
        .ok_or("registration missing")?;
    assert_eq!(saved.current_file_index, 0);
    assert!((saved.position_seconds - 30.0).abs() < 0.5);
    assert!(saved.last_played.is_some());

    f.coordinator.handle(card(CardEvent::Placed))?;
    assert!(f.coordinator.engine().is_playing());
    assert!((f.coordinator.engine().position() - 30.0).abs() <= 5.0);
    Ok(())
}

#[test]
fn test_resume_survives_restart() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;
    f.coordinator.handle(card(CardEvent::Placed))?;
    f.coordinator.handle(press(Button::SkipForward))?;
    f.clock.advance_secs(10.0);
    f.coordinator.handle(card(CardEvent::Removed))?;
    f.coordinator.shutdown(Duration::from_millis(100))?;

    let clock = ManualClock::new();
    let (mut restarted, control) = coordinator_for(&f.state_path, &clock)?;
    restarted.handle(card(CardEvent::Placed))?;
    assert!((restarted.engine().position() - 40.0).abs() < 0.5);
    assert!(control.current_file().is_some_and(|p| p.ends_with("01.mp3")));
    Ok(())
}

#[test]
fn test_unknown_card_shows_message() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;
    f.coordinator
        .handle(PlayerEvent::Card(CardEvent::Placed(CardId::new("04a1b2c3d4e5f6"))))?;

    assert!(!f.coordinator.engine().is_loaded());
    assert_eq!(f.coordinator.active_card(), None);
    assert_eq!(f.coordinator.presenter().current().message, "Unknown card: 04a1b2c3...");
    Ok(())
}

#[test]
fn test_missing_folder_shows_error() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;
    fs::remove_dir_all(&f.folder)?;

    f.coordinator.handle(card(CardEvent::Placed))?;
    assert!(!f.coordinator.engine().is_loaded());
    assert_eq!(f.coordinator.presenter().current().message, "Book not found");
    Ok(())
}

#[test]
fn test_empty_folder_shows_load_failure() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;
    fs::remove_file(f.folder.join("01.mp3"))?;
    fs::remove_file(f.folder.join("02.mp3"))?;

    f.coordinator.handle(card(CardEvent::Placed))?;
    assert!(!f.coordinator.engine().is_loaded());
    assert_eq!(f.coordinator.presenter().current().message, "Load failed");
    Ok(())
}

#[test]
fn test_buttons_are_ignored_without_audiobook() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;
    for button in Button::ALL {
        f.coordinator.handle(press(button))?;
    }
    assert!(!f.coordinator.engine().is_loaded());
    assert_eq!(f.coordinator.store().volume(), 75);
    Ok(())
}

#[test]
fn test_volume_buttons_clamp_and_persist() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;
    f.coordinator.handle(card(CardEvent::Placed))?;

    for _ in 0..10 {
        f.coordinator.handle(press(Button::VolumeUp))?;
    }
    assert_eq!(f.coordinator.engine().volume(), 100);
    assert_eq!(f.control.volume(), 100);

    f.coordinator.handle(press(Button::VolumeDown))?;
    f.coordinator.handle(card(CardEvent::Removed))?;
    assert_eq!(StateStore::open(&f.state_path)?.volume(), 95);
    Ok(())
}

#[test]
fn test_toggle_and_display_status() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(true)?;
    f.coordinator.handle(card(CardEvent::Placed))?;

    let shown = f.coordinator.presenter().current();
    assert_eq!(shown.status, PlaybackStatus::Playing);
    assert_eq!(shown.title, "The Hobbit");
    assert_eq!(shown.chapter_current, 1);
    assert_eq!(shown.chapter_total, 3);
    assert_eq!(shown.time_remaining_seconds, 2100.0);

    f.coordinator.handle(press(Button::PlayPause))?;
    assert!(!f.coordinator.engine().is_playing());
    assert_eq!(f.coordinator.presenter().current().status, PlaybackStatus::Paused);
    Ok(())
}

#[test]
fn test_double_click_skips_chapter_after_seek() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(true)?;
    f.coordinator.handle(card(CardEvent::Placed))?;

    f.coordinator.handle(press(Button::SkipForward))?;
    assert_eq!(f.coordinator.engine().position(), 30.0);

    f.coordinator
        .handle(PlayerEvent::Button(ButtonEvent::double(Button::SkipForward)))?;
    let chapter = f.coordinator.engine().current_chapter().ok_or("no chapter")?;
    assert_eq!(chapter.title, "Roast Mutton");
    assert_eq!(f.coordinator.engine().position(), 600.0);
    Ok(())
}

#[test]
fn test_autosave_only_while_playing() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;
    f.coordinator.handle(card(CardEvent::Placed))?;
    f.clock.advance_secs(45.0);
    f.coordinator.handle(PlayerEvent::AutosaveTick)?;

    let saved = StateStore::open(&f.state_path)?
        .get(&CardId::new(CARD))
        .ok_or("registration missing")?;
    assert!((saved.position_seconds - 45.0).abs() < 0.5);

    f.coordinator.handle(press(Button::PlayPause))?;
    f.clock.advance_secs(45.0);
    f.coordinator.handle(PlayerEvent::AutosaveTick)?;
    f.coordinator.handle(PlayerEvent::AutosaveTick)?;
    let saved = StateStore::open(&f.state_path)?
        .get(&CardId::new(CARD))
        .ok_or("registration missing")?;
    assert!((saved.position_seconds - 45.0).abs() < 0.5);
    Ok(())
}

#[test]
fn test_file_end_advances_then_finishes() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;
    f.coordinator.handle(card(CardEvent::Placed))?;

    f.clock.advance_secs(1200.0);
    f.coordinator.handle(PlayerEvent::FileEnded)?;
    assert_eq!(f.coordinator.engine().current_file_index(), 1);
    assert!(f.coordinator.engine().is_playing());

    f.clock.advance_secs(900.0);
    f.coordinator.handle(PlayerEvent::FileEnded)?;
    assert!(!f.coordinator.engine().is_playing());
    assert_eq!(f.coordinator.presenter().current().status, PlaybackStatus::Paused);
    Ok(())
}

#[test]
fn test_shutdown_event_stops_dispatch() -> Result<(), Box<dyn Error>> {
    let mut f = fixture(false)?;
    assert!(!f.coordinator.handle(PlayerEvent::Shutdown)?);
    assert!(f.coordinator.handle(PlayerEvent::RefreshDisplay)?);
    Ok(())
}

/// Output that cannot decode anything
struct UndecodableBackend;

impl AudioBackend for UndecodableBackend {
    fn name(&self) -> &'static str {
        "undecodable"
    }

    fn load(&mut self, path: &Path) -> EngineResult<()> {
        Err(EngineError::Backend(format!("cannot decode {}", path.display())))
    }

    fn play(&mut self) -> EngineResult<()> {
        Ok(())
    }

    fn pause(&mut self) -> EngineResult<()> {
        Ok(())
    }

    fn is_paused(&self) -> bool {
        false
    }

    fn seek(&mut self, _offset: f64, _mode: SeekMode) -> EngineResult<()> {
        Ok(())
    }

    fn stop(&mut self) -> EngineResult<()> {
        Ok(())
    }

    fn position(&self) -> Option<f64> {
        None
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn is_finished(&self) -> bool {
        false
    }

    fn set_volume(&mut self, _volume: u8) -> EngineResult<()> {
        Ok(())
    }

    fn set_end_of_file_callback(&mut self, _callback: EndOfFileCallback) {}

    fn shutdown(&mut self) -> EngineResult<()> {
        Ok(())
    }
}

#[test]
fn test_backend_failure_leaves_no_session() -> Result<(), Box<dyn Error>> {
    let f = fixture(false)?;
    let clock = ManualClock::new();
    let presenter = DisplayPresenter::new(
        Box::new(MockDisplay::with_writer(Box::new(std::io::sink()))),
        Duration::from_secs(2),
        Arc::new(clock.clone()),
    );
    let mut coordinator = Coordinator::new(
        PlaybackEngine::new(Box::new(UndecodableBackend)),
        StateStore::open(&f.state_path)?,
        presenter,
        PlayerSettings::default(),
    );

    coordinator.handle(card(CardEvent::Placed))?;
    assert!(!coordinator.engine().is_loaded());
    assert_eq!(coordinator.active_card(), None);
    let shown = coordinator.presenter().current();
    assert_eq!(shown.message, "Load failed");
    assert_eq!(shown.status, PlaybackStatus::Stopped);

    coordinator.handle(press(Button::VolumeUp))?;
    coordinator.handle(card(CardEvent::Removed))?;
    assert!(!coordinator.engine().is_loaded());
    assert_eq!(coordinator.presenter().current().message, "Ready");
    assert_eq!(coordinator.store().volume(), 75);
    Ok(())
}
