// crates/input/tests/worker_tests.rs
//! Background workers delivering events through their handlers

use crossbeam_channel::unbounded;
use std::sync::Arc;
use std::time::Duration;
use taletiles_core::{Button, ButtonEvent, CardEvent, CardId, ClickKind, ManualClock};
use taletiles_input::{ButtonWorker, CardMonitor, CardMonitorConfig, MockCardReader};

const WAIT: Duration = Duration::from_secs(2);

fn fast_config() -> CardMonitorConfig {
    CardMonitorConfig {
        poll_interval: Duration::from_millis(5),
        ..CardMonitorConfig::default()
    }
}

#[test]
fn test_card_monitor_reports_place_and_remove() -> Result<(), Box<dyn std::error::Error>> {
    let reader = MockCardReader::new();
    let clock = ManualClock::new();
    let (tx, rx) = unbounded();

    let mut monitor = CardMonitor::spawn(
        Box::new(reader.clone()),
        fast_config(),
        Arc::new(clock.clone()),
        move |event| tx.send(event),
    )?;

    reader.place("card_abc123");
    assert_eq!(rx.recv_timeout(WAIT)?, CardEvent::Placed(CardId::new("card_abc123")));

    reader.remove();
    assert_eq!(rx.recv_timeout(WAIT)?, CardEvent::Removed(CardId::new("card_abc123")));

    assert!(monitor.stop(Duration::from_secs(1)));
    Ok(())
}

#[test]
fn test_card_monitor_survives_read_errors_and_panics() -> Result<(), Box<dyn std::error::Error>> {
    let reader = MockCardReader::new();
    reader.fail_next(5);
    let clock = ManualClock::new();
    let (tx, rx) = unbounded();
    let mut first = true;

    let mut monitor = CardMonitor::spawn(
        Box::new(reader.clone()),
        fast_config(),
        Arc::new(clock.clone()),
        move |event: CardEvent| -> Result<(), String> {
            if first {
                first = false;
                panic!("handler bug");
            }
            tx.send(event).map_err(|e| e.to_string())
        },
    )?;

    reader.place("card1");
    std::thread::sleep(Duration::from_millis(100));
    reader.remove();
    assert_eq!(rx.recv_timeout(WAIT)?, CardEvent::Removed(CardId::new("card1")));
    assert!(monitor.is_running());

    assert!(monitor.stop(Duration::from_secs(1)));
    Ok(())
}

#[test]
fn test_button_worker_single_then_double() -> Result<(), Box<dyn std::error::Error>> {
    let clock = ManualClock::new();
    let (tx, rx) = unbounded();

    let (signal, mut worker) = ButtonWorker::spawn(
        Duration::from_millis(300),
        Arc::new(clock.clone()),
        move |event| tx.send(event),
    )?;

    assert!(signal.press(Button::SkipForward));
    assert!(signal.press(Button::SkipForward));
    assert_eq!(rx.recv_timeout(WAIT)?, ButtonEvent::single(Button::SkipForward));
    assert_eq!(rx.recv_timeout(WAIT)?, ButtonEvent::double(Button::SkipForward));

    signal.press(Button::SkipBack);
    assert_eq!(rx.recv_timeout(WAIT)?.kind, ClickKind::Single);
    clock.advance(Duration::from_millis(400));
    signal.press(Button::SkipBack);
    assert_eq!(rx.recv_timeout(WAIT)?.kind, ClickKind::Single);

    signal.press(Button::VolumeUp);
    signal.press(Button::VolumeUp);
    assert_eq!(rx.recv_timeout(WAIT)?, ButtonEvent::single(Button::VolumeUp));
    assert_eq!(rx.recv_timeout(WAIT)?, ButtonEvent::single(Button::VolumeUp));

    assert!(worker.stop(Duration::from_secs(1)));
    assert!(!signal.press(Button::PlayPause));
    Ok(())
}
