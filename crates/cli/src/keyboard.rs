// FILE: crates/cli/src/keyboard.rs
//! Mock-mode keyboard driver standing in for the card reader and buttons

use console::{style, Key, Term};
use std::thread;
use taletiles_core::Button;
use taletiles_player::{PlayerEvent, RuntimeHandles};

/// Number of mock cards reachable from the digit keys
pub const MOCK_CARDS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    ToggleCard(String),
    RemoveCard,
    Press(Button),
    Refresh,
    Help,
    Quit,
}

impl KeyAction {
    pub fn for_key(key: &Key) -> Option<Self> {
        match key {
            Key::Char(c @ '1'..='9') => {
                let n = c.to_digit(10)?;
                (n <= MOCK_CARDS).then(|| KeyAction::ToggleCard(format!("card{}", n)))
            }
            Key::Char('r') => Some(KeyAction::RemoveCard),
            Key::Char('i') => Some(KeyAction::Refresh),
            Key::Char('h') | Key::Char('?') => Some(KeyAction::Help),
            Key::Char('q') | Key::Escape => Some(KeyAction::Quit),
            Key::Char(c) => Button::from_key(*c).map(KeyAction::Press),
            Key::ArrowLeft => Some(KeyAction::Press(Button::SkipBack)),
            Key::ArrowRight => Some(KeyAction::Press(Button::SkipForward)),
            _ => None,
        }
    }
}

pub fn print_help() {
    println!("\n{}", style("Mock controls").bold().cyan());
    println!("  1-{}   place / remove card1..card{}", MOCK_CARDS, MOCK_CARDS);
    println!("  r     remove the current card");
    println!("  space play / pause");
    println!("  + -   volume up / down");
    println!("  , .   skip back / forward (double tap for chapters)");
    println!("  i     refresh display");
    println!("  h     this help");
    println!("  q     quit\n");
}

/// Reads keys on a detached thread until `q` or shutdown
pub fn spawn(handles: RuntimeHandles) -> std::io::Result<()> {
    thread::Builder::new()
        .name("mock-keyboard".to_string())
        .spawn(move || run(handles))
        .map(|_| ())
}

fn run(handles: RuntimeHandles) {
    let term = Term::stdout();
    print_help();

    while handles.context.is_running() {
        let key = match term.read_key() {
            Ok(key) => key,
            Err(e) => {
                log::warn!("Keyboard input unavailable: {}", e);
                return;
            }
        };
        let Some(action) = KeyAction::for_key(&key) else {
            continue;
        };
        if !apply(&handles, action) {
            return;
        }
    }
}

/// Returns `false` once the player should stop
fn apply(handles: &RuntimeHandles, action: KeyAction) -> bool {
    match action {
        KeyAction::ToggleCard(card) => match handles.mock_reader.as_ref() {
            Some(reader) => {
                let placed = reader.toggle(card.as_str());
                println!("{} {}", if placed { "Placed" } else { "Removed" }, card);
            }
            None => println!("Card keys need the mock reader"),
        },
        KeyAction::RemoveCard => {
            if let Some(reader) = handles.mock_reader.as_ref() {
                reader.remove();
                println!("Removed card");
            }
        }
        KeyAction::Press(button) => {
            log::debug!("Key press: {}", button);
            handles.buttons.press(button);
        }
        KeyAction::Refresh => {
            let _ = handles.events.send(PlayerEvent::RefreshDisplay);
        }
        KeyAction::Help => print_help(),
        KeyAction::Quit => {
            println!("Quitting...");
            handles.context.request_shutdown();
            let _ = handles.events.send(PlayerEvent::Shutdown);
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_keys_toggle_cards() {
        assert_eq!(
            KeyAction::for_key(&Key::Char('1')),
            Some(KeyAction::ToggleCard("card1".to_string()))
        );
        assert_eq!(
            KeyAction::for_key(&Key::Char('5')),
            Some(KeyAction::ToggleCard("card5".to_string()))
        );
        assert_eq!(KeyAction::for_key(&Key::Char('6')), None);
    }

    #[test]
    fn test_button_keys() {
        assert_eq!(
            KeyAction::for_key(&Key::Char(' ')),
            Some(KeyAction::Press(Button::PlayPause))
        );
        assert_eq!(
            KeyAction::for_key(&Key::Char('=')),
            Some(KeyAction::Press(Button::VolumeUp))
        );
        assert_eq!(
            KeyAction::for_key(&Key::Char('-')),
            Some(KeyAction::Press(Button::VolumeDown))
        );
        assert_eq!(
            KeyAction::for_key(&Key::Char('<')),
            Some(KeyAction::Press(Button::SkipBack))
        );
        assert_eq!(
            KeyAction::for_key(&Key::Char('.')),
            Some(KeyAction::Press(Button::SkipForward))
        );
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(KeyAction::for_key(&Key::Char('r')), Some(KeyAction::RemoveCard));
        assert_eq!(KeyAction::for_key(&Key::Char('i')), Some(KeyAction::Refresh));
        assert_eq!(KeyAction::for_key(&Key::Char('h')), Some(KeyAction::Help));
        assert_eq!(KeyAction::for_key(&Key::Char('q')), Some(KeyAction::Quit));
        assert_eq!(KeyAction::for_key(&Key::Char('x')), None);
    }
}
