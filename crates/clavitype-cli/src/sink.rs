//! Keystroke synthesis via rdev.
//!
//! The engine must never wait on the OS input layer, so actions are queued
//! on a channel and a worker thread replays them as simulated key events.
//! Some platforms drop events injected back-to-back; the worker paces them
//! a couple of milliseconds apart.

use clavitype_core::{Key, KeystrokeSink, Modifier, OutputAction};
use crossbeam_channel::{unbounded, Receiver, Sender};
use rdev::{simulate, EventType, SimulateError};
use std::thread;
use std::time::Duration;

/// Delay between injected OS events.
const EVENT_PACING: Duration = Duration::from_millis(2);

/// Keystroke sink backed by OS-level event injection.
pub struct RdevSink {
    action_tx: Sender<OutputAction>,
    _worker: thread::JoinHandle<()>,
}

impl RdevSink {
    /// Start the sink and its worker thread.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        let worker = thread::spawn(move || run_worker(rx));
        Self {
            action_tx: tx,
            _worker: worker,
        }
    }
}

impl Default for RdevSink {
    fn default() -> Self {
        Self::new()
    }
}

impl KeystrokeSink for RdevSink {
    fn tap_key(&self, key: Key, modifiers: &[Modifier]) {
        let _ = self.action_tx.send(OutputAction::Tap {
            key,
            modifiers: modifiers.to_vec(),
        });
    }

    fn type_text(&self, text: &str) {
        let _ = self.action_tx.send(OutputAction::Type(text.to_string()));
    }
}

fn run_worker(rx: Receiver<OutputAction>) {
    while let Ok(action) = rx.recv() {
        if let Err(e) = perform(&action) {
            log::warn!("keystroke injection failed for {:?}: {:?}", action, e);
        }
    }
}

fn perform(action: &OutputAction) -> Result<(), SimulateError> {
    match action {
        OutputAction::Tap { key, modifiers } => match resolve_tap(*key, modifiers) {
            Some(events) => send_all(&events),
            None => {
                log::warn!("no OS key for {:?}", key);
                Ok(())
            }
        },
        OutputAction::Type(text) => {
            for c in text.chars() {
                match resolve_tap(Key::Char(c), &[]) {
                    Some(events) => send_all(&events)?,
                    None => log::warn!("no OS key for {:?}", c),
                }
            }
            Ok(())
        }
    }
}

fn send_all(events: &[EventType]) -> Result<(), SimulateError> {
    for event in events {
        simulate(event)?;
        thread::sleep(EVENT_PACING);
    }
    Ok(())
}

/// Build the press/release sequence for a tap: modifiers go down first and
/// come up last, in reverse order.
fn tap_sequence(key: rdev::Key, modifiers: &[rdev::Key]) -> Vec<EventType> {
    let mut events = Vec::with_capacity(modifiers.len() * 2 + 2);
    for m in modifiers {
        events.push(EventType::KeyPress(*m));
    }
    events.push(EventType::KeyPress(key));
    events.push(EventType::KeyRelease(key));
    for m in modifiers.iter().rev() {
        events.push(EventType::KeyRelease(*m));
    }
    events
}

/// Resolve an engine-level tap into OS events, folding any implicit shift a
/// character needs into the modifier set. Returns None for characters with
/// no key on a US layout.
fn resolve_tap(key: Key, modifiers: &[Modifier]) -> Option<Vec<EventType>> {
    let mut mods: Vec<rdev::Key> = Vec::new();
    if modifiers.contains(&Modifier::Control) {
        mods.push(rdev::Key::ControlLeft);
    }
    let mut shift = modifiers.contains(&Modifier::Shift);

    let raw = match key {
        Key::Space => rdev::Key::Space,
        Key::Enter => rdev::Key::Return,
        Key::Backspace => rdev::Key::Backspace,
        Key::Delete => rdev::Key::Delete,
        Key::Home => rdev::Key::Home,
        Key::End => rdev::Key::End,
        Key::Left => rdev::Key::LeftArrow,
        Key::Right => rdev::Key::RightArrow,
        Key::Up => rdev::Key::UpArrow,
        Key::Down => rdev::Key::DownArrow,
        Key::Char(c) => {
            let (raw, shifted) = key_for_char(c)?;
            shift = shift || shifted;
            raw
        }
    };

    if shift {
        mods.push(rdev::Key::ShiftLeft);
    }
    Some(tap_sequence(raw, &mods))
}

/// Map a character to its physical key and shift state on a US layout.
fn key_for_char(c: char) -> Option<(rdev::Key, bool)> {
    use rdev::Key::*;

    if c.is_ascii_uppercase() {
        let (key, _) = key_for_char(c.to_ascii_lowercase())?;
        return Some((key, true));
    }

    let entry = match c {
        'a' => (KeyA, false),
        'b' => (KeyB, false),
        'c' => (KeyC, false),
        'd' => (KeyD, false),
        'e' => (KeyE, false),
        'f' => (KeyF, false),
        'g' => (KeyG, false),
        'h' => (KeyH, false),
        'i' => (KeyI, false),
        'j' => (KeyJ, false),
        'k' => (KeyK, false),
        'l' => (KeyL, false),
        'm' => (KeyM, false),
        'n' => (KeyN, false),
        'o' => (KeyO, false),
        'p' => (KeyP, false),
        'q' => (KeyQ, false),
        'r' => (KeyR, false),
        's' => (KeyS, false),
        't' => (KeyT, false),
        'u' => (KeyU, false),
        'v' => (KeyV, false),
        'w' => (KeyW, false),
        'x' => (KeyX, false),
        'y' => (KeyY, false),
        'z' => (KeyZ, false),

        '0' => (Num0, false),
        '1' => (Num1, false),
        '2' => (Num2, false),
        '3' => (Num3, false),
        '4' => (Num4, false),
        '5' => (Num5, false),
        '6' => (Num6, false),
        '7' => (Num7, false),
        '8' => (Num8, false),
        '9' => (Num9, false),

        ' ' => (Space, false),
        '\n' => (Return, false),
        '\t' => (Tab, false),

        '-' => (Minus, false),
        '_' => (Minus, true),
        '=' => (Equal, false),
        '+' => (Equal, true),
        '[' => (LeftBracket, false),
        '{' => (LeftBracket, true),
        ']' => (RightBracket, false),
        '}' => (RightBracket, true),
        '\\' => (BackSlash, false),
        '|' => (BackSlash, true),
        ';' => (SemiColon, false),
        ':' => (SemiColon, true),
        '\'' => (Quote, false),
        '"' => (Quote, true),
        ',' => (Comma, false),
        '<' => (Comma, true),
        '.' => (Dot, false),
        '>' => (Dot, true),
        '/' => (Slash, false),
        '?' => (Slash, true),
        '`' => (BackQuote, false),
        '~' => (BackQuote, true),

        '!' => (Num1, true),
        '@' => (Num2, true),
        '#' => (Num3, true),
        '$' => (Num4, true),
        '%' => (Num5, true),
        '^' => (Num6, true),
        '&' => (Num7, true),
        '*' => (Num8, true),
        '(' => (Num9, true),
        ')' => (Num0, true),

        _ => return None,
    };

    Some(entry)
}

/// Check whether keystroke injection is likely to work on this system.
pub fn is_available() -> bool {
    // On Linux, rdev requires X11 or Wayland
    #[cfg(target_os = "linux")]
    {
        std::env::var("DISPLAY").is_ok() || std::env::var("WAYLAND_DISPLAY").is_ok()
    }

    #[cfg(not(target_os = "linux"))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_for_char() {
        assert_eq!(key_for_char('a'), Some((rdev::Key::KeyA, false)));
        assert_eq!(key_for_char('A'), Some((rdev::Key::KeyA, true)));
        assert_eq!(key_for_char('1'), Some((rdev::Key::Num1, false)));
        assert_eq!(key_for_char('!'), Some((rdev::Key::Num1, true)));
        assert_eq!(key_for_char('|'), Some((rdev::Key::BackSlash, true)));
        assert_eq!(key_for_char('€'), None);
    }

    #[test]
    fn test_tap_sequence_nests_modifiers() {
        use rdev::Key::*;
        let events = tap_sequence(Backspace, &[ControlLeft, ShiftLeft]);
        assert_eq!(
            events,
            vec![
                EventType::KeyPress(ControlLeft),
                EventType::KeyPress(ShiftLeft),
                EventType::KeyPress(Backspace),
                EventType::KeyRelease(Backspace),
                EventType::KeyRelease(ShiftLeft),
                EventType::KeyRelease(ControlLeft),
            ]
        );
    }

    #[test]
    fn test_resolve_tap_folds_implicit_shift() {
        use rdev::Key::*;
        // '{' is shift+[ on a US layout
        let events = resolve_tap(Key::Char('{'), &[]).unwrap();
        assert_eq!(
            events,
            vec![
                EventType::KeyPress(ShiftLeft),
                EventType::KeyPress(LeftBracket),
                EventType::KeyRelease(LeftBracket),
                EventType::KeyRelease(ShiftLeft),
            ]
        );

        // Explicit shift on an already-shifted character stays a single shift
        let events = resolve_tap(Key::Char('['), &[Modifier::Shift]).unwrap();
        assert_eq!(
            events,
            vec![
                EventType::KeyPress(ShiftLeft),
                EventType::KeyPress(LeftBracket),
                EventType::KeyRelease(LeftBracket),
                EventType::KeyRelease(ShiftLeft),
            ]
        );
    }

    #[test]
    fn test_resolve_tap_named_keys() {
        use rdev::Key::*;
        let events = resolve_tap(Key::Enter, &[]).unwrap();
        assert_eq!(
            events,
            vec![EventType::KeyPress(Return), EventType::KeyRelease(Return)]
        );

        let events = resolve_tap(Key::Backspace, &[Modifier::Control]).unwrap();
        assert_eq!(
            events,
            vec![
                EventType::KeyPress(ControlLeft),
                EventType::KeyPress(Backspace),
                EventType::KeyRelease(Backspace),
                EventType::KeyRelease(ControlLeft),
            ]
        );
    }

    #[test]
    fn test_unmapped_character_returns_none() {
        assert!(resolve_tap(Key::Char('é'), &[]).is_none());
    }
}
