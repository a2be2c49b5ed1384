//! Output actions and the keystroke sink boundary.
//!
//! Classification resolves to plain data (`OutputAction`) rather than
//! callbacks, so the dispatch tables stay inspectable and the sink can be
//! swapped out for tests or dry runs.

/// A key the sink can tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    Backspace,
    Delete,
    Home,
    End,
    Left,
    Right,
    Up,
    Down,
    /// A printable character key. The sink resolves the character to a
    /// physical key and, where needed, an implicit shift.
    Char(char),
}

/// Modifier keys held around a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Shift,
    Control,
}

/// A single resolved output action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputAction {
    /// Tap a key with the given modifiers held.
    Tap { key: Key, modifiers: Vec<Modifier> },
    /// Type a literal string.
    Type(String),
}

/// Keystroke output trait.
///
/// Calls must be executed in the order they are made. Failures at the OS
/// boundary are the implementation's to log; the engine never retries.
pub trait KeystrokeSink: Send {
    /// Tap a key with the given modifiers held.
    fn tap_key(&self, key: Key, modifiers: &[Modifier]);

    /// Type a literal string.
    fn type_text(&self, text: &str);
}

/// Sink that only logs (for dry runs or when no backend is available).
pub struct NullSink;

impl KeystrokeSink for NullSink {
    fn tap_key(&self, key: Key, modifiers: &[Modifier]) {
        log::debug!("key tap: {:?} {:?}", key, modifiers);
    }

    fn type_text(&self, text: &str) {
        log::debug!("type: {:?}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink() {
        let sink = NullSink;
        sink.tap_key(Key::Space, &[]);
        sink.tap_key(Key::Char('a'), &[Modifier::Shift, Modifier::Control]);
        sink.type_text("hello");
    }
}
