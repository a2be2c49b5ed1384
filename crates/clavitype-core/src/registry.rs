//! Currently-held key bookkeeping.

use std::collections::HashMap;
use std::time::Instant;

/// State of one currently-held physical key.
#[derive(Debug, Clone, Copy)]
pub struct KeyState {
    /// MIDI note number of the key.
    pub key: u8,
    /// Strike velocity (0-127), captured at note-on.
    pub velocity: u8,
    /// When the note-on arrived.
    pub pressed_at: Instant,
    /// Whether this key was already consumed by a classification decision.
    /// A key held down while further keys are struck must not fire twice:
    /// holding A and then pressing B types "ab", not "aab".
    pub handled: bool,
}

/// Map of currently depressed keys.
///
/// The sole source of truth for what counts toward chord and interval
/// detection. At most one entry per key number.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: HashMap<u8, KeyState>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    /// Record a note-on. A repeated note-on for an already-held key
    /// overwrites the entry rather than duplicating it.
    pub fn press(&mut self, key: u8, velocity: u8, now: Instant) {
        self.keys.insert(
            key,
            KeyState {
                key,
                velocity,
                pressed_at: now,
                handled: false,
            },
        );
    }

    /// Record a note-off. Unknown keys are ignored.
    pub fn release(&mut self, key: u8) -> Option<KeyState> {
        self.keys.remove(&key)
    }

    /// Check whether a key is currently held.
    pub fn is_held(&self, key: u8) -> bool {
        self.keys.contains_key(&key)
    }

    pub fn get(&self, key: u8) -> Option<&KeyState> {
        self.keys.get(&key)
    }

    /// Mark a held key as consumed by a classification decision.
    pub fn mark_handled(&mut self, key: u8) {
        if let Some(state) = self.keys.get_mut(&key) {
            state.handled = true;
        }
    }

    /// Number of currently held keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Most recent press time among held keys.
    pub fn newest_press(&self) -> Option<Instant> {
        self.keys.values().map(|k| k.pressed_at).max()
    }

    /// Held keys not yet consumed by a classification decision.
    pub fn unhandled(&self) -> Vec<KeyState> {
        self.keys.values().filter(|k| !k.handled).copied().collect()
    }
}
