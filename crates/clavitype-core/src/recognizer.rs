//! The recognition engine.
//!
//! Consumes note-on/note-off events plus a periodic tick, tracks the
//! held-key set, and resolves clusters into mode switches, interval actions
//! or single keystrokes.
//!
//! Chord sensing is gated on a designated hold key: while it is depressed,
//! single-key dispatch is deferred and the held cluster is only classified
//! once a short quiet window has passed since the newest note-on. Without
//! that window a two-note interval would fire just before the third note of
//! a triad lands. When the hold key is up, every note-on dispatches
//! immediately as ordinary typing.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::action::{KeystrokeSink, Modifier, OutputAction};
use crate::chords::{interval_outcome, triad_quality, IntervalOutcome, TriadQuality};
use crate::keys;
use crate::layout::{binding, InputMode, KeyBinding};
use crate::registry::{KeyRegistry, KeyState};

/// MIDI status byte for note-on (channel 0).
pub const NOTE_ON: u8 = 0x90;
/// MIDI status byte for note-off (channel 0).
pub const NOTE_OFF: u8 = 0x80;

/// Tunable engine parameters.
#[derive(Debug, Clone)]
pub struct RecognizerSettings {
    /// Velocity above which a press counts as emphasized (upper case and
    /// shifted variants).
    pub velocity_threshold: u8,
    /// Per-key additions to the threshold, for keys whose action strikes
    /// louder than the rest of the bed.
    pub velocity_offsets: HashMap<u8, i16>,
    /// Key whose continued depression enables chord/interval sensing.
    pub hold_key: u8,
    /// Minimum quiet time after the newest note-on before a held cluster is
    /// considered settled.
    pub chord_window: Duration,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        let mut velocity_offsets = HashMap::new();
        velocity_offsets.insert(keys::B2, 10);
        Self {
            velocity_threshold: 85,
            velocity_offsets,
            hold_key: keys::DEFAULT_HOLD_KEY,
            chord_window: Duration::from_millis(25),
        }
    }
}

impl RecognizerSettings {
    fn effective_threshold(&self, key: u8) -> i16 {
        self.velocity_threshold as i16 + self.velocity_offsets.get(&key).copied().unwrap_or(0)
    }

    fn exceeds(&self, key: u8, velocity: u8) -> bool {
        velocity as i16 > self.effective_threshold(key)
    }
}

/// The recognition engine.
pub struct Recognizer {
    registry: KeyRegistry,
    mode: InputMode,
    /// When set, the next successfully handled numbers-mode key reverts the
    /// mode to letters.
    numbers_once: bool,
    settings: RecognizerSettings,
    sink: Box<dyn KeystrokeSink>,
}

impl Recognizer {
    pub fn new(settings: RecognizerSettings, sink: Box<dyn KeystrokeSink>) -> Self {
        Self {
            registry: KeyRegistry::new(),
            mode: InputMode::default(),
            numbers_once: false,
            settings,
            sink,
        }
    }

    /// The active input mode.
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Feed one raw MIDI message.
    ///
    /// Only note events mutate state. A note-on with velocity zero is the
    /// wire convention for note-off; anything that is not a note event is
    /// logged and ignored.
    pub fn handle_message(&mut self, status: u8, data1: u8, data2: u8, now: Instant) {
        match status & 0xF0 {
            NOTE_ON if data2 > 0 => self.note_on(data1, data2, now),
            NOTE_ON | NOTE_OFF => self.note_off(data1),
            _ => log::debug!(
                "ignoring MIDI status {:#04x} (data1={} data2={})",
                status,
                data1,
                data2
            ),
        }
    }

    /// Process a note-on.
    pub fn note_on(&mut self, key: u8, velocity: u8, now: Instant) {
        self.registry.press(key, velocity, now);

        if key == self.settings.hold_key {
            // The hold key is consumed as a gate, never dispatched, and must
            // not count toward cluster size.
            self.registry.mark_handled(key);
            return;
        }

        if self.hold_active() {
            self.evaluate_held(now);
        } else {
            self.dispatch_single(key);
        }
    }

    /// Process a note-off. Unknown keys are ignored.
    pub fn note_off(&mut self, key: u8) {
        self.registry.release(key);
    }

    /// Periodic re-evaluation while the hold key is down, so a cluster that
    /// settles purely by elapsed time still fires.
    pub fn tick(&mut self, now: Instant) {
        if self.hold_active() {
            self.evaluate_held(now);
        }
    }

    fn hold_active(&self) -> bool {
        self.registry.is_held(self.settings.hold_key)
    }

    /// Classify the held, unhandled keys once the quiet window has passed.
    ///
    /// Larger groupings are checked first so three notes forming a triad are
    /// never taken for an interval plus a leftover single.
    fn evaluate_held(&mut self, now: Instant) {
        let Some(newest) = self.registry.newest_press() else {
            return;
        };
        if now.duration_since(newest) < self.settings.chord_window {
            // A further note may still complete the cluster.
            return;
        }

        let mut pending = self.registry.unhandled();
        if pending.is_empty() {
            return;
        }

        if pending.len() == 3 && self.try_triad(&pending) {
            return;
        }
        if pending.len() == 2 && self.try_interval(&pending) {
            return;
        }

        // No cluster rule matched: replay as individual keys, oldest first.
        if pending.len() > 1 {
            log::debug!("treating {} clustered keys as singles", pending.len());
        }
        pending.sort_by_key(|state| state.pressed_at);
        for state in pending {
            self.dispatch_single(state.key);
        }
    }

    fn try_triad(&mut self, pending: &[KeyState]) -> bool {
        let cluster = [pending[0].key, pending[1].key, pending[2].key];
        let Some(quality) = triad_quality(cluster) else {
            return false;
        };

        let target = match quality {
            TriadQuality::Major => InputMode::Letters,
            TriadQuality::Minor => InputMode::Commands,
            TriadQuality::Augmented => InputMode::Numbers,
        };
        log::info!("{:?} triad: mode -> {}", quality, target);
        self.mode = target;

        for state in pending {
            self.registry.mark_handled(state.key);
        }
        true
    }

    fn try_interval(&mut self, pending: &[KeyState]) -> bool {
        let (a, b) = (pending[0], pending[1]);
        let distance = a.key.abs_diff(b.key);
        let exceeded = self.settings.exceeds(a.key, a.velocity)
            || self.settings.exceeds(b.key, b.velocity);

        let Some(outcome) = interval_outcome(distance, exceeded) else {
            return false;
        };

        match outcome {
            IntervalOutcome::Emit(actions) => self.emit_all(&actions),
            IntervalOutcome::NumbersOnce => {
                log::info!("major ninth: numbers mode for one key");
                self.numbers_once = true;
                self.mode = InputMode::Numbers;
            }
        }

        self.registry.mark_handled(a.key);
        self.registry.mark_handled(b.key);
        true
    }

    /// Dispatch one held key through the active mode's table.
    fn dispatch_single(&mut self, key: u8) {
        let Some(state) = self.registry.get(key).copied() else {
            return;
        };
        if state.handled {
            return;
        }

        let Some(bound) = binding(self.mode, key) else {
            // Stays unhandled until released; diagnostic only.
            log::debug!(
                "no {} binding for key {} ({})",
                self.mode,
                key,
                keys::note_name(key)
            );
            return;
        };

        let exceeded = self.settings.exceeds(key, state.velocity);
        self.emit_binding(bound, exceeded);
        self.registry.mark_handled(key);

        if self.mode == InputMode::Numbers && self.numbers_once {
            self.numbers_once = false;
            self.mode = InputMode::Letters;
            log::info!("numbers mode done: mode -> {}", self.mode);
        }
    }

    fn emit_binding(&mut self, bound: KeyBinding, exceeded: bool) {
        match bound {
            KeyBinding::Letter(c) => {
                let c = if exceeded {
                    c.to_ascii_uppercase()
                } else {
                    c
                };
                self.sink.type_text(&c.to_string());
            }
            KeyBinding::Shiftable(key) => {
                let mods: &[Modifier] = if exceeded { &[Modifier::Shift] } else { &[] };
                self.sink.tap_key(key, mods);
            }
            KeyBinding::Tap(key, mods) => self.sink.tap_key(key, mods),
            KeyBinding::Split { soft, loud } => {
                let (key, mods) = if exceeded { loud } else { soft };
                self.sink.tap_key(key, mods);
            }
        }
    }

    fn emit_all(&mut self, actions: &[OutputAction]) {
        for action in actions {
            match action {
                OutputAction::Tap { key, modifiers } => self.sink.tap_key(*key, modifiers),
                OutputAction::Type(text) => self.sink.type_text(text),
            }
        }
    }
}
