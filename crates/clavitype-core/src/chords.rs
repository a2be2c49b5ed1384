//! Triad and interval classification.
//!
//! Pure functions over key numbers; the engine applies the results to its
//! registry and mode state.

use crate::action::{Key, Modifier, OutputAction};

/// Quality of a recognized three-note chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriadQuality {
    Major,
    Minor,
    Augmented,
}

/// Classify three held keys as a triad.
///
/// The keys are sorted ascending and reduced to the two semitone intervals
/// above the bass note. Root position and both inversions are recognized
/// for major and minor; augmented chords are symmetric so a single interval
/// pair covers them.
pub fn triad_quality(keys: [u8; 3]) -> Option<TriadQuality> {
    let mut sorted = keys;
    sorted.sort_unstable();

    let interval1 = sorted[1] - sorted[0];
    let interval2 = sorted[2] - sorted[0];

    match (interval1, interval2) {
        (4, 7) | (3, 8) | (5, 9) => Some(TriadQuality::Major),
        (3, 7) | (4, 9) | (5, 8) => Some(TriadQuality::Minor),
        (4, 8) => Some(TriadQuality::Augmented),
        _ => None,
    }
}

/// Outcome of classifying a two-key interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalOutcome {
    /// Emit these actions in order.
    Emit(Vec<OutputAction>),
    /// Switch to numbers mode for exactly one subsequent key, emitting
    /// nothing now.
    NumbersOnce,
}

/// Map a two-key interval to its outcome.
///
/// `distance` is the absolute semitone distance between the keys, so the
/// mapping is independent of which hand is lower. `exceeded` is true when
/// either key was struck above its velocity threshold.
///
/// Distance 24 is two whole octaves, where the pinkies naturally rest, and
/// 14 is a major ninth, where both pointer fingers naturally rest.
pub fn interval_outcome(distance: u8, exceeded: bool) -> Option<IntervalOutcome> {
    let tap = |key: Key, mods: &[Modifier]| OutputAction::Tap {
        key,
        modifiers: mods.to_vec(),
    };

    let actions = match distance {
        1 | 2 | 24 => vec![tap(Key::Space, &[])],
        3 | 4 => vec![tap(Key::Enter, &[])],
        5 => vec![OutputAction::Type(", ".to_string())],
        6 => vec![tap(Key::Backspace, &[])],
        7 => vec![OutputAction::Type(". ".to_string())],
        8 => vec![tap(Key::Char('-'), &[])],
        9 => {
            let mods: &[Modifier] = if exceeded { &[Modifier::Shift] } else { &[] };
            vec![tap(Key::Char('\''), mods)]
        }
        10 => vec![
            tap(Key::Char('/'), &[Modifier::Shift]),
            OutputAction::Type(" ".to_string()),
        ],
        11 => vec![
            tap(Key::Char('1'), &[Modifier::Shift]),
            OutputAction::Type(" ".to_string()),
        ],
        12 => vec![tap(Key::Backspace, &[Modifier::Control])],
        14 => return Some(IntervalOutcome::NumbersOnce),
        _ => return None,
    };

    Some(IntervalOutcome::Emit(actions))
}
