//! Mode dispatch tables.
//!
//! Each input mode owns a static mapping from physical key to a
//! [`KeyBinding`]. The bindings are data only; the engine resolves the
//! velocity-dependent variants when it dispatches.
//!
//! The letter layout places the most frequent letters under the strongest
//! fingers of both hands around C3/C4.

use std::fmt;

use crate::action::{Key, Modifier};
use crate::keys::*;

/// Active input mode. Triads switch between these: major selects letters,
/// minor commands, augmented numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Letters,
    Commands,
    Numbers,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Letters => write!(f, "letters"),
            InputMode::Commands => write!(f, "commands"),
            InputMode::Numbers => write!(f, "numbers"),
        }
    }
}

const NONE: &[Modifier] = &[];
const SHIFT: &[Modifier] = &[Modifier::Shift];
const CTRL: &[Modifier] = &[Modifier::Control];
const CTRL_SHIFT: &[Modifier] = &[Modifier::Control, Modifier::Shift];

/// What a single key emits in a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBinding {
    /// Type the letter, uppercase when struck above the threshold.
    Letter(char),
    /// Tap the key, adding shift when struck above the threshold.
    Shiftable(Key),
    /// Tap the key with fixed modifiers.
    Tap(Key, &'static [Modifier]),
    /// Velocity picks between two taps.
    Split {
        soft: (Key, &'static [Modifier]),
        loud: (Key, &'static [Modifier]),
    },
}

/// Look up the binding for a key in the given mode.
pub fn binding(mode: InputMode, key: u8) -> Option<KeyBinding> {
    match mode {
        InputMode::Letters => letters(key),
        InputMode::Commands => commands(key),
        InputMode::Numbers => numbers(key),
    }
}

fn letters(key: u8) -> Option<KeyBinding> {
    use KeyBinding::*;
    Some(match key {
        FS2 => Tap(Key::Space, NONE),
        G2 => Letter('l'),
        GS2 => Letter('p'),
        A2 => Letter('r'),
        AS2 => Letter('m'),
        B2 => Letter('n'),
        C3 => Letter('o'),
        CS3 => Letter('c'),
        D3 => Letter('t'),
        DS3 => Letter('w'),
        E3 => Letter('b'),
        F3 => Letter('k'),
        FS3 => Letter('j'),
        G3 => Letter('q'),
        GS3 => Letter('x'),
        A3 => Letter('z'),
        AS3 => Letter('y'),
        B3 => Letter('g'),
        C4 => Letter('e'),
        CS4 => Letter('d'),
        D4 => Letter('a'),
        DS4 => Letter('u'),
        E4 => Letter('i'),
        F4 => Letter('s'),
        FS4 => Letter('f'),
        G4 => Letter('h'),
        GS4 => Letter('v'),
        _ => return None,
    })
}

fn commands(key: u8) -> Option<KeyBinding> {
    use KeyBinding::*;
    Some(match key {
        G2 => Tap(Key::Down, NONE),
        GS2 => Tap(Key::Up, NONE),
        // Left-hand cluster deletes backwards, right-hand forwards; a loud
        // strike escalates from cursor movement to deletion.
        C3 => Split {
            soft: (Key::Home, NONE),
            loud: (Key::Backspace, CTRL_SHIFT),
        },
        CS3 => Split {
            soft: (Key::Left, CTRL),
            loud: (Key::Backspace, CTRL),
        },
        D3 => Split {
            soft: (Key::Left, NONE),
            loud: (Key::Backspace, NONE),
        },
        C4 => Split {
            soft: (Key::Right, NONE),
            loud: (Key::Delete, NONE),
        },
        CS4 => Split {
            soft: (Key::Right, CTRL),
            loud: (Key::Delete, CTRL),
        },
        D4 => Split {
            soft: (Key::End, NONE),
            loud: (Key::Delete, CTRL_SHIFT),
        },
        E4 => Tap(Key::Char('z'), CTRL),
        F4 => Tap(Key::Char('y'), CTRL),
        _ => return None,
    })
}

fn numbers(key: u8) -> Option<KeyBinding> {
    use KeyBinding::*;
    Some(match key {
        G2 => Shiftable(Key::Char('1')),
        // ;:
        GS2 => Shiftable(Key::Char(';')),
        A2 => Shiftable(Key::Char('2')),
        B2 => Shiftable(Key::Char('3')),
        C3 => Shiftable(Key::Char('4')),
        D3 => Shiftable(Key::Char('5')),
        DS3 => Split {
            soft: (Key::Char('/'), NONE),
            loud: (Key::Char('\\'), NONE),
        },
        C4 => Shiftable(Key::Char('6')),
        D4 => Shiftable(Key::Char('7')),
        // |
        DS4 => Tap(Key::Char('\\'), SHIFT),
        E4 => Shiftable(Key::Char('8')),
        F4 => Shiftable(Key::Char('9')),
        // { }
        FS4 => Split {
            soft: (Key::Char('['), SHIFT),
            loud: (Key::Char(']'), SHIFT),
        },
        G4 => Shiftable(Key::Char('0')),
        GS4 => Split {
            soft: (Key::Char('['), NONE),
            loud: (Key::Char(']'), NONE),
        },
        A4 => Shiftable(Key::Char('-')),
        // < >
        AS4 => Split {
            soft: (Key::Char(','), SHIFT),
            loud: (Key::Char('.'), SHIFT),
        },
        B4 => Shiftable(Key::Char('=')),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_bindings() {
        assert_eq!(binding(InputMode::Letters, FS2), Some(KeyBinding::Tap(Key::Space, NONE)));
        assert_eq!(binding(InputMode::Letters, G2), Some(KeyBinding::Letter('l')));
        assert_eq!(binding(InputMode::Letters, C4), Some(KeyBinding::Letter('e')));
        assert_eq!(binding(InputMode::Letters, GS4), Some(KeyBinding::Letter('v')));
        // The hold key and keys above the range carry no letter
        assert_eq!(binding(InputMode::Letters, F2), None);
        assert_eq!(binding(InputMode::Letters, A4), None);
    }

    #[test]
    fn test_every_letter_appears_once() {
        let mut seen = Vec::new();
        for key in 0..=127 {
            if let Some(KeyBinding::Letter(c)) = binding(InputMode::Letters, key) {
                assert!(!seen.contains(&c), "letter {c} bound twice");
                seen.push(c);
            }
        }
        assert_eq!(seen.len(), 26);
    }

    #[test]
    fn test_command_bindings() {
        assert_eq!(
            binding(InputMode::Commands, G2),
            Some(KeyBinding::Tap(Key::Down, NONE))
        );
        assert_eq!(
            binding(InputMode::Commands, D3),
            Some(KeyBinding::Split {
                soft: (Key::Left, NONE),
                loud: (Key::Backspace, NONE),
            })
        );
        assert_eq!(
            binding(InputMode::Commands, E4),
            Some(KeyBinding::Tap(Key::Char('z'), CTRL))
        );
        assert_eq!(binding(InputMode::Commands, A2), None);
    }

    #[test]
    fn test_number_bindings() {
        assert_eq!(
            binding(InputMode::Numbers, G2),
            Some(KeyBinding::Shiftable(Key::Char('1')))
        );
        assert_eq!(
            binding(InputMode::Numbers, G4),
            Some(KeyBinding::Shiftable(Key::Char('0')))
        );
        assert_eq!(
            binding(InputMode::Numbers, DS4),
            Some(KeyBinding::Tap(Key::Char('\\'), SHIFT))
        );
        assert_eq!(
            binding(InputMode::Numbers, FS4),
            Some(KeyBinding::Split {
                soft: (Key::Char('['), SHIFT),
                loud: (Key::Char(']'), SHIFT),
            })
        );
        assert_eq!(binding(InputMode::Numbers, AS2), None);
    }
}
