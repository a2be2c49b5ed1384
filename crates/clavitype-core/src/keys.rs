//! Piano key identity table.
//!
//! Semantic key names follow scientific pitch notation with `S` standing in
//! for the sharp sign (`FS2` is F#2), mapped to MIDI note numbers. The
//! dispatch tables use the range a small two-octave controller reaches.

pub const C2: u8 = 36;
pub const CS2: u8 = 37;
pub const D2: u8 = 38;
pub const DS2: u8 = 39;
pub const E2: u8 = 40;
pub const F2: u8 = 41;
pub const FS2: u8 = 42;
pub const G2: u8 = 43;
pub const GS2: u8 = 44;
pub const A2: u8 = 45;
pub const AS2: u8 = 46;
pub const B2: u8 = 47;

pub const C3: u8 = 48;
pub const CS3: u8 = 49;
pub const D3: u8 = 50;
pub const DS3: u8 = 51;
pub const E3: u8 = 52;
pub const F3: u8 = 53;
pub const FS3: u8 = 54;
pub const G3: u8 = 55;
pub const GS3: u8 = 56;
pub const A3: u8 = 57;
pub const AS3: u8 = 58;
pub const B3: u8 = 59;

pub const C4: u8 = 60;
pub const CS4: u8 = 61;
pub const D4: u8 = 62;
pub const DS4: u8 = 63;
pub const E4: u8 = 64;
pub const F4: u8 = 65;
pub const FS4: u8 = 66;
pub const G4: u8 = 67;
pub const GS4: u8 = 68;
pub const A4: u8 = 69;
pub const AS4: u8 = 70;
pub const B4: u8 = 71;

/// Default key whose continued depression enables chord/interval sensing:
/// the lowest F under the playing range.
pub const DEFAULT_HOLD_KEY: u8 = F2;

/// Convert a MIDI note number to a note name
pub fn note_name(note: u8) -> String {
    let names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = (note / 12) as i8 - 1;
    let name = names[(note % 12) as usize];
    format!("{}{}", name, octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_name() {
        assert_eq!(note_name(C3), "C3");
        assert_eq!(note_name(C4), "C4");
        assert_eq!(note_name(A4), "A4");
        assert_eq!(note_name(FS2), "F#2");
    }

    #[test]
    fn test_hold_key_is_low_f() {
        assert_eq!(DEFAULT_HOLD_KEY, 41);
        assert_eq!(note_name(DEFAULT_HOLD_KEY), "F2");
    }
}
