//! Note number ↔ note name conversion.
//!
//! Names use scientific pitch notation with sharps: middle C (MIDI 60) is
//! `C4`, and MIDI 0 is `C-1`.
//!
//! # Example
//! ```
//! use midispy_core::note::{note_name, note_number};
//!
//! assert_eq!(note_name(60), "C4");
//! assert_eq!(note_number("Bb3"), Some(58));
//! ```

pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Octave assumed when a name has none, e.g. `"A"`.
pub const DEFAULT_OCTAVE: i32 = 4;

const FLAT_TO_SHARP: [(&str, &str); 5] = [
    ("BB", "A#"),
    ("DB", "C#"),
    ("EB", "D#"),
    ("GB", "F#"),
    ("AB", "G#"),
];

/// Returns -1 to 9 for valid MIDI notes.
#[inline]
pub const fn octave(note: u8) -> i32 {
    (note / 12) as i32 - 1
}

pub fn note_name(note: u8) -> String {
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave(note))
}

/// Parses names like `"C4"`, `"f#2"`, `"Bb3"` or `"C-1"`.
///
/// Case-insensitive, flats are accepted. Returns `None` for unparseable
/// names and for notes outside 0..=127.
pub fn note_number(name: &str) -> Option<u8> {
    let normalized = FLAT_TO_SHARP
        .iter()
        .fold(name.trim().to_uppercase(), |acc, (flat, sharp)| {
            acc.replace(flat, sharp)
        });

    let split = if normalized.as_bytes().get(1) == Some(&b'#') {
        2
    } else {
        normalized.chars().next()?.len_utf8()
    };
    let (pitch, octave) = normalized.split_at(split);

    let index = NOTE_NAMES.iter().position(|n| *n == pitch)? as i32;
    let octave: i32 = if octave.is_empty() {
        DEFAULT_OCTAVE
    } else {
        octave.parse().ok()?
    };

    let number = octave.checked_add(1)?.checked_mul(12)?.checked_add(index)?;
    u8::try_from(number).ok().filter(|n| *n <= 127)
}
