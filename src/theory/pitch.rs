//! Pitch classes on the 12-point chromatic ring.
//!
//! Spelling is discarded at parse time: `C#` and `Db` normalize to the same
//! index, so everything downstream is spelling-independent.

use serde::Serialize;
use std::fmt;

/// Number of semitones in an octave.
pub const SEMITONES: u8 = 12;

/// Sharp-preferred spellings, indexed by chromatic position (C = 0).
const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat-preferred spellings, indexed by chromatic position (C = 0).
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// One of the 12 chromatic note identities, spelling-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Build a pitch class from a chromatic index, wrapping modulo 12.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        Self(index % SEMITONES)
    }

    /// Chromatic index, 0 (C) through 11 (B).
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Parse a note spelling: a letter A-G plus an optional `#` or `b`.
    ///
    /// Enharmonic spellings collapse to the same pitch class, including the
    /// rare ones (`Cb`, `E#`, `Fb`, `B#`). Returns `None` for anything else.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let letter = chars.next()?;
        let base: i8 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let shift: i8 = match chars.next() {
            None => 0,
            Some('#') => 1,
            Some('b') => -1,
            Some(_) => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        // rem_euclid keeps the index in 0..12, so the conversion cannot fail
        u8::try_from((base + shift).rem_euclid(12)).ok().map(Self)
    }

    /// Spelled note name, choosing the sharp or flat variant for the five
    /// black-key positions.
    #[must_use]
    pub const fn name(self, prefer_flat: bool) -> &'static str {
        if prefer_flat {
            FLAT_NAMES[self.0 as usize]
        } else {
            SHARP_NAMES[self.0 as usize]
        }
    }

    /// Semitone distance from `other` up to `self`, in 0..12.
    #[must_use]
    pub const fn distance_from(self, other: Self) -> u8 {
        (SEMITONES + self.0 - other.0) % SEMITONES
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(false))
    }
}
