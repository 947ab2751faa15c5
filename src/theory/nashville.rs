//! Nashville Number System conversion.
//!
//! Pure and total: every syntactically valid chord converts to a notation
//! string for every key. The chord root's semitone distance from the key
//! root maps to a scale degree 1-7; non-diatonic roots pick up an
//! accidental prefix, ties breaking toward the flat spelling.

use crate::theory::chord::{Chord, Quality};
use crate::theory::pitch::PitchClass;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;

/// Musical mode of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Major (Ionian) scale.
    Major,
    /// Natural minor (Aeolian) scale.
    Minor,
}

impl Mode {
    /// Diatonic scale steps as semitone offsets from the key root.
    const fn intervals(self) -> [u8; 7] {
        match self {
            Self::Major => [0, 2, 4, 5, 7, 9, 11],
            Self::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// The triad quality a key of this mode predicts on each scale degree.
    /// Indexed by degree - 1.
    const fn diatonic_qualities(self) -> [Quality; 7] {
        const MAJ: Quality = Quality::Major { explicit: false };
        match self {
            Self::Major => [
                MAJ,
                Quality::Minor,
                Quality::Minor,
                MAJ,
                MAJ,
                Quality::Minor,
                Quality::Diminished,
            ],
            Self::Minor => [
                Quality::Minor,
                Quality::Diminished,
                MAJ,
                Quality::Minor,
                Quality::Minor,
                MAJ,
                MAJ,
            ],
        }
    }

    /// Parse `"major"` / `"minor"` (case-insensitive).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "major" => Some(Self::Major),
            "minor" => Some(Self::Minor),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Major => "major",
            Self::Minor => "minor",
        })
    }
}

/// A key: root pitch class plus mode. Immutable for a whole pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Key {
    /// Tonic pitch class.
    pub root: PitchClass,
    /// Major or natural minor.
    pub mode: Mode,
}

impl Key {
    /// Build a key.
    #[must_use]
    pub const fn new(root: PitchClass, mode: Mode) -> Self {
        Self { root, mode }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.mode)
    }
}

/// Accidental prefix on a chromatic scale degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accidental {
    Sharp,
    Flat,
}

/// A scale degree with an optional accidental prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Degree {
    number: u8,
    accidental: Option<Accidental>,
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accidental {
            Some(Accidental::Sharp) => f.write_char('#')?,
            Some(Accidental::Flat) => f.write_char('b')?,
            None => {}
        }
        write!(f, "{}", self.number)
    }
}

/// Map a pitch class to its scale degree relative to a key.
///
/// A diatonic pitch returns a plain degree; a chromatic one returns the
/// nearer neighbor degree with the accidental that bends it (sharp raises
/// the step below, flat lowers the step above), ties breaking toward flat.
fn degree_of(pitch: PitchClass, key: Key) -> Degree {
    let distance = pitch.distance_from(key.root);
    let steps = key.mode.intervals();

    if let Some(position) = steps.iter().position(|&s| s == distance) {
        return Degree {
            number: degree_number(position),
            accidental: None,
        };
    }

    // Chromatic: find the flanking steps. Above the seventh step the upper
    // neighbor wraps to degree 1 at the octave.
    let below = steps.iter().rposition(|&s| s < distance).unwrap_or(0);
    let (upper_step, upper_number) = if below + 1 < steps.len() {
        (steps[below + 1], degree_number(below + 1))
    } else {
        (12, 1)
    };

    let from_below = distance - steps[below];
    let from_above = upper_step - distance;
    if from_below < from_above {
        Degree {
            number: degree_number(below),
            accidental: Some(Accidental::Sharp),
        }
    } else {
        Degree {
            number: upper_number,
            accidental: Some(Accidental::Flat),
        }
    }
}

/// Scale step position (0-based) to degree number (1-based).
fn degree_number(position: usize) -> u8 {
    u8::try_from(position).map_or(7, |p| p + 1)
}

/// Convert a chord to Nashville notation relative to a key.
///
/// Quality and extension markers carry over in source order; a slash bass
/// resolves to its own degree (quality ignored) after a `/`.
#[must_use]
pub fn convert(chord: &Chord, key: Key) -> String {
    let mut out = degree_of(chord.root, key).to_string();

    match chord.quality {
        Quality::Minor => out.push('m'),
        Quality::Diminished => out.push_str("dim"),
        Quality::Augmented => out.push_str("aug"),
        Quality::Suspended(numeral) => {
            out.push_str("sus");
            if let Some(n) = numeral {
                let _ = write!(out, "{n}");
            }
        }
        // Explicit major keeps its marker only with an extension (1maj7),
        // a plain major triad is just the degree.
        Quality::Major { explicit: true } if chord.extension.is_some() => out.push_str("maj"),
        Quality::Major { .. } => {}
    }

    if let Some(ext) = chord.extension {
        let _ = write!(out, "{ext}");
    }
    for alteration in &chord.alterations {
        let _ = write!(out, "{alteration}");
    }
    if let Some(bass) = chord.bass {
        let _ = write!(out, "/{}", degree_of(bass, key));
    }

    out
}

/// Infer the mode of a song from its chords and key root.
///
/// If the first tonic-rooted chord is minor the song is taken as minor.
/// Otherwise each chord votes for the mode whose diatonic triad quality it
/// matches on its degree; ties go to major.
#[must_use]
pub fn infer_mode(chords: &[Chord], key_root: PitchClass) -> Mode {
    if let Some(first) = chords.first() {
        if first.root == key_root && first.quality == Quality::Minor {
            return Mode::Minor;
        }
    }

    let major_expected = Mode::Major.diatonic_qualities();
    let minor_expected = Mode::Minor.diatonic_qualities();
    let probe = Key::new(key_root, Mode::Major);

    let mut major_votes = 0_usize;
    let mut minor_votes = 0_usize;
    for chord in chords {
        let slot = usize::from(degree_of(chord.root, probe).number - 1);
        if quality_matches(chord.quality, major_expected[slot]) {
            major_votes += 1;
        }
        if quality_matches(chord.quality, minor_expected[slot]) {
            minor_votes += 1;
        }
    }

    if minor_votes > major_votes {
        Mode::Minor
    } else {
        Mode::Major
    }
}

/// Compare a chord quality against a predicted diatonic triad quality,
/// treating explicit and implicit major as the same thing.
const fn quality_matches(actual: Quality, expected: Quality) -> bool {
    matches!(
        (actual, expected),
        (Quality::Major { .. }, Quality::Major { .. })
            | (Quality::Minor, Quality::Minor)
            | (Quality::Diminished, Quality::Diminished)
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn key(root: &str, mode: Mode) -> Key {
        Key::new(PitchClass::parse(root).unwrap(), mode)
    }

    fn chord(text: &str) -> Chord {
        Chord::parse(text).unwrap_or_else(|| panic!("'{text}' should parse"))
    }

    #[test]
    fn tonic_major_is_plain_one() {
        for root in ["C", "F#", "Bb", "E"] {
            let k = key(root, Mode::Major);
            assert_eq!(convert(&chord(root), k), "1");
        }
    }

    #[test]
    fn c_major_diatonic_sequence() {
        let k = key("C", Mode::Major);
        let expected = ["1", "2m", "3m", "4", "5", "6m", "57"];
        for (symbol, want) in ["C", "Dm", "Em", "F", "G", "Am", "G7"].iter().zip(expected) {
            assert_eq!(convert(&chord(symbol), k), want, "chord {symbol}");
        }
    }

    #[test]
    fn conversion_is_deterministic() {
        let k = key("E", Mode::Major);
        let c = chord("C#m7");
        assert_eq!(convert(&c, k), convert(&c, k));
    }

    #[test]
    fn enharmonic_roots_convert_identically() {
        for root in ["C", "D", "Eb", "F#", "A"] {
            for mode in [Mode::Major, Mode::Minor] {
                let k = key(root, mode);
                assert_eq!(convert(&chord("C#"), k), convert(&chord("Db"), k));
            }
        }
    }

    #[test]
    fn slash_chord_with_diatonic_bass() {
        // F# is the diatonic seventh step of G major
        let k = key("G", Mode::Major);
        assert_eq!(convert(&chord("D/F#"), k), "5/7");
        // B is the diatonic seventh step of C major
        assert_eq!(convert(&chord("G/B"), key("C", Mode::Major)), "5/7");
    }

    #[test]
    fn slash_chord_with_chromatic_bass_prefers_flat() {
        // C# sits between the 4th and 5th steps of G major; the tie breaks
        // toward the flat spelling of the upper step.
        let k = key("G", Mode::Major);
        assert_eq!(convert(&chord("D/C#"), k), "5/b5");
    }

    #[test]
    fn chromatic_roots_in_major() {
        let k = key("C", Mode::Major);
        assert_eq!(convert(&chord("Eb"), k), "b3");
        assert_eq!(convert(&chord("Db"), k), "b2");
        assert_eq!(convert(&chord("Bb"), k), "b7");
        assert_eq!(convert(&chord("Ab"), k), "b6");
        assert_eq!(convert(&chord("F#"), k), "b5");
    }

    #[test]
    fn chromatic_roots_in_minor() {
        let k = key("A", Mode::Minor);
        // G# sits between the b7 step and the octave: flat-side degree 1
        assert_eq!(convert(&chord("G#"), k), "b1");
        assert_eq!(convert(&chord("C#"), k), "b4");
        assert_eq!(convert(&chord("Bb"), k), "b2");
    }

    #[test]
    fn natural_minor_diatonic_sequence() {
        let k = key("A", Mode::Minor);
        let expected = ["1m", "3", "4m", "5m", "6", "7"];
        for (symbol, want) in ["Am", "C", "Dm", "Em", "F", "G"].iter().zip(expected) {
            assert_eq!(convert(&chord(symbol), k), want, "chord {symbol}");
        }
    }

    #[test]
    fn explicit_major_marker_survives_with_extension() {
        let k = key("C", Mode::Major);
        assert_eq!(convert(&chord("Cmaj7"), k), "1maj7");
        assert_eq!(convert(&chord("C7"), k), "17");
        assert_eq!(convert(&chord("Fmaj9"), k), "4maj9");
    }

    #[test]
    fn markers_carry_over_in_source_order() {
        let k = key("C", Mode::Major);
        assert_eq!(convert(&chord("Dm7b5"), k), "2m7b5");
        assert_eq!(convert(&chord("C7sus4"), k), "17sus4");
        assert_eq!(convert(&chord("Gadd9"), k), "5add9");
        assert_eq!(convert(&chord("Csus2"), k), "1sus2");
        assert_eq!(convert(&chord("Caug"), k), "1aug");
        assert_eq!(convert(&chord("Bdim"), k), "7dim");
    }

    #[test]
    fn infer_mode_minor_tonic_wins() {
        let chords = vec![chord("Am"), chord("F"), chord("C"), chord("G")];
        assert_eq!(infer_mode(&chords, PitchClass::parse("A").unwrap()), Mode::Minor);
    }

    #[test]
    fn infer_mode_counts_diatonic_fits() {
        // i bVI bIII bVII in C minor, tonic chord not first
        let chords = vec![chord("Ab"), chord("Cm"), chord("Fm"), chord("Gm"), chord("Eb")];
        assert_eq!(infer_mode(&chords, PitchClass::parse("C").unwrap()), Mode::Minor);

        let chords = vec![chord("F"), chord("C"), chord("G"), chord("Am"), chord("Dm")];
        assert_eq!(infer_mode(&chords, PitchClass::parse("C").unwrap()), Mode::Major);
    }

    #[test]
    fn infer_mode_defaults_to_major() {
        assert_eq!(infer_mode(&[], PitchClass::parse("C").unwrap()), Mode::Major);
    }
}
