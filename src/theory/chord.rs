//! Chord structure and the chord symbol grammar.
//!
//! The grammar is `<root>[accidental][quality][extension][alterations][/bass]`
//! anchored to the whole token, so a token either is a chord symbol in its
//! entirety or it is not one at all.

// Allow unwrap for compile-time constant regex patterns in LazyLock blocks
#![allow(clippy::unwrap_used)]

use crate::theory::pitch::PitchClass;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::fmt::Write;
use std::sync::LazyLock;

/// Anchored chord symbol grammar.
///
/// Quality alternatives are ordered longest-first so `maj` is never read as
/// `m` + stray text; `sus[24]?` covers both the bare and numbered spellings
/// without lookahead.
static CHORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<root>[A-G][b#]?)",
        r"(?P<quality>[Mm]aj|[Mm]in|dim|aug|sus[24]?|m|M)?",
        r"(?P<ext>\d{1,2})?",
        r"(?P<alt>(?:b\d{1,2}|#\d{1,2}|add\d{1,2}|sus[24])*)",
        r"(?:/(?P<bass>[A-G][b#]?))?$",
    ))
    .unwrap()
});

/// Splits an alteration run (`7b5`-style tails) into individual markers.
static ALTERATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"b\d{1,2}|#\d{1,2}|add\d{1,2}|sus[24]").unwrap());

/// Chord quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quality {
    /// Major triad. `explicit` records whether the source spelled it out
    /// (`maj`, `M`); Nashville output keeps the marker only when an
    /// extension follows (`Cmaj7` vs plain `C`).
    Major {
        /// True when the source carried a `maj`/`M` marker.
        explicit: bool,
    },
    /// Minor triad (`m`, `min`).
    Minor,
    /// Diminished triad (`dim`).
    Diminished,
    /// Augmented triad (`aug`).
    Augmented,
    /// Suspended chord, with its numeral when the source had one
    /// (`sus`, `sus2`, `sus4`).
    Suspended(Option<u8>),
}

impl Default for Quality {
    fn default() -> Self {
        Self::Major { explicit: false }
    }
}

/// One added-tone or altered-tone marker, e.g. `add9`, `b5`, `#11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Alteration {
    /// `add<n>` marker.
    Add(u8),
    /// Flattened tone, `b<n>`.
    Flat(u8),
    /// Sharpened tone, `#<n>`.
    Sharp(u8),
    /// Suspension written after an extension, e.g. the `sus4` in `C7sus4`.
    Sus(u8),
}

impl fmt::Display for Alteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(n) => write!(f, "add{n}"),
            Self::Flat(n) => write!(f, "b{n}"),
            Self::Sharp(n) => write!(f, "#{n}"),
            Self::Sus(n) => write!(f, "sus{n}"),
        }
    }
}

/// A parsed chord symbol.
///
/// The root is always present; an absent quality marker means a plain major
/// triad. Spelling is normalized away: the root and bass are pitch classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chord {
    /// Root pitch class.
    pub root: PitchClass,
    /// Chord quality.
    pub quality: Quality,
    /// Numeric extension (7, 9, 11, 13) if present.
    pub extension: Option<u8>,
    /// Added/altered tone markers, in source order.
    pub alterations: Vec<Alteration>,
    /// Bass pitch class for slash chords.
    pub bass: Option<PitchClass>,
}

impl Chord {
    /// Parse a chord symbol. The whole input must match the grammar;
    /// returns `None` otherwise.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let caps = CHORD_RE.captures(text)?;

        let root = PitchClass::parse(caps.name("root")?.as_str())?;

        let quality = match caps.name("quality").map(|m| m.as_str()) {
            None => Quality::Major { explicit: false },
            Some("maj" | "Maj" | "M") => Quality::Major { explicit: true },
            Some("min" | "Min" | "m") => Quality::Minor,
            Some("dim") => Quality::Diminished,
            Some("aug") => Quality::Augmented,
            Some("sus") => Quality::Suspended(None),
            Some("sus2") => Quality::Suspended(Some(2)),
            Some("sus4") => Quality::Suspended(Some(4)),
            Some(_) => return None,
        };

        let extension = match caps.name("ext") {
            None => None,
            Some(m) => Some(m.as_str().parse().ok()?),
        };

        let mut alterations = Vec::new();
        if let Some(alt) = caps.name("alt") {
            for marker in ALTERATION_RE.find_iter(alt.as_str()) {
                alterations.push(parse_alteration(marker.as_str())?);
            }
        }

        let bass = match caps.name("bass") {
            None => None,
            Some(m) => Some(PitchClass::parse(m.as_str())?),
        };

        Some(Self { root, quality, extension, alterations, bass })
    }
}

/// Parse a single alteration marker matched by [`ALTERATION_RE`].
fn parse_alteration(marker: &str) -> Option<Alteration> {
    if let Some(digits) = marker.strip_prefix("add") {
        return Some(Alteration::Add(digits.parse().ok()?));
    }
    if let Some(digits) = marker.strip_prefix("sus") {
        return Some(Alteration::Sus(digits.parse().ok()?));
    }
    if let Some(digits) = marker.strip_prefix('b') {
        return Some(Alteration::Flat(digits.parse().ok()?));
    }
    if let Some(digits) = marker.strip_prefix('#') {
        return Some(Alteration::Sharp(digits.parse().ok()?));
    }
    None
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root.name(false))?;
        match self.quality {
            Quality::Major { explicit: false } => {}
            Quality::Major { explicit: true } => f.write_str("maj")?,
            Quality::Minor => f.write_str("m")?,
            Quality::Diminished => f.write_str("dim")?,
            Quality::Augmented => f.write_str("aug")?,
            Quality::Suspended(None) => f.write_str("sus")?,
            Quality::Suspended(Some(n)) => write!(f, "sus{n}")?,
        }
        if let Some(ext) = self.extension {
            write!(f, "{ext}")?;
        }
        for alt in &self.alterations {
            write!(f, "{alt}")?;
        }
        if let Some(bass) = self.bass {
            f.write_char('/')?;
            f.write_str(bass.name(false))?;
        }
        Ok(())
    }
}
