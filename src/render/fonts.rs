//! Font substitution and width metrics.
//!
//! The rendering collaborator may not carry the exact family the chart was
//! set in. The table maps extracted family names to a renderable family:
//! exact match first, then a classification fallback keyed off substrings,
//! then Helvetica. It is injected into the emitter, never global state.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Fallback family when nothing else matches.
const DEFAULT_FAMILY: &str = "Helvetica";

/// Average glyph width as a fraction of font size, for families without an
/// entry in the ratio table.
const DEFAULT_WIDTH_RATIO: f64 = 0.55;

lazy_static! {
    /// Exact-match family substitutions (keys lowercase).
    static ref FAMILY_MAP: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("helvetica", "Helvetica");
        m.insert("helvetica-bold", "Helvetica-Bold");
        m.insert("times", "Times-Roman");
        m.insert("times-roman", "Times-Roman");
        m.insert("times-bold", "Times-Bold");
        m.insert("courier", "Courier");
        m.insert("courier-bold", "Courier-Bold");
        // Arial maps to Helvetica
        m.insert("arial", "Helvetica");
        m.insert("arial-bold", "Helvetica-Bold");
        m
    };

    /// Average glyph-width ratios per base family.
    static ref WIDTH_RATIOS: HashMap<&'static str, f64> = {
        let mut m = HashMap::new();
        m.insert("Helvetica", 0.55);
        m.insert("Helvetica-Bold", 0.58);
        m.insert("Times-Roman", 0.50);
        m.insert("Times-Bold", 0.53);
        m.insert("Courier", 0.60); // Monospace
        m.insert("Courier-Bold", 0.60);
        m
    };
}

/// Immutable font substitution table.
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    /// Caller-supplied substitutions consulted before the built-in map
    /// (keys lowercase).
    overrides: HashMap<String, String>,
}

impl FontTable {
    /// Build a table with extra exact-match substitutions on top of the
    /// built-in ones.
    #[must_use]
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { overrides }
    }

    /// Resolve an extracted family name to a renderable family.
    #[must_use]
    pub fn resolve(&self, family: &str) -> String {
        let normalized = family.to_lowercase();

        if let Some(mapped) = self.overrides.get(&normalized) {
            return mapped.clone();
        }
        if let Some(mapped) = FAMILY_MAP.get(normalized.as_str()) {
            return (*mapped).to_string();
        }

        // Classification fallback on partial matches
        let bold = normalized.contains("bold");
        if normalized.contains("helvetica") || normalized.contains("arial") {
            return bold_variant("Helvetica", "Helvetica-Bold", bold);
        }
        if normalized.contains("times") || normalized.contains("roman") {
            return bold_variant("Times-Roman", "Times-Bold", bold);
        }
        if normalized.contains("courier") || normalized.contains("mono") {
            return bold_variant("Courier", "Courier-Bold", bold);
        }

        DEFAULT_FAMILY.to_string()
    }

    /// Average glyph width of a resolved family, as a fraction of the font
    /// size.
    #[must_use]
    pub fn width_ratio(&self, resolved: &str) -> f64 {
        WIDTH_RATIOS
            .get(resolved)
            .copied()
            .unwrap_or(DEFAULT_WIDTH_RATIO)
    }
}

fn bold_variant(regular: &str, bold: &str, is_bold: bool) -> String {
    if is_bold { bold } else { regular }.to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn exact_matches_are_case_insensitive() {
        let fonts = FontTable::default();
        assert_eq!(fonts.resolve("Helvetica"), "Helvetica");
        assert_eq!(fonts.resolve("ARIAL"), "Helvetica");
        assert_eq!(fonts.resolve("times-bold"), "Times-Bold");
    }

    #[test]
    fn classification_fallback_on_partial_names() {
        let fonts = FontTable::default();
        assert_eq!(fonts.resolve("ArialMT"), "Helvetica");
        assert_eq!(fonts.resolve("TimesNewRomanPSMT"), "Times-Roman");
        assert_eq!(fonts.resolve("Courier New"), "Courier");
        assert_eq!(fonts.resolve("Helvetica-BoldOblique"), "Helvetica-Bold");
    }

    #[test]
    fn unknown_families_fall_back_to_helvetica() {
        let fonts = FontTable::default();
        assert_eq!(fonts.resolve("Comic Sans MS"), "Helvetica");
    }

    #[test]
    fn overrides_win_over_builtins() {
        let mut overrides = HashMap::new();
        overrides.insert("Songbook-Chords".to_string(), "Courier".to_string());
        let fonts = FontTable::with_overrides(overrides);
        assert_eq!(fonts.resolve("songbook-chords"), "Courier");
        assert_eq!(fonts.resolve("Helvetica"), "Helvetica");
    }

    #[test]
    fn width_ratios_distinguish_families() {
        let fonts = FontTable::default();
        assert_eq!(fonts.width_ratio("Courier"), 0.60);
        assert_eq!(fonts.width_ratio("Times-Roman"), 0.50);
        assert_eq!(fonts.width_ratio("Unknown"), DEFAULT_WIDTH_RATIO);
    }
}
