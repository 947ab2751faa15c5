//! Pipeline configuration.
//!
//! Handles loading tuned thresholds from environment variables and `.env`
//! files. Defaults live in [`crate::constants`].

use crate::constants;
use dotenv::dotenv;
use std::env;
use std::str::FromStr;

/// Chord classifier thresholds.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Smallest font size a chord token may have, in points.
    pub min_font_size: f64,
    /// Largest font size a chord token may have, in points.
    pub max_font_size: f64,
    /// Longest trimmed text still considered chord-shaped.
    pub max_chord_len: usize,
    /// Font-size deviation from the page dominant that vouches for a bare
    /// note name on its own.
    pub font_size_delta: f64,
    /// Plain lyric words on a line above which grammar matches on that line
    /// are treated as lyrics.
    pub lyric_run_threshold: usize,
    /// Fraction of a line's tokens that must be chord-shaped for the line to
    /// count as a chord line.
    pub chord_line_ratio: f64,
    /// Vertical grouping distance for line detection, in points.
    pub line_tolerance: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_font_size: constants::classify::MIN_FONT_SIZE,
            max_font_size: constants::classify::MAX_FONT_SIZE,
            max_chord_len: constants::classify::MAX_CHORD_LEN,
            font_size_delta: constants::classify::FONT_SIZE_DELTA,
            lyric_run_threshold: constants::classify::LYRIC_RUN_THRESHOLD,
            chord_line_ratio: constants::classify::CHORD_LINE_RATIO,
            line_tolerance: constants::classify::LINE_TOLERANCE,
        }
    }
}

/// Layout reconciler thresholds.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Padding on every side of an erase rectangle, in points.
    pub erase_padding: f64,
    /// Font size decrement for overlap resolution, in points.
    pub shrink_step: f64,
    /// Smallest font size overlap resolution may reach, in points.
    pub min_font_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            erase_padding: constants::layout::ERASE_PADDING,
            shrink_step: constants::layout::SHRINK_STEP,
            min_font_size: constants::layout::MIN_RENDER_FONT_SIZE,
        }
    }
}

/// Ingestion thresholds.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Minimum total extracted characters for a text-based document.
    pub min_text_threshold: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_text_threshold: constants::ingest::MIN_TEXT_THRESHOLD,
        }
    }
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Chord classifier thresholds.
    pub classifier: ClassifierConfig,
    /// Layout reconciler thresholds.
    pub layout: LayoutConfig,
    /// Ingestion thresholds.
    pub ingest: IngestConfig,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults in [`crate::constants`] for anything unset.
    #[must_use]
    pub fn load() -> Self {
        // Try to load .env file if present
        dotenv().ok();

        let mut config = Self::default();

        override_from_env("MIN_FONT_SIZE", &mut config.classifier.min_font_size);
        override_from_env("MAX_FONT_SIZE", &mut config.classifier.max_font_size);
        override_from_env("MAX_CHORD_LEN", &mut config.classifier.max_chord_len);
        override_from_env("FONT_SIZE_DELTA", &mut config.classifier.font_size_delta);
        override_from_env("LYRIC_RUN_THRESHOLD", &mut config.classifier.lyric_run_threshold);
        override_from_env("CHORD_LINE_RATIO", &mut config.classifier.chord_line_ratio);
        override_from_env("LINE_TOLERANCE", &mut config.classifier.line_tolerance);

        override_from_env("ERASE_PADDING", &mut config.layout.erase_padding);
        override_from_env("SHRINK_STEP", &mut config.layout.shrink_step);
        override_from_env("MIN_RENDER_FONT_SIZE", &mut config.layout.min_font_size);

        override_from_env("MIN_TEXT_THRESHOLD", &mut config.ingest.min_text_threshold);

        config
    }
}

/// Overwrite `target` with the parsed value of `key` if it is set and parses.
fn override_from_env<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = env::var(key) {
        if let Ok(value) = raw.parse() {
            *target = value;
        }
    }
}
