//! Default values for tuned pipeline thresholds.
//!
//! Everything here is a default for a `Config` field, overridable via
//! environment variables. The classification thresholds in particular are
//! empirically tuned and have no derivation; treat them as starting points.

/// Chord classifier defaults.
pub mod classify {
    /// Smallest font size a chord token may have, in points.
    pub const MIN_FONT_SIZE: f64 = 8.0;

    /// Largest font size a chord token may have, in points.
    pub const MAX_FONT_SIZE: f64 = 24.0;

    /// Longest text (after trimming) still considered chord-shaped.
    pub const MAX_CHORD_LEN: usize = 10;

    /// How far a token's font size must sit from the page's dominant size
    /// before the deviation alone vouches for a bare note name.
    pub const FONT_SIZE_DELTA: f64 = 1.5;

    /// Number of plain lyric words on a line above which a grammar match on
    /// that line is treated as a lyric.
    pub const LYRIC_RUN_THRESHOLD: usize = 3;

    /// Fraction of a line's tokens that must be chord-shaped for the line to
    /// count as a chord line.
    pub const CHORD_LINE_RATIO: f64 = 0.6;

    /// Vertical distance (points) within which tokens group into one line.
    pub const LINE_TOLERANCE: f64 = 4.0;
}

/// Layout reconciler defaults.
pub mod layout {
    /// Padding added on every side of an erase rectangle, in points.
    pub const ERASE_PADDING: f64 = 2.0;

    /// Font size decrement applied while resolving overlaps, in points.
    pub const SHRINK_STEP: f64 = 1.0;

    /// Smallest font size overlap resolution may shrink to, in points.
    pub const MIN_RENDER_FONT_SIZE: f64 = 6.0;
}

/// Ingestion defaults.
pub mod ingest {
    /// Minimum total extracted characters for a document to count as
    /// text-based. Below this the document is treated as scanned.
    pub const MIN_TEXT_THRESHOLD: usize = 50;
}
