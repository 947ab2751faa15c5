//! Layout reconciler.
//!
//! Maps accepted chord tokens from extraction space (top-left origin, y
//! down) into render space (bottom-left origin, y up), sizes an erase
//! rectangle over each original glyph, and resolves collisions between
//! neighboring replacements.

use crate::chart::BoundingBox;
use crate::classify::ChordToken;
use crate::config::LayoutConfig;
use crate::render::fonts::FontTable;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Axis-aligned rectangle in render space (y grows upward; `y0` is the
/// bottom edge, `y1` the top).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x0: f64,
    /// Bottom edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Top edge.
    pub y1: f64,
}

impl Rect {
    /// Flip an extraction-space bounding box into render space. The token's
    /// bottom edge (extraction `y1`) becomes the render-space bottom.
    pub const fn from_extraction(bbox: &BoundingBox, page_height: f64) -> Self {
        Self {
            x0: bbox.x0,
            y0: page_height - bbox.y1,
            x1: bbox.x1,
            y1: page_height - bbox.y0,
        }
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn padded(&self, amount: f64) -> Self {
        Self {
            x0: self.x0 - amount,
            y0: self.y0 - amount,
            x1: self.x1 + amount,
            y1: self.y1 + amount,
        }
    }

    /// Whether two rectangles overlap with positive area.
    pub fn intersects(&self, other: &Self) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Clamp the rectangle to the page rectangle. Padding and widening can
    /// push an edge token's erase past a page edge; the sink refuses
    /// out-of-bounds instructions, so the reconciler never emits them.
    pub fn clamped(&self, page_width: f64, page_height: f64) -> Self {
        Self {
            x0: self.x0.max(0.0),
            y0: self.y0.max(0.0),
            x1: self.x1.min(page_width),
            y1: self.y1.min(page_height),
        }
    }
}

/// A chord ready to render: the accepted token, its notation, and where the
/// replacement goes. Consumed only by the render emitter.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionEntry {
    /// The accepted chord token.
    pub chord_token: ChordToken,
    /// Nashville notation replacing the chord symbol.
    pub notation: String,
    /// Rectangle to erase, covering the original glyph (render space).
    pub erase: Rect,
    /// Rectangle the notation is placed in (render space).
    pub placement: Rect,
    /// Font size to draw at, after any overlap shrinking.
    pub font_size: f64,
}

/// Estimated rendered width of a string, from its display width and the
/// average glyph-width ratio of the resolved font family.
fn estimated_width(text: &str, font_size: f64, fonts: &FontTable, family: &str) -> f64 {
    let columns = UnicodeWidthStr::width(text) as f64;
    columns * font_size * fonts.width_ratio(&fonts.resolve(family))
}

/// Compute the erase and placement rectangles for one entry at a given
/// font size.
fn place(
    token: &ChordToken,
    notation: &str,
    font_size: f64,
    page_width: f64,
    page_height: f64,
    fonts: &FontTable,
    config: &LayoutConfig,
) -> (Rect, Rect) {
    let original = Rect::from_extraction(&token.token.bbox, page_height);
    let needed = estimated_width(notation, font_size, fonts, &token.token.font_name);

    // The notation is usually shorter than the symbol it replaces. When it
    // is longer, widen symmetrically around the original center so the left
    // edge stays clear of the previous token.
    let placement = if needed > original.width() {
        let center = original.center_x();
        Rect {
            x0: center - needed / 2.0,
            x1: center + needed / 2.0,
            ..original
        }
    } else {
        original
    };

    // The erase always covers the original glyph plus padding for
    // anti-aliased edges, and the full placement when that is wider.
    let erase = Rect {
        x0: placement.x0.min(original.x0),
        x1: placement.x1.max(original.x1),
        ..original
    }
    .padded(config.erase_padding)
    .clamped(page_width, page_height);

    (erase, placement.clamped(page_width, page_height))
}

/// Build placement instructions for one page's accepted chords.
///
/// Entries come back in reading order (top-to-bottom, then left-to-right in
/// render space). Overlapping erase rectangles are resolved by shrinking
/// the later entry's font in fixed decrements; at the configured minimum
/// the later erase is clipped at the midpoint between the two original
/// token centers instead. Every rectangle is clamped to the page bounds.
pub fn reconcile_page(
    converted: Vec<(ChordToken, String)>,
    page_width: f64,
    page_height: f64,
    fonts: &FontTable,
    config: &LayoutConfig,
) -> Vec<ConversionEntry> {
    let mut entries: Vec<ConversionEntry> = converted
        .into_iter()
        .map(|(chord_token, notation)| {
            let font_size = chord_token.token.font_size;
            let (erase, placement) = place(
                &chord_token,
                &notation,
                font_size,
                page_width,
                page_height,
                fonts,
                config,
            );
            ConversionEntry {
                chord_token,
                notation,
                erase,
                placement,
                font_size,
            }
        })
        .collect();

    // Reading order: top of the page first (larger render y), then left to
    // right.
    entries.sort_by(|a, b| {
        b.placement
            .y1
            .total_cmp(&a.placement.y1)
            .then(a.placement.x0.total_cmp(&b.placement.x0))
    });

    for later in 1..entries.len() {
        for earlier in 0..later {
            if !entries[earlier].erase.intersects(&entries[later].erase) {
                continue;
            }

            // Shrink the later entry until the collision clears or the
            // floor is reached.
            while entries[earlier].erase.intersects(&entries[later].erase)
                && entries[later].font_size - config.shrink_step >= config.min_font_size
            {
                let entry = &entries[later];
                let font_size = entry.font_size - config.shrink_step;
                let (erase, placement) = place(
                    &entry.chord_token,
                    &entry.notation,
                    font_size,
                    page_width,
                    page_height,
                    fonts,
                    config,
                );
                let entry = &mut entries[later];
                entry.font_size = font_size;
                entry.erase = erase;
                entry.placement = placement;
            }

            if entries[earlier].erase.intersects(&entries[later].erase) {
                clip_at_midpoint(&mut entries, earlier, later, page_height);
            }
        }
    }

    entries
}

/// Clip the later entry's erase rectangle at the horizontal midpoint
/// between the two original token centers. The replacement text may be
/// visually truncated; that is an accepted degradation, not an error.
fn clip_at_midpoint(
    entries: &mut [ConversionEntry],
    earlier: usize,
    later: usize,
    page_height: f64,
) {
    let earlier_center =
        Rect::from_extraction(&entries[earlier].chord_token.token.bbox, page_height).center_x();
    let later_center =
        Rect::from_extraction(&entries[later].chord_token.token.bbox, page_height).center_x();
    let midpoint = (earlier_center + later_center) / 2.0;

    let entry = &mut entries[later];
    if later_center >= earlier_center {
        entry.erase.x0 = entry.erase.x0.max(midpoint);
        entry.placement.x0 = entry.placement.x0.max(midpoint);
    } else {
        entry.erase.x1 = entry.erase.x1.min(midpoint);
        entry.placement.x1 = entry.placement.x1.min(midpoint);
    }
}
