//! Render emitter and the rendering collaborator boundary.
//!
//! Turns a page's conversion entries into an ordered list of draw
//! instructions: copy the original page, then per chord an erase rectangle
//! followed by the notation text. Coordinates are render space (bottom-left
//! origin, y up).

pub mod fonts;
pub mod json;

use crate::chart::Page;
use crate::error::Result;
use crate::layout::{ConversionEntry, Rect};
use fonts::FontTable;
use serde::{Deserialize, Serialize};

/// An RGB color with components in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Color {
    /// Page background color used for erase rectangles.
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255 };
    /// Notation text color.
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };
}

/// One draw instruction for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Copy the original page content as the background.
    CopyBackground,
    /// Fill a rectangle with a solid color.
    FillRect {
        /// Rectangle to fill, in render space.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// Place text at a baseline position.
    DrawText {
        /// Left edge of the text.
        x: f64,
        /// Baseline y coordinate.
        y: f64,
        /// The text to draw.
        text: String,
        /// Resolved font family.
        font: String,
        /// Font size in points.
        size: f64,
        /// Text color.
        color: Color,
    },
}

/// Ordered draw instructions for one output page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInstructions {
    /// Zero-based page index.
    pub page_index: usize,
    /// Page width in points.
    pub page_width: f64,
    /// Page height in points.
    pub page_height: f64,
    /// Instructions in draw order.
    pub ops: Vec<DrawOp>,
}

/// The rendering collaborator boundary.
///
/// Implementations take the full ordered instruction list and produce the
/// finished document as bytes. They must be stateless per call so
/// concurrent runs can share one instance.
pub trait DocumentSink: Send + Sync {
    /// Render all pages to a finished document.
    ///
    /// Fails with a `Render` error on any instruction referencing
    /// coordinates outside its page bounds.
    fn render(&self, pages: &[PageInstructions]) -> Result<Vec<u8>>;
}

/// Baseline y for text inside a render-space rectangle: optically centered
/// in the erased strip, nudged up by a fifth of the font size.
fn baseline_y(rect: &Rect, font_size: f64) -> f64 {
    rect.y0 + (rect.height() - font_size) / 2.0 + font_size * 0.2
}

/// Emit the draw instructions for one page.
///
/// Per entry the order is fixed: erase rectangle first, notation text
/// second. Background content and non-chord tokens pass through via the
/// leading `CopyBackground`.
#[must_use]
pub fn emit_page(
    page: &Page,
    page_index: usize,
    entries: &[ConversionEntry],
    fonts: &FontTable,
) -> PageInstructions {
    let mut ops = Vec::with_capacity(1 + entries.len() * 2);
    ops.push(DrawOp::CopyBackground);

    for entry in entries {
        ops.push(DrawOp::FillRect {
            rect: entry.erase,
            color: Color::WHITE,
        });
        ops.push(DrawOp::DrawText {
            x: entry.placement.x0,
            y: baseline_y(&entry.placement, entry.font_size),
            text: entry.notation.clone(),
            font: fonts.resolve(&entry.chord_token.token.font_name),
            size: entry.font_size,
            color: Color::BLACK,
        });
    }

    PageInstructions {
        page_index,
        page_width: page.page_width,
        page_height: page.page_height,
        ops,
    }
}
