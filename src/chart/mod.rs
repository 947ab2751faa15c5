//! Chart document model.
//!
//! Positioned text as delivered by the ingestion collaborator. Coordinates
//! are extraction space: origin at the top-left corner of the page, y
//! increasing downward, units in PDF points (72 DPI).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned bounding box in extraction space.
///
/// `y0` is the top edge and `y1` the bottom edge (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x0: f64,
    /// Top edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Bottom edge.
    pub y1: f64,
}

impl BoundingBox {
    /// Create a bounding box from edge coordinates.
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Area of the box.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Horizontal center of the box.
    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical center of the box.
    pub fn center_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }
}

/// A positioned text token extracted from a chart page.
///
/// Read-only to the pipeline: stages that need a corrected token produce a
/// new one rather than mutating this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToken {
    /// Text content as extracted.
    pub text: String,
    /// Bounding box in extraction space.
    pub bbox: BoundingBox,
    /// Font family name reported by the extractor.
    pub font_name: String,
    /// Font size in points.
    pub font_size: f64,
    /// Zero-based page index the token came from.
    #[serde(default)]
    pub page_index: usize,
}

impl fmt::Display for TextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' page={} at ({:.1}, {:.1})",
            self.text, self.page_index, self.bbox.x0, self.bbox.y0
        )
    }
}

/// One page of a chart document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page width in points.
    pub page_width: f64,
    /// Page height in points.
    pub page_height: f64,
    /// Tokens on this page, in extraction order.
    pub tokens: Vec<TextToken>,
}
