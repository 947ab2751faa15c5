//! JSON reference implementation of the rendering collaborator.
//!
//! Validates every instruction against its page bounds and serializes the
//! instruction lists as the rendered document. Useful for the CLI, tests,
//! and any caller that post-processes draw instructions itself.

use crate::error::{PipelineError, Result};
use crate::render::{DocumentSink, DrawOp, PageInstructions};
use serde::{Deserialize, Serialize};

/// The rendered-document wire format: per-page instruction lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// Pages in input order.
    pub pages: Vec<PageInstructions>,
}

/// A [`DocumentSink`] producing JSON bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonChartSink;

impl JsonChartSink {
    /// Build a sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentSink for JsonChartSink {
    fn render(&self, pages: &[PageInstructions]) -> Result<Vec<u8>> {
        for page in pages {
            validate_page(page)?;
        }
        let document = RenderedDocument { pages: pages.to_vec() };
        serde_json::to_vec_pretty(&document)
            .map_err(|e| PipelineError::render(format!("failed to serialize document: {e}")))
    }
}

/// Reject any instruction referencing coordinates outside the page bounds.
fn validate_page(page: &PageInstructions) -> Result<()> {
    let inside = |x: f64, y: f64| {
        x >= 0.0 && x <= page.page_width && y >= 0.0 && y <= page.page_height
    };
    for op in &page.ops {
        let ok = match op {
            DrawOp::CopyBackground => true,
            DrawOp::FillRect { rect, .. } => {
                inside(rect.x0, rect.y0) && inside(rect.x1, rect.y1)
            }
            DrawOp::DrawText { x, y, .. } => inside(*x, *y),
        };
        if !ok {
            return Err(PipelineError::render(format!(
                "instruction outside page {} bounds ({} x {}): {op:?}",
                page.page_index, page.page_width, page.page_height
            )));
        }
    }
    Ok(())
}
