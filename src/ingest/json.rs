//! JSON reference implementation of the ingestion collaborator.
//!
//! Parses the chart wire format: a list of pages, each with dimensions and
//! positioned text tokens. A parseable document whose total extracted text
//! is under the configured threshold is treated as scanned and rejected,
//! mirroring text-layer detection; the OCR path stays unimplemented.

use crate::chart::Page;
use crate::config::IngestConfig;
use crate::error::{PipelineError, Result};
use crate::ingest::DocumentSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The chart document wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDocument {
    /// Pages in document order.
    pub pages: Vec<Page>,
}

/// A [`DocumentSource`] reading chart-document JSON.
#[derive(Debug, Clone)]
pub struct JsonChartSource {
    config: IngestConfig,
}

impl JsonChartSource {
    /// Build a source with the given ingestion thresholds.
    #[must_use]
    pub const fn new(config: IngestConfig) -> Self {
        Self { config }
    }
}

impl Default for JsonChartSource {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl DocumentSource for JsonChartSource {
    fn extract(&self, document: &[u8]) -> Result<Vec<Page>> {
        let chart: ChartDocument = serde_json::from_slice(document)
            .map_err(|e| PipelineError::extraction(format!("unreadable chart document: {e}")))?;

        let total_text: usize = chart
            .pages
            .iter()
            .flat_map(|page| page.tokens.iter())
            .map(|token| token.text.trim().len())
            .sum();
        if total_text < self.config.min_text_threshold {
            return Err(PipelineError::unsupported_format(format!(
                "document has no usable text layer ({total_text} characters extracted); \
                 supply a text-based chart, scanned documents are not supported"
            )));
        }

        // Token page indices are derived from position, whatever the file said
        let pages: Vec<Page> = chart
            .pages
            .into_iter()
            .enumerate()
            .map(|(index, mut page)| {
                for token in &mut page.tokens {
                    token.page_index = index;
                }
                page
            })
            .collect();

        debug!(pages = pages.len(), total_text, "extracted chart document");
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::error::ErrorKind;

    fn chart_json(texts: &[&str]) -> Vec<u8> {
        let tokens: Vec<serde_json::Value> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let x = 72.0 + i as f64 * 60.0;
                serde_json::json!({
                    "text": text,
                    "bbox": { "x0": x, "y0": 100.0, "x1": x + 20.0, "y1": 112.0 },
                    "font_name": "Helvetica",
                    "font_size": 12.0
                })
            })
            .collect();
        serde_json::to_vec(&serde_json::json!({
            "pages": [{ "page_width": 612.0, "page_height": 792.0, "tokens": tokens }]
        }))
        .unwrap()
    }

    #[test]
    fn parses_a_chart_document() {
        let source = JsonChartSource::new(IngestConfig { min_text_threshold: 0 });
        let pages = source.extract(&chart_json(&["C", "G7"])).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].tokens.len(), 2);
        assert_eq!(pages[0].tokens[1].text, "G7");
    }

    #[test]
    fn unparseable_bytes_are_an_extraction_error() {
        let source = JsonChartSource::default();
        let err = source.extract(b"%PDF-1.4 not json at all").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
    }

    #[test]
    fn sparse_text_is_an_unsupported_format() {
        let source = JsonChartSource::default();
        let err = source.extract(&chart_json(&["C"])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFormat);
        assert!(err.message.contains("text"));
    }

    #[test]
    fn page_indices_come_from_position() {
        let source = JsonChartSource::new(IngestConfig { min_text_threshold: 0 });
        let two_pages = serde_json::to_vec(&serde_json::json!({
            "pages": [
                { "page_width": 612.0, "page_height": 792.0, "tokens": [{
                    "text": "C",
                    "bbox": { "x0": 72.0, "y0": 100.0, "x1": 80.0, "y1": 112.0 },
                    "font_name": "Helvetica",
                    "font_size": 12.0,
                    "page_index": 9
                }] },
                { "page_width": 612.0, "page_height": 792.0, "tokens": [{
                    "text": "G",
                    "bbox": { "x0": 72.0, "y0": 100.0, "x1": 80.0, "y1": 112.0 },
                    "font_name": "Helvetica",
                    "font_size": 12.0
                }] }
            ]
        }))
        .unwrap();
        let pages = source.extract(&two_pages).unwrap();
        assert_eq!(pages[0].tokens[0].page_index, 0);
        assert_eq!(pages[1].tokens[0].page_index, 1);
    }
}
