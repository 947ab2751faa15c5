//! Document ingestion boundary.
//!
//! The pipeline consumes pages of positioned tokens through the
//! [`DocumentSource`] trait; what produced them (a PDF text layer, a chart
//! dump, a test fixture) is the collaborator's business. Extraction of
//! scanned documents via OCR is deliberately not implemented: a document
//! with no text layer is rejected with an `UnsupportedFormat` error.

pub mod json;

use crate::chart::Page;
use crate::error::Result;

/// The ingestion collaborator boundary.
///
/// Implementations must be stateless per call so concurrent runs can share
/// one instance.
pub trait DocumentSource: Send + Sync {
    /// Extract pages of positioned text tokens from a document.
    ///
    /// Fails with `Extraction` on unreadable or encrypted documents and
    /// with `UnsupportedFormat` on documents carrying no text layer.
    fn extract(&self, document: &[u8]) -> Result<Vec<Page>>;
}
