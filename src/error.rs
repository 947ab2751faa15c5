//! Pipeline error types.
//!
//! Every failure carries the stage it originated in, a kind from the fixed
//! taxonomy, and (where one exists) the offending token. Errors are created
//! at the point of failure and propagated unmodified to the caller.

use crate::chart::TextToken;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Pipeline result type alias.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The pipeline stage an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Document ingestion (token extraction).
    Ingest,
    /// Chord classification.
    Classify,
    /// Nashville conversion.
    Convert,
    /// Layout reconciliation.
    Layout,
    /// Render emission and the rendering collaborator.
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ingest => "ingest",
            Self::Classify => "classify",
            Self::Convert => "convert",
            Self::Layout => "layout",
            Self::Render => "render",
        };
        f.write_str(name)
    }
}

/// Error taxonomy for the conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Document unreadable, corrupted, or encrypted. Fatal.
    Extraction,
    /// No extractable text layer (scanned document). Fatal.
    UnsupportedFormat,
    /// A token matched the chord grammar but context made it suspect.
    /// Never fatal: the classifier resolves it by rejecting the token, and
    /// the rejection is surfaced as a diagnostic only.
    ClassificationAmbiguity,
    /// Internal invariant failure in the converter. Should be unreachable
    /// for any chord the grammar produced; fatal if it ever triggers.
    ConversionInconsistency,
    /// The rendering collaborator refused an instruction. Fatal.
    Render,
}

impl ErrorKind {
    /// Whether an error of this kind aborts the whole run.
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::ClassificationAmbiguity)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Extraction => "extraction",
            Self::UnsupportedFormat => "unsupported format",
            Self::ClassificationAmbiguity => "classification ambiguity",
            Self::ConversionInconsistency => "conversion inconsistency",
            Self::Render => "render",
        };
        f.write_str(name)
    }
}

/// A structured pipeline failure.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{kind} error in {stage} stage: {message}")]
pub struct PipelineError {
    /// Stage the error originated in.
    pub stage: Stage,
    /// Kind from the fixed taxonomy.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// The token that triggered the failure, if one exists.
    pub token: Option<TextToken>,
}

impl PipelineError {
    /// Document unreadable or corrupted.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Ingest,
            kind: ErrorKind::Extraction,
            message: message.into(),
            token: None,
        }
    }

    /// Document has no extractable text layer.
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Ingest,
            kind: ErrorKind::UnsupportedFormat,
            message: message.into(),
            token: None,
        }
    }

    /// Non-fatal diagnostic for a grammar-matching token the classifier
    /// rejected on context.
    pub fn ambiguity(message: impl Into<String>, token: TextToken) -> Self {
        Self {
            stage: Stage::Classify,
            kind: ErrorKind::ClassificationAmbiguity,
            message: message.into(),
            token: Some(token),
        }
    }

    /// Internal invariant failure in the converter.
    pub fn inconsistency(message: impl Into<String>, token: TextToken) -> Self {
        Self {
            stage: Stage::Convert,
            kind: ErrorKind::ConversionInconsistency,
            message: message.into(),
            token: Some(token),
        }
    }

    /// The rendering collaborator refused an instruction.
    pub fn render(message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Render,
            kind: ErrorKind::Render,
            message: message.into(),
            token: None,
        }
    }

    /// Whether this error aborts the whole run.
    pub const fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}
