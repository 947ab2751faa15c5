//! Core identifier types.
//!
//! Newtype wrappers that keep distinct identities from mixing at compile
//! time.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Correlation identifier for one conversion run.
///
/// Attached to logs and to the [`crate::pipeline::ConversionResult`] so a
/// caller can tie diagnostics back to the request that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a fresh random run identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for RunId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
