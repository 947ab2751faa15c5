//! `nashflow` - chord chart to Nashville Number System conversion.
//!
//! Takes a paginated chart document of positioned text tokens, identifies
//! the chord symbols among the lyrics, converts them to Nashville degree
//! notation for a target key, and emits draw instructions that place the
//! notation exactly where each chord sat. The ingestion and rendering
//! collaborators are trait boundaries ([`ingest::DocumentSource`],
//! [`render::DocumentSink`]); JSON reference implementations of both ship
//! with the crate.

pub mod chart;
pub mod classify;
pub mod config;
pub mod constants;
pub mod error;
pub mod ingest;
pub mod layout;
pub mod pipeline;
pub mod render;
pub mod theory;
pub mod types;
