//! Pipeline orchestration.
//!
//! Wires source → classifier → converter → reconciler → emitter → sink for
//! one conversion request. Pages are independent, so stages 2-4 run in
//! parallel per page; output page order always matches input order. Fatal
//! failures surface as the `Err` arm, non-fatal diagnostics accumulate on
//! the result.

use crate::chart::Page;
use crate::classify::{self, PageClassification, Verdict};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::ingest::DocumentSource;
use crate::layout;
use crate::render::fonts::FontTable;
use crate::render::{self, DocumentSink, PageInstructions};
use crate::theory::{self, Chord, Key, Mode, PitchClass};
use crate::types::RunId;
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// The outcome of a successful conversion run.
///
/// Field names are part of the external contract and must not vary.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    /// Correlation identifier for this run.
    pub run_id: RunId,
    /// Key the conversion was performed against.
    pub key: PitchClass,
    /// Mode used (supplied or inferred).
    pub mode: Mode,
    /// The finished document, as produced by the rendering collaborator.
    #[serde(skip_serializing)]
    pub converted_document_bytes: Vec<u8>,
    /// Number of chord symbols the classifier accepted.
    pub chords_found: usize,
    /// Number of chords actually converted and placed.
    pub chords_converted: usize,
    /// Accepted chord count per page, in page order.
    pub per_page_counts: Vec<usize>,
    /// Non-fatal diagnostics accumulated during the run.
    pub errors: Vec<PipelineError>,
    /// Wall-clock processing time in milliseconds.
    pub elapsed_ms: u64,
}

/// A conversion pipeline bound to one source/sink pair.
///
/// Holds no per-run state: one instance can serve concurrent independent
/// runs.
pub struct Pipeline<S, K> {
    source: S,
    sink: K,
    fonts: FontTable,
    config: Config,
}

impl<S: DocumentSource, K: DocumentSink> Pipeline<S, K> {
    /// Build a pipeline over the given collaborators.
    pub const fn new(source: S, sink: K, fonts: FontTable, config: Config) -> Self {
        Self { source, sink, fonts, config }
    }

    /// Convert a chord-chart document to Nashville notation.
    ///
    /// `mode` of `None` infers major/minor from the chords found. A run
    /// over a document with no chord-shaped tokens succeeds with
    /// `chords_found == 0` and re-emits every page unchanged.
    pub fn convert(
        &self,
        document: &[u8],
        key_root: PitchClass,
        mode: Option<Mode>,
    ) -> Result<ConversionResult> {
        let run_id = RunId::new();
        let started = Instant::now();
        info!(%run_id, key = %key_root, "starting conversion run");

        let pages = self.source.extract(document)?;
        debug!(%run_id, pages = pages.len(), elapsed = ?started.elapsed(), "ingest complete");

        let classified: Vec<PageClassification> = pages
            .par_iter()
            .map(|page| classify::classify_page(page, &self.config.classifier))
            .collect();
        let chords_found: usize = classified.iter().map(|c| c.accepted.len()).sum();
        let per_page_counts: Vec<usize> = classified.iter().map(|c| c.accepted.len()).collect();
        debug!(%run_id, chords_found, elapsed = ?started.elapsed(), "classification complete");

        let mode = mode.unwrap_or_else(|| {
            let chords: Vec<Chord> = classified
                .iter()
                .flat_map(|c| c.accepted.iter().map(|a| a.chord.clone()))
                .collect();
            let inferred = theory::infer_mode(&chords, key_root);
            info!(%run_id, mode = %inferred, "inferred mode from chord qualities");
            inferred
        });
        let key = Key::new(key_root, mode);

        let converted: Result<Vec<(PageInstructions, usize)>> = pages
            .par_iter()
            .zip(&classified)
            .enumerate()
            .map(|(page_index, (page, classification))| {
                self.convert_page(page, page_index, classification, key)
            })
            .collect();
        let converted = converted?;
        let chords_converted: usize = converted.iter().map(|(_, n)| *n).sum();
        let instructions: Vec<PageInstructions> =
            converted.into_iter().map(|(i, _)| i).collect();
        debug!(%run_id, chords_converted, elapsed = ?started.elapsed(), "layout complete");

        let converted_document_bytes = self.sink.render(&instructions)?;

        let errors = ambiguity_diagnostics(&pages, &classified);
        let elapsed_ms =
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            %run_id,
            chords_found,
            chords_converted,
            elapsed_ms,
            "conversion run complete"
        );

        Ok(ConversionResult {
            run_id,
            key: key_root,
            mode,
            converted_document_bytes,
            chords_found,
            chords_converted,
            per_page_counts,
            errors,
            elapsed_ms,
        })
    }

    /// Stages 3-5 for one page: convert, reconcile, emit. Returns the
    /// instructions and the number of chords placed.
    fn convert_page(
        &self,
        page: &Page,
        page_index: usize,
        classification: &PageClassification,
        key: Key,
    ) -> Result<(PageInstructions, usize)> {
        let mut converted = Vec::with_capacity(classification.accepted.len());
        for chord_token in &classification.accepted {
            let notation = theory::convert(&chord_token.chord, key);
            // Unreachable for any chord the grammar produced; fail the run
            // rather than place malformed output.
            if notation.is_empty() {
                return Err(PipelineError::inconsistency(
                    format!("empty notation for chord '{}'", chord_token.chord),
                    chord_token.token.clone(),
                ));
            }
            converted.push((chord_token.clone(), notation));
        }

        let entries = layout::reconcile_page(
            converted,
            page.page_width,
            page.page_height,
            &self.fonts,
            &self.config.layout,
        );
        let placed = entries.len();
        Ok((render::emit_page(page, page_index, &entries, &self.fonts), placed))
    }
}

/// Collect the non-fatal diagnostics: one entry per grammar-matching token
/// the classifier rejected on context.
fn ambiguity_diagnostics(
    pages: &[Page],
    classified: &[PageClassification],
) -> Vec<PipelineError> {
    pages
        .iter()
        .zip(classified)
        .flat_map(|(page, classification)| {
            page.tokens
                .iter()
                .zip(&classification.verdicts)
                .filter(|(_, verdict)| matches!(verdict, Verdict::RejectedAmbiguous))
                .map(|(token, _)| {
                    PipelineError::ambiguity(
                        format!("token '{}' reads as a lyric in context", token.text),
                        token.clone(),
                    )
                })
        })
        .collect()
}
