//! End-to-end tests driving the public pipeline contract with in-memory
//! chart fixtures.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use nashflow::config::Config;
use nashflow::error::ErrorKind;
use nashflow::ingest::json::JsonChartSource;
use nashflow::pipeline::{ConversionResult, Pipeline};
use nashflow::render::fonts::FontTable;
use nashflow::render::json::{JsonChartSink, RenderedDocument};
use nashflow::render::DrawOp;
use nashflow::theory::{Mode, PitchClass};
use serde_json::json;

/// Builds chart-document JSON one page at a time.
#[derive(Default)]
struct ChartBuilder {
    pages: Vec<serde_json::Value>,
}

impl ChartBuilder {
    fn page(mut self, tokens: &[serde_json::Value]) -> Self {
        self.pages.push(json!({
            "page_width": 612.0,
            "page_height": 792.0,
            "tokens": tokens,
        }));
        self
    }

    fn bytes(self) -> Vec<u8> {
        serde_json::to_vec(&json!({ "pages": self.pages })).unwrap()
    }
}

fn token(text: &str, x: f64, y: f64, size: f64) -> serde_json::Value {
    let width = text.len() as f64 * size * 0.55;
    json!({
        "text": text,
        "bbox": { "x0": x, "y0": y, "x1": x + width, "y1": y + size },
        "font_name": "Helvetica",
        "font_size": size,
    })
}

/// A line of evenly spaced tokens at one y position.
fn line(texts: &[&str], y: f64, size: f64) -> Vec<serde_json::Value> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| token(text, 72.0 + i as f64 * 70.0, y, size))
        .collect()
}

/// Lyrics long enough to clear the text-layer threshold.
const LYRICS: [&str; 10] = [
    "walking", "slowly", "through", "the", "morning",
    "light", "we", "carry", "every", "song",
];

fn pipeline() -> Pipeline<JsonChartSource, JsonChartSink> {
    let config = Config::default();
    Pipeline::new(
        JsonChartSource::new(config.ingest.clone()),
        JsonChartSink::new(),
        FontTable::default(),
        config,
    )
}

fn convert(document: &[u8], key: &str, mode: Option<Mode>) -> ConversionResult {
    pipeline()
        .convert(document, PitchClass::parse(key).unwrap(), mode)
        .unwrap()
}

fn rendered(result: &ConversionResult) -> RenderedDocument {
    serde_json::from_slice(&result.converted_document_bytes).unwrap()
}

/// All text drawn on a page, in draw order.
fn drawn_texts(document: &RenderedDocument, page: usize) -> Vec<String> {
    document.pages[page]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::DrawText { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn c_major_diatonic_sequence_converts() {
    let chords = ["C", "Dm", "Em", "F", "G", "Am", "G7"];
    let mut tokens = line(&chords, 100.0, 12.0);
    tokens.extend(line(&LYRICS, 120.0, 12.0));
    let document = ChartBuilder::default().page(&tokens).bytes();

    let result = convert(&document, "C", Some(Mode::Major));
    assert_eq!(result.chords_found, 7);
    assert_eq!(result.chords_converted, 7);
    assert_eq!(result.per_page_counts, vec![7]);

    let expected = ["1", "2m", "3m", "4", "5", "6m", "57"];
    assert_eq!(drawn_texts(&rendered(&result), 0), expected);
}

#[test]
fn slash_chords_resolve_root_and_bass_independently() {
    let mut tokens = line(&["D/F#", "G", "D/C#"], 100.0, 12.0);
    tokens.extend(line(&LYRICS, 120.0, 12.0));
    let document = ChartBuilder::default().page(&tokens).bytes();

    let result = convert(&document, "G", Some(Mode::Major));
    assert_eq!(drawn_texts(&rendered(&result), 0), ["5/7", "1", "5/b5"]);
}

#[test]
fn enharmonic_spellings_convert_identically() {
    let mut sharp_tokens = line(&["C#m7"], 100.0, 12.0);
    sharp_tokens.extend(line(&LYRICS, 120.0, 12.0));
    let mut flat_tokens = line(&["Dbm7"], 100.0, 12.0);
    flat_tokens.extend(line(&LYRICS, 120.0, 12.0));

    let sharp = convert(&ChartBuilder::default().page(&sharp_tokens).bytes(), "E", Some(Mode::Major));
    let flat = convert(&ChartBuilder::default().page(&flat_tokens).bytes(), "E", Some(Mode::Major));
    assert_eq!(
        drawn_texts(&rendered(&sharp), 0),
        drawn_texts(&rendered(&flat), 0)
    );
}

#[test]
fn page_without_chords_is_a_successful_degenerate_run() {
    let document = ChartBuilder::default()
        .page(&line(&LYRICS, 100.0, 12.0))
        .bytes();

    let result = convert(&document, "C", Some(Mode::Major));
    assert_eq!(result.chords_found, 0);
    assert_eq!(result.chords_converted, 0);
    assert_eq!(result.per_page_counts, vec![0]);

    // The page passes through untouched: background copy only
    let document = rendered(&result);
    assert_eq!(document.pages[0].ops, vec![DrawOp::CopyBackground]);
}

#[test]
fn lyric_words_matching_chord_grammar_are_left_alone() {
    // "A" embedded in a lyric line; the lyrics also mention "Am"
    let mut tokens = line(&["G7", "C"], 100.0, 12.0);
    tokens.extend(line(
        &["it", "takes", "A", "little", "time", "Am", "told"],
        120.0,
        12.0,
    ));
    tokens.extend(line(&LYRICS, 160.0, 12.0));
    let document = ChartBuilder::default().page(&tokens).bytes();

    let result = convert(&document, "C", Some(Mode::Major));
    assert_eq!(result.chords_found, 2);
    assert_eq!(drawn_texts(&rendered(&result), 0), ["57", "1"]);
    // The rejections surface as non-fatal diagnostics
    assert!(result
        .errors
        .iter()
        .all(|e| e.kind == ErrorKind::ClassificationAmbiguity));
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn isolated_structural_chord_is_found() {
    let mut tokens = vec![token("G7", 72.0, 100.0, 12.0)];
    tokens.extend(line(&LYRICS, 300.0, 12.0));
    let document = ChartBuilder::default().page(&tokens).bytes();

    let result = convert(&document, "G", Some(Mode::Major));
    assert_eq!(result.chords_found, 1);
    assert_eq!(drawn_texts(&rendered(&result), 0), ["17"]);
}

#[test]
fn mode_is_inferred_from_a_minor_tonic() {
    let mut tokens = line(&["Am", "Dm", "Em", "F"], 100.0, 12.0);
    tokens.extend(line(&LYRICS, 120.0, 12.0));
    let document = ChartBuilder::default().page(&tokens).bytes();

    let result = convert(&document, "A", None);
    assert_eq!(result.mode, Mode::Minor);
    assert_eq!(drawn_texts(&rendered(&result), 0), ["1m", "4m", "5m", "6"]);
}

#[test]
fn pages_convert_independently_and_stay_in_order() {
    let mut first = line(&["C", "F"], 100.0, 12.0);
    first.extend(line(&LYRICS, 120.0, 12.0));
    let mut second = line(&["G", "Am", "C"], 100.0, 12.0);
    second.extend(line(&LYRICS, 120.0, 12.0));
    let document = ChartBuilder::default().page(&first).page(&second).bytes();

    let result = convert(&document, "C", Some(Mode::Major));
    assert_eq!(result.per_page_counts, vec![2, 3]);
    let document = rendered(&result);
    assert_eq!(document.pages.len(), 2);
    assert_eq!(document.pages[0].page_index, 0);
    assert_eq!(document.pages[1].page_index, 1);
    assert_eq!(drawn_texts(&document, 0), ["1", "4"]);
    assert_eq!(drawn_texts(&document, 1), ["5", "6m", "1"]);
}

#[test]
fn erase_rectangles_cover_the_original_chords() {
    let mut tokens = line(&["C", "Dm", "G7"], 100.0, 12.0);
    tokens.extend(line(&LYRICS, 130.0, 12.0));
    let document = ChartBuilder::default().page(&tokens).bytes();

    let result = convert(&document, "C", Some(Mode::Major));
    let document = rendered(&result);
    let rects: Vec<_> = document.pages[0]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::FillRect { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(rects.len(), 3);
    for (i, rect) in rects.iter().enumerate() {
        // Original boxes are 12pt tall and at least one glyph wide
        assert!(rect.area() >= 12.0 * 6.6, "erase {i} too small: {rect:?}");
    }
}

#[test]
fn unreadable_document_fails_with_extraction_error() {
    let err = pipeline()
        .convert(b"\x00\x01 not a chart", PitchClass::parse("C").unwrap(), None)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Extraction);
}

#[test]
fn textless_document_fails_with_unsupported_format() {
    // Parseable, but nowhere near enough text: reads as a scanned chart
    let document = ChartBuilder::default()
        .page(&line(&["C", "G"], 100.0, 12.0))
        .bytes();
    let err = pipeline()
        .convert(&document, PitchClass::parse("C").unwrap(), None)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnsupportedFormat);
}

#[test]
fn edge_chords_render_inside_the_page_bounds() {
    // A chord flush against the left edge: the padded erase clamps to the
    // page instead of tripping the sink's bounds check
    let mut tokens = vec![token("G7", 1.0, 100.0, 12.0)];
    tokens.extend(line(&LYRICS, 300.0, 12.0));
    let document = ChartBuilder::default().page(&tokens).bytes();

    let result = convert(&document, "C", Some(Mode::Major));
    assert_eq!(result.chords_found, 1);
    let document = rendered(&result);
    for op in &document.pages[0].ops {
        if let DrawOp::FillRect { rect, .. } = op {
            assert!(rect.x0 >= 0.0 && rect.x1 <= 612.0, "erase off page: {rect:?}");
        }
    }
    assert_eq!(drawn_texts(&document, 0), ["57"]);
}

#[test]
fn conversion_result_serializes_without_the_document_bytes() {
    let mut tokens = line(&["G7"], 100.0, 12.0);
    tokens.extend(line(&LYRICS, 120.0, 12.0));
    let document = ChartBuilder::default().page(&tokens).bytes();

    let result = convert(&document, "C", Some(Mode::Major));
    let value: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert!(value.get("converted_document_bytes").is_none());
    assert_eq!(value["chords_found"], 1);
    assert_eq!(value["mode"], "major");
    assert!(value.get("run_id").is_some());
}

#[test]
fn chart_files_round_trip_through_disk() {
    use std::io::Write;

    let mut tokens = line(&["C", "G"], 100.0, 12.0);
    tokens.extend(line(&LYRICS, 120.0, 12.0));
    let bytes = ChartBuilder::default().page(&tokens).bytes();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    let read_back = fs_err::read(file.path()).unwrap();

    let result = convert(&read_back, "C", Some(Mode::Major));
    assert_eq!(result.chords_found, 2);
}
