//! Chord classifier.
//!
//! Labels every token on a page as an accepted chord or a rejection, using
//! only position, size, and lexical shape. The tie-break on anything
//! ambiguous is to reject: a missed chord leaves the original symbol on the
//! page, a false positive corrupts lyrics.
//!
//! Classification is an ordered sequence of predicate checks over an
//! immutable view of the token plus page statistics (dominant font size,
//! line groupings). Bare note names (`A`, `Em`) pass only when something
//! beyond the grammar vouches for them: an off-dominant font size, a line
//! made up mostly of chord-shaped tokens, or an accepted chord next door.

use crate::chart::{Page, TextToken};
use crate::config::ClassifierConfig;
use crate::theory::chord::Chord;
use serde::Serialize;
use tracing::debug;

/// Classification confidence tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "verdict")]
pub enum Verdict {
    /// The token is a chord symbol.
    Accepted {
        /// The parsed chord structure.
        chord: Chord,
    },
    /// Grammar matched but context says lyric.
    RejectedAmbiguous,
    /// The token does not fit the chord grammar (or fails a structural
    /// gate: too long, font size outside the chord window).
    RejectedPatternMismatch,
}

/// A token the classifier accepted, with its parsed chord.
///
/// Immutable once created; later stages read it and produce new objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordToken {
    /// The underlying text token.
    pub token: TextToken,
    /// Parsed chord structure.
    pub chord: Chord,
}

/// Classifier output for one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageClassification {
    /// Accepted chord tokens, in token order.
    pub accepted: Vec<ChordToken>,
    /// Per-token verdicts, parallel to the page's token list.
    pub verdicts: Vec<Verdict>,
}

/// A horizontal band of tokens sharing a y position.
struct Line {
    /// Indices into the page's token list, sorted left to right.
    token_indices: Vec<usize>,
    /// Count of chord-shaped tokens on the line.
    chordlike: usize,
    /// Count of plain lyric words on the line.
    lyric_words: usize,
    /// Most frequent font size on the line.
    dominant_font_size: f64,
}

/// Page-level statistics the predicates consult.
struct PageStats {
    dominant_font_size: f64,
    lines: Vec<Line>,
    /// Line index for each token.
    line_of: Vec<usize>,
}

/// Classify every token on a page.
pub fn classify_page(page: &Page, config: &ClassifierConfig) -> PageClassification {
    let candidates: Vec<Option<Chord>> = page
        .tokens
        .iter()
        .map(|token| candidate(token, config))
        .collect();
    let stats = page_stats(page, &candidates, config);

    let mut verdicts: Vec<Verdict> = Vec::with_capacity(page.tokens.len());
    let mut accepted_flags = vec![false; page.tokens.len()];

    // First pass: gates, grammar, lyric-run context, and every match that
    // carries a structural marker. Bare note names stay undecided.
    let mut pending: Vec<usize> = Vec::new();
    for (index, token) in page.tokens.iter().enumerate() {
        let Some(chord) = &candidates[index] else {
            verdicts.push(Verdict::RejectedPatternMismatch);
            continue;
        };
        let line = &stats.lines[stats.line_of[index]];
        if embedded_in_lyric_run(token, line, config) {
            verdicts.push(Verdict::RejectedAmbiguous);
            continue;
        }
        if is_bare_note_name(trimmed(&token.text)) {
            // Decided in the second pass, once the strong matches are known
            verdicts.push(Verdict::RejectedAmbiguous);
            pending.push(index);
            continue;
        }
        accepted_flags[index] = true;
        verdicts.push(Verdict::Accepted { chord: chord.clone() });
    }

    // Second pass: bare note names, left to right within each line so
    // adjacency can chain along a chord line whatever order the extractor
    // emitted the tokens in.
    pending.sort_by(|&a, &b| {
        stats.line_of[a].cmp(&stats.line_of[b]).then_with(|| {
            page.tokens[a].bbox.x0.total_cmp(&page.tokens[b].bbox.x0)
        })
    });
    for &index in &pending {
        let token = &page.tokens[index];
        let line = &stats.lines[stats.line_of[index]];
        let off_dominant_font =
            (token.font_size - stats.dominant_font_size).abs() > config.font_size_delta;
        let on_chord_line = line.chordlike >= 2
            && ratio(line.chordlike, line.token_indices.len()) >= config.chord_line_ratio;
        let next_to_chord = has_accepted_neighbor(index, line, &accepted_flags);

        if off_dominant_font || on_chord_line || next_to_chord {
            accepted_flags[index] = true;
            if let Some(chord) = &candidates[index] {
                verdicts[index] = Verdict::Accepted { chord: chord.clone() };
            }
        }
    }

    let accepted: Vec<ChordToken> = page
        .tokens
        .iter()
        .zip(&verdicts)
        .filter_map(|(token, verdict)| match verdict {
            Verdict::Accepted { chord } => Some(ChordToken {
                token: token.clone(),
                chord: chord.clone(),
            }),
            _ => None,
        })
        .collect();

    debug!(
        tokens = page.tokens.len(),
        accepted = accepted.len(),
        lines = stats.lines.len(),
        "classified page"
    );

    PageClassification { accepted, verdicts }
}

/// Trim whitespace and the trailing punctuation extraction leaves attached.
fn trimmed(text: &str) -> &str {
    text.trim().trim_end_matches([',', '.', ';', ':'])
}

/// Structural gates plus the grammar test. `None` means pattern mismatch.
fn candidate(token: &TextToken, config: &ClassifierConfig) -> Option<Chord> {
    let text = trimmed(&token.text);
    if text.is_empty() || text.len() > config.max_chord_len {
        return None;
    }
    if token.font_size < config.min_font_size || token.font_size > config.max_font_size {
        return None;
    }
    Chord::parse(text)
}

/// A bare note name: one or two alphabetic characters (`A`, `Em`, `Ab`).
/// Anything carrying a digit, accidental, or slash is structurally a chord.
fn is_bare_note_name(text: &str) -> bool {
    text.len() <= 2 && text.chars().all(char::is_alphabetic)
}

/// A plain lyric word: purely alphabetic with at least one lowercase
/// letter, and not chord-shaped.
fn is_lyric_word(text: &str, is_candidate: bool) -> bool {
    !is_candidate
        && !text.is_empty()
        && text.chars().all(char::is_alphabetic)
        && text.chars().any(char::is_lowercase)
}

/// Lyric-run check: a grammar match sitting on a line of lyric words at the
/// line's dominant font size is a lyric itself.
fn embedded_in_lyric_run(token: &TextToken, line: &Line, config: &ClassifierConfig) -> bool {
    line.lyric_words > config.lyric_run_threshold
        && (token.font_size - line.dominant_font_size).abs() <= config.font_size_delta
}

/// Whether the token's left or right neighbor on its line is accepted.
fn has_accepted_neighbor(index: usize, line: &Line, accepted: &[bool]) -> bool {
    let Some(position) = line.token_indices.iter().position(|&i| i == index) else {
        return false;
    };
    let left = position
        .checked_sub(1)
        .and_then(|p| line.token_indices.get(p));
    let right = line.token_indices.get(position + 1);
    left.is_some_and(|&i| accepted[i]) || right.is_some_and(|&i| accepted[i])
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Most frequent value among font sizes, to a tenth of a point.
fn dominant_font_size(sizes: impl Iterator<Item = f64>) -> f64 {
    let mut counts: Vec<(i64, usize)> = Vec::new();
    for size in sizes {
        let bucket = (size * 10.0).round() as i64;
        match counts.iter_mut().find(|(b, _)| *b == bucket) {
            Some((_, n)) => *n += 1,
            None => counts.push((bucket, 1)),
        }
    }
    counts
        .iter()
        .max_by_key(|(_, n)| *n)
        .map_or(0.0, |(bucket, _)| *bucket as f64 / 10.0)
}

/// Group tokens into horizontal lines and compute their statistics.
fn page_stats(page: &Page, candidates: &[Option<Chord>], config: &ClassifierConfig) -> PageStats {
    let mut order: Vec<usize> = (0..page.tokens.len()).collect();
    order.sort_by(|&a, &b| {
        page.tokens[a]
            .bbox
            .center_y()
            .total_cmp(&page.tokens[b].bbox.center_y())
    });

    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut band_y = f64::NEG_INFINITY;
    for index in order {
        let y = page.tokens[index].bbox.center_y();
        if (y - band_y).abs() > config.line_tolerance || lines.is_empty() {
            lines.push(Vec::new());
        }
        band_y = y;
        if let Some(last) = lines.last_mut() {
            last.push(index);
        }
    }

    let mut line_of = vec![0_usize; page.tokens.len()];
    let lines: Vec<Line> = lines
        .into_iter()
        .enumerate()
        .map(|(line_index, mut token_indices)| {
            token_indices.sort_by(|&a, &b| {
                page.tokens[a].bbox.x0.total_cmp(&page.tokens[b].bbox.x0)
            });
            for &i in &token_indices {
                line_of[i] = line_index;
            }
            let chordlike = token_indices
                .iter()
                .filter(|&&i| candidates[i].is_some())
                .count();
            let lyric_words = token_indices
                .iter()
                .filter(|&&i| {
                    is_lyric_word(trimmed(&page.tokens[i].text), candidates[i].is_some())
                })
                .count();
            let dominant = dominant_font_size(
                token_indices.iter().map(|&i| page.tokens[i].font_size),
            );
            Line {
                token_indices,
                chordlike,
                lyric_words,
                dominant_font_size: dominant,
            }
        })
        .collect();

    PageStats {
        dominant_font_size: dominant_font_size(page.tokens.iter().map(|t| t.font_size)),
        lines,
        line_of,
    }
}
