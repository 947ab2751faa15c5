//! Debug tool to dump extracted tokens and classifier verdicts for a chart.
//!
//! Usage:
//!   `cargo run --bin dump_chart -- <file.chart.json>`
//!   `cargo run --bin dump_chart -- <file.chart.json> --json`
//!
//! This tool shows how each token on each page classifies, for debugging
//! missed or misidentified chords.

// Development/debug binary - allow expect/unwrap for simpler error handling
#![allow(clippy::expect_used, clippy::unwrap_used)]

use nashflow::chart::Page;
use nashflow::classify::{classify_page, PageClassification, Verdict};
use nashflow::config::Config;
use nashflow::ingest::json::JsonChartSource;
use nashflow::ingest::DocumentSource;
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <file.chart.json> [--json]", args[0]);
        process::exit(1);
    }

    let config = Config::load();
    let document = fs_err::read(&args[1]).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {e}", args[1]);
        process::exit(1);
    });
    let pages = JsonChartSource::new(config.ingest.clone())
        .extract(&document)
        .unwrap_or_else(|e| {
            eprintln!("Failed to extract {}: {e}", args[1]);
            process::exit(1);
        });

    let classified: Vec<PageClassification> = pages
        .iter()
        .map(|page| classify_page(page, &config.classifier))
        .collect();

    if args.contains(&"--json".to_string()) {
        dump_json(&pages, &classified);
    } else {
        dump_pages(&pages, &classified);
    }
}

fn dump_json(pages: &[Page], classified: &[PageClassification]) {
    let report: Vec<serde_json::Value> = pages
        .iter()
        .zip(classified)
        .map(|(page, classification)| {
            serde_json::json!({
                "tokens": page.tokens,
                "verdicts": classification.verdicts,
                "accepted": classification.accepted,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}

fn dump_pages(pages: &[Page], classified: &[PageClassification]) {
    for (index, (page, classification)) in pages.iter().zip(classified).enumerate() {
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!(
            "║ Page {index}: {} tokens, {} chords accepted",
            page.tokens.len(),
            classification.accepted.len()
        );
        println!("╚══════════════════════════════════════════════════════════════════╝");

        for (i, (token, verdict)) in
            page.tokens.iter().zip(&classification.verdicts).enumerate()
        {
            let is_last = i == page.tokens.len() - 1;
            let prefix = if is_last { "└" } else { "├" };
            let label = match verdict {
                Verdict::Accepted { chord } => format!("CHORD {chord}"),
                Verdict::RejectedAmbiguous => "ambiguous".to_string(),
                Verdict::RejectedPatternMismatch => "not a chord".to_string(),
            };
            let quoted = format!("'{}'", token.text);
            println!(
                "{prefix}─ {quoted:<12} ({:6.1}, {:6.1}) {:>5.1}pt {:<16} {label}",
                token.bbox.x0,
                token.bbox.y0,
                token.font_size,
                token.font_name,
            );
        }
        println!();
    }
}
