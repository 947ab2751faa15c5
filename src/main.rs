//! `nashflow` - convert a chord chart to Nashville Number System notation.
//!
//! Usage:
//!   `nashflow <input.chart.json> <output.json> --key <C..B> [--mode major|minor|auto] [--pretty-result]`

// CLI binary - allow expect/unwrap for simpler error handling at the edges
#![allow(clippy::expect_used, clippy::unwrap_used)]

use nashflow::config::Config;
use nashflow::ingest::json::JsonChartSource;
use nashflow::pipeline::Pipeline;
use nashflow::render::fonts::FontTable;
use nashflow::render::json::JsonChartSink;
use nashflow::theory::{Mode, PitchClass};
use std::env;
use std::process;

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {program} <input.chart.json> <output.json> --key <C..B> \
         [--mode major|minor|auto] [--pretty-result]"
    );
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("nashflow", String::as_str);

    if args.len() < 3 {
        usage(program);
    }
    let input = &args[1];
    let output = &args[2];

    let mut key_root = None;
    let mut mode = None;
    let mut pretty_result = false;
    let mut rest = args[3..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--key" => {
                let value = rest.next().unwrap_or_else(|| usage(program));
                key_root = PitchClass::parse(value).or_else(|| {
                    eprintln!("Invalid key '{value}': expected a note A-G with optional # or b");
                    process::exit(1);
                });
            }
            "--mode" => {
                let value = rest.next().unwrap_or_else(|| usage(program));
                if value != "auto" {
                    mode = Mode::parse(value).or_else(|| {
                        eprintln!("Invalid mode '{value}': expected major, minor, or auto");
                        process::exit(1);
                    });
                }
            }
            "--pretty-result" => pretty_result = true,
            _ => usage(program),
        }
    }
    let Some(key_root) = key_root else {
        eprintln!("Missing required --key argument");
        usage(program);
    };

    let document = fs_err::read(input).unwrap_or_else(|e| {
        eprintln!("Failed to read {input}: {e}");
        process::exit(1);
    });

    let config = Config::load();
    let pipeline = Pipeline::new(
        JsonChartSource::new(config.ingest.clone()),
        JsonChartSink::new(),
        FontTable::default(),
        config,
    );

    let result = match pipeline.convert(&document, key_root, mode) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Conversion failed: {e}");
            process::exit(1);
        }
    };

    fs_err::write(output, &result.converted_document_bytes).unwrap_or_else(|e| {
        eprintln!("Failed to write {output}: {e}");
        process::exit(1);
    });

    if pretty_result {
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    } else {
        println!(
            "Converted {} of {} chords to key of {} {} in {}ms (run {})",
            result.chords_converted,
            result.chords_found,
            result.key,
            result.mode,
            result.elapsed_ms,
            result.run_id,
        );
        for (page, count) in result.per_page_counts.iter().enumerate() {
            println!("  page {page}: {count} chords");
        }
        for warning in &result.errors {
            println!("  note: {warning}");
        }
    }
}
