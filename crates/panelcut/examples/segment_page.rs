//! Example: segment one comic page and report what each stage found.
//!
//! Loads a page, runs detection and extraction with the default configuration,
//! and writes the encoded panels plus a JSON summary next to the input.
//! Per-stage timing is printed to stdout.
//!
//! Run from the workspace root:
//!   cargo run -p panelcut --example segment_page -- --help
//!   cargo run -p panelcut --example segment_page -- --input page.png

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use panelcut::{EncodeOptions, Rect, Segmenter, decode_raster, encode_panel};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "Split a comic page into panels and summarize the result")]
struct Args {
    /// Page image in any format the `image` crate decodes
    #[arg(long)]
    input: PathBuf,

    /// Output format: webp, jpeg (jpg) or png
    #[arg(long, default_value = "webp")]
    format: String,

    /// Encoder quality, clamped to 1..=100
    #[arg(long, default_value_t = 80, allow_negative_numbers = true)]
    quality: i64,
}

#[derive(Serialize)]
struct PanelSummary {
    index: usize,
    rect: Rect,
    bytes: usize,
    file: String,
}

#[derive(Serialize)]
struct PageSummary {
    width: usize,
    height: usize,
    detected: Vec<Rect>,
    panels: Vec<PanelSummary>,
    detect_ms: f64,
    extract_ms: f64,
    encode_ms: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let opts = EncodeOptions::parse(&args.format, args.quality)?;

    let bytes =
        std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let page =
        decode_raster(&bytes).with_context(|| format!("decoding {}", args.input.display()))?;
    println!(
        "loaded {}: {}x{}",
        args.input.display(),
        page.width(),
        page.height()
    );

    let segmenter = Segmenter::default();

    let t0 = Instant::now();
    let detected = segmenter.detect(&page);
    let detect_ms = t0.elapsed().as_secs_f64() * 1e3;
    println!("detected {} boxes ({detect_ms:.2} ms)", detected.len());

    let t0 = Instant::now();
    let panels = segmenter.extract(&page);
    let extract_ms = t0.elapsed().as_secs_f64() * 1e3;
    println!("extracted {} panels ({extract_ms:.2} ms)", panels.len());

    let stem = args
        .input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let dir = args.input.parent().unwrap_or(Path::new("."));

    let t0 = Instant::now();
    let mut summaries = Vec::with_capacity(panels.len());
    for (index, panel) in panels.iter().enumerate() {
        let encoded = encode_panel(&panel.crop, &opts)
            .with_context(|| format!("encoding panel {index}"))?;
        let file = format!("{stem}_panel_{index}.{}", opts.format.extension());
        std::fs::write(dir.join(&file), &encoded).with_context(|| format!("writing {file}"))?;

        println!(
            "  panel {index}: {:?} -> {} bytes",
            panel.rect,
            encoded.len()
        );
        summaries.push(PanelSummary {
            index,
            rect: panel.rect,
            bytes: encoded.len(),
            file,
        });
    }
    let encode_ms = t0.elapsed().as_secs_f64() * 1e3;

    let out_path = dir.join(format!("{stem}_panels.json"));
    let out_file = std::fs::File::create(&out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    serde_json::to_writer_pretty(
        out_file,
        &PageSummary {
            width: page.width(),
            height: page.height(),
            detected,
            panels: summaries,
            detect_ms,
            extract_ms,
            encode_ms,
        },
    )
    .with_context(|| format!("writing JSON to {}", out_path.display()))?;

    println!("summary written to {}", out_path.display());
    Ok(())
}
