use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{GrayImage, Rgb, RgbImage};
use panelcut::{
    ContourArena, EncodeOptions, Hierarchy, Image, RasterImage, Rect, SegmentConfig, Segmenter,
    TraceConfig, decode_raster, trace_contours,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "panelcut")]
#[command(about = "Split comic pages into panels and inspect intermediate stages")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Segment pages and write one encoded file per panel.
    #[command(name = "segment")]
    Segment(SegmentArgs),
    /// Write the closed edge map of a page.
    #[command(name = "edges")]
    Edges(EdgesArgs),
    /// Write traced contours and an overlay of the detected panel boxes.
    #[command(name = "contours")]
    Contours(ContoursArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, default_value = "out/panels")]
    out: PathBuf,
    /// JSON file with a (possibly partial) segmentation config.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct SegmentArgs {
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value = "webp")]
    format: String,
    #[arg(long, default_value_t = 80, allow_negative_numbers = true)]
    quality: i64,
}

#[derive(Args, Debug, Clone)]
struct EdgesArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
struct ContoursArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, value_enum, default_value_t = HierarchyArg::TwoLevel)]
    hierarchy: HierarchyArg,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum HierarchyArg {
    TwoLevel,
    Tree,
}

impl From<HierarchyArg> for Hierarchy {
    fn from(arg: HierarchyArg) -> Self {
        match arg {
            HierarchyArg::TwoLevel => Hierarchy::TwoLevel,
            HierarchyArg::Tree => Hierarchy::Tree,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct PanelDto {
    index: usize,
    rect: Rect,
    file: Option<String>,
    bytes: usize,
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaSegment<'a> {
    input: String,
    format: &'static str,
    mime_type: &'static str,
    quality: u8,
    panels: Vec<PanelDto>,
    config: &'a SegmentConfig,
}

#[derive(Debug, Clone, Serialize)]
struct MetaEdges<'a> {
    width: usize,
    height: usize,
    edge_pixels: usize,
    pixel_rule: &'static str,
    config: &'a SegmentConfig,
}

#[derive(Debug, Clone, Serialize)]
struct MetaContours {
    hierarchy: Hierarchy,
    contour_count: usize,
    holes: usize,
    roots: usize,
    panel_boxes: Vec<Rect>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Segment(args) => run_segment(args),
        Command::Edges(args) => run_edges(args),
        Command::Contours(args) => run_contours(args),
    }
}

fn run_segment(args: SegmentArgs) -> Result<()> {
    let opts = EncodeOptions::parse(&args.format, args.quality)?;
    let segmenter = Segmenter::new(load_config(args.common.config.as_deref())?);
    ensure_unique_stems(&args.input)?;

    let results: Vec<Result<usize>> = args
        .input
        .par_iter()
        .map(|input| segment_file(&segmenter, input, &args.common.out, &opts))
        .collect();

    let mut failed = 0;
    for (input, result) in args.input.iter().zip(results) {
        match result {
            Ok(panels) => info!(input = %input.display(), panels, "segmented page"),
            Err(err) => {
                error!(input = %input.display(), "{err:#}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} inputs failed.", args.input.len());
    }
    Ok(())
}

fn segment_file(
    segmenter: &Segmenter,
    input: &Path,
    out: &Path,
    opts: &EncodeOptions,
) -> Result<usize> {
    let page_bytes = read_input(input)?;
    let outcomes = segmenter
        .segment(&page_bytes, opts)
        .with_context(|| format!("segmenting {}", input.display()))?;

    let case_dir = prepare_case_dir(out, input)?;
    let mut panels = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        let dto = match &outcome.result {
            Ok(encoded) => {
                let name = format!("panel_{}.{}", outcome.index, opts.format.extension());
                let path = case_dir.join(&name);
                fs::write(&path, encoded)
                    .with_context(|| format!("writing panel {}", path.display()))?;
                PanelDto {
                    index: outcome.index,
                    rect: outcome.rect,
                    file: Some(name),
                    bytes: encoded.len(),
                    error: None,
                }
            }
            Err(err) => PanelDto {
                index: outcome.index,
                rect: outcome.rect,
                file: None,
                bytes: 0,
                error: Some(err.to_string()),
            },
        };
        panels.push(dto);
    }

    let written = panels.iter().filter(|p| p.file.is_some()).count();
    write_json(
        case_dir.join("meta.json"),
        &MetaSegment {
            input: input.display().to_string(),
            format: opts.format.name(),
            mime_type: opts.format.mime_type(),
            quality: opts.quality.get(),
            panels,
            config: segmenter.config(),
        },
    )?;

    Ok(written)
}

fn run_edges(args: EdgesArgs) -> Result<()> {
    let segmenter = Segmenter::new(load_config(args.common.config.as_deref())?);
    let page = load_page(&args.input)?;
    let case_dir = prepare_case_dir(&args.common.out, &args.input)?;

    let edges = segmenter.edge_map(&page);
    save_mask(case_dir.join("edges.png"), &edges)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaEdges {
            width: edges.width(),
            height: edges.height(),
            edge_pixels: edges.count_set(),
            pixel_rule: "edge pixel iff value == 255",
            config: segmenter.config(),
        },
    )?;

    Ok(())
}

fn run_contours(args: ContoursArgs) -> Result<()> {
    let segmenter = Segmenter::new(load_config(args.common.config.as_deref())?);
    let page = load_page(&args.input)?;
    let case_dir = prepare_case_dir(&args.common.out, &args.input)?;

    let hierarchy = Hierarchy::from(args.hierarchy);
    let edges = segmenter.edge_map(&page);
    let arena = trace_contours(&edges.as_view(), &TraceConfig { hierarchy });
    let boxes = segmenter.detect(&page);

    write_json(case_dir.join("contours.json"), &arena)?;

    let overlay = render_box_overlay(&page, &arena, &boxes)?;
    overlay
        .save(case_dir.join("overlay.png"))
        .context("writing contours overlay.png")?;

    write_json(
        case_dir.join("meta.json"),
        &MetaContours {
            hierarchy,
            contour_count: arena.len(),
            holes: arena.num_holes(),
            roots: arena.roots().count(),
            panel_boxes: boxes,
        },
    )?;

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SegmentConfig> {
    match path {
        Some(path) => {
            ensure_file_exists(path, "config")?;
            read_json(path)
        }
        None => Ok(SegmentConfig::default()),
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    ensure_file_exists(path, "input")?;
    fs::read(path).with_context(|| format!("reading input image {}", path.display()))
}

fn load_page(path: &Path) -> Result<RasterImage> {
    let bytes = read_input(path)?;
    decode_raster(&bytes).with_context(|| format!("decoding input image {}", path.display()))
}

/// Inputs map to `<out>/<stem>`, so two inputs sharing a stem would write
/// into the same directory.
fn ensure_unique_stems(inputs: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<&OsStr, &Path> = HashMap::new();
    for input in inputs {
        let Some(stem) = input.file_stem() else {
            continue;
        };
        if let Some(prev) = seen.insert(stem, input) {
            bail!(
                "inputs {} and {} share the output directory name {:?}",
                prev.display(),
                input.display(),
                stem
            );
        }
    }
    Ok(())
}

/// `<out>/<input stem>`, created if missing.
fn prepare_case_dir(out: &Path, input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("input path has no file name: {}", input.display()))?;
    let case_dir = out.join(stem);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;
    Ok(case_dir)
}

fn save_mask(path: PathBuf, mask: &Image<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(
        mask.width() as u32,
        mask.height() as u32,
        mask.data().to_vec(),
    )
    .context("constructing GrayImage from edge map")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn to_rgb_image(page: &RasterImage) -> Result<RgbImage> {
    RgbImage::from_raw(
        page.width() as u32,
        page.height() as u32,
        page.data().as_flattened().to_vec(),
    )
    .context("constructing RgbImage from page raster")
}

/// Source page with contour boxes in blue and kept panel boxes in red.
fn render_box_overlay(
    page: &RasterImage,
    arena: &ContourArena,
    boxes: &[Rect],
) -> Result<RgbImage> {
    let mut rgb = to_rgb_image(page)?;

    for node in arena.iter() {
        draw_rect(&mut rgb, node.bbox, 1, Rgb([64, 96, 255]));
    }
    for &rect in boxes {
        draw_rect(&mut rgb, rect, 3, Rgb([255, 48, 48]));
    }

    Ok(rgb)
}

fn draw_rect(img: &mut RgbImage, rect: Rect, thickness: usize, color: Rgb<u8>) {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let r = rect.clamp_to(w, h);
    if r.is_empty() {
        return;
    }

    let t = thickness.min(r.w).min(r.h);
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            let on_edge =
                x < r.x + t || x >= r.right() - t || y < r.y + t || y >= r.bottom() - t;
            if on_edge {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
