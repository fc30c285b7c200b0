use pc_contour::{TraceConfig, trace_contours};
use pc_core::{Image, RasterImage, Rect};
use tracing::{debug, warn};

use crate::{
    EncodeOptions, Panel, PanelEncodeError, SegmentConfig, SegmentError, build_edge_map,
    decode_raster, encode_panel, select_candidates, sort_reading_order, suppress_overlaps,
    trim_panel,
};

/// Result of encoding one detected panel.
#[derive(Debug)]
pub struct PanelOutcome {
    /// Position in reading order among the panels that survived trimming.
    pub index: usize,
    pub rect: Rect,
    pub result: Result<Vec<u8>, PanelEncodeError>,
}

/// Panel segmentation with a fixed configuration. Holds no per-request
/// state, so one instance can serve any number of pages concurrently.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    cfg: SegmentConfig,
}

impl Segmenter {
    pub fn new(cfg: SegmentConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.cfg
    }

    pub fn edge_map(&self, page: &RasterImage) -> Image<u8> {
        build_edge_map(page, &self.cfg.edges)
    }

    /// Panel boxes in reading order, before trimming.
    pub fn detect(&self, page: &RasterImage) -> Vec<Rect> {
        let edges = self.edge_map(page);
        let arena = trace_contours(&edges.as_view(), &TraceConfig::default());
        let candidates = select_candidates(&arena, &self.cfg.candidates);
        let num_candidates = candidates.len();

        let mut boxes: Vec<Rect> = suppress_overlaps(candidates, &self.cfg.suppress)
            .iter()
            .map(|c| c.rect)
            .collect();
        sort_reading_order(&mut boxes, page.height(), &self.cfg.order);

        debug!(
            width = page.width(),
            height = page.height(),
            edge_pixels = edges.count_set(),
            contours = arena.len(),
            candidates = num_candidates,
            kept = boxes.len(),
            "detected panel boxes"
        );
        boxes
    }

    /// Trimmed panels in reading order. Boxes that trim away to nothing are
    /// dropped.
    pub fn extract(&self, page: &RasterImage) -> Vec<Panel> {
        let boxes = self.detect(page);
        let num_boxes = boxes.len();

        let panels: Vec<Panel> = boxes
            .into_iter()
            .filter_map(|rect| trim_panel(page, rect, &self.cfg.trim))
            .collect();

        debug!(
            panels = panels.len(),
            dropped = num_boxes - panels.len(),
            "trimmed panels"
        );
        panels
    }

    /// Decodes `image_bytes` and encodes every panel, reporting each encode
    /// separately.
    pub fn segment(
        &self,
        image_bytes: &[u8],
        opts: &EncodeOptions,
    ) -> Result<Vec<PanelOutcome>, SegmentError> {
        let page = decode_raster(image_bytes)?;

        let outcomes = self
            .extract(&page)
            .into_iter()
            .enumerate()
            .map(|(index, panel)| {
                let result = encode_panel(&panel.crop, opts);
                if let Err(err) = &result {
                    warn!(index, format = %opts.format, error = %err, "panel encoding failed");
                }
                PanelOutcome {
                    index,
                    rect: panel.rect,
                    result,
                }
            })
            .collect();

        Ok(outcomes)
    }

    /// Encoded panels in reading order; panels that failed to encode are
    /// skipped.
    pub fn segment_encoded(
        &self,
        image_bytes: &[u8],
        opts: &EncodeOptions,
    ) -> Result<Vec<Vec<u8>>, SegmentError> {
        Ok(encoded_panels(self.segment(image_bytes, opts)?))
    }
}

/// Encoded bytes of the successful outcomes, keeping their order.
fn encoded_panels(outcomes: Vec<PanelOutcome>) -> Vec<Vec<u8>> {
    outcomes
        .into_iter()
        .filter_map(|outcome| outcome.result.ok())
        .collect()
}

/// Splits a comic page into at most four encoded panels in reading order.
///
/// `format` is one of `webp`, `jpeg` (or `jpg`) and `png`, case-insensitive,
/// and is checked before the image is decoded. `quality` is clamped to
/// `1..=100`. A page without detectable panels yields an empty list.
pub fn segment_panels(
    image_bytes: &[u8],
    format: &str,
    quality: i64,
) -> Result<Vec<Vec<u8>>, SegmentError> {
    let opts = EncodeOptions::parse(format, quality)?;
    Segmenter::default().segment_encoded(image_bytes, &opts)
}
