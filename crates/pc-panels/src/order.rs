use pc_core::Rect;

use crate::OrderConfig;

/// Row bucket height for a page of `height` pixels.
pub fn row_tolerance(height: usize, cfg: &OrderConfig) -> usize {
    let scaled = (cfg.row_tolerance_ratio * height as f64).round() as usize;
    scaled.max(cfg.min_row_tolerance).max(1)
}

/// Sorts boxes top-to-bottom, left-to-right.
///
/// Boxes whose top edges fall into the same `row_tolerance` bucket form a row
/// and are ordered by `x`. The sort is stable.
pub fn sort_reading_order(boxes: &mut [Rect], height: usize, cfg: &OrderConfig) {
    let tol = row_tolerance(height, cfg);
    boxes.sort_by_key(|r| ((r.y / tol) * tol, r.x));
}
