use pc_contour::{ContourArena, ContourId};
use pc_core::Rect;
use serde::Serialize;

use crate::CandidateConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateBox {
    pub rect: Rect,
    pub score: f64,
    pub contour: ContourId,
}

/// Keeps contours whose bounding box is a plausible panel size.
///
/// A box of area `a` on a page of area `A` passes when
/// `min_area_ratio * A < a < max_area_ratio * A`. Its score is `a`, plus
/// `parent_bonus_ratio * A` for contours nested in another one (the inner
/// edge of a drawn frame). Output keeps arena order.
pub fn select_candidates(arena: &ContourArena, cfg: &CandidateConfig) -> Vec<CandidateBox> {
    let page_area = (arena.width * arena.height) as f64;
    let min_area = cfg.min_area_ratio * page_area;
    let max_area = cfg.max_area_ratio * page_area;
    let bonus = cfg.parent_bonus_ratio * page_area;

    arena
        .iter()
        .filter_map(|node| {
            let area = node.bbox.area() as f64;
            if area <= min_area || area >= max_area {
                return None;
            }

            let score = if node.has_parent() { area + bonus } else { area };
            Some(CandidateBox {
                rect: node.bbox,
                score,
                contour: node.id,
            })
        })
        .collect()
}
