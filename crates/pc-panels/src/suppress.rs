use crate::{CandidateBox, SuppressConfig};

/// Greedy non-maximum suppression over candidate boxes.
///
/// Candidates are visited by descending score; equal scores keep their input
/// order. A candidate is dropped when its overlap with any already accepted
/// box exceeds `max_overlap_ratio` of the candidate's own area. At most
/// `max_panels` boxes are accepted, in acceptance order.
pub fn suppress_overlaps(
    mut candidates: Vec<CandidateBox>,
    cfg: &SuppressConfig,
) -> Vec<CandidateBox> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<CandidateBox> = Vec::with_capacity(cfg.max_panels.min(candidates.len()));
    for cand in candidates {
        if kept.len() >= cfg.max_panels {
            break;
        }

        let own_area = cand.rect.area() as f64;
        let overlaps = kept.iter().any(|k| {
            cand.rect.intersection_area(&k.rect) as f64 > cfg.max_overlap_ratio * own_area
        });
        if !overlaps {
            kept.push(cand);
        }
    }

    kept
}
