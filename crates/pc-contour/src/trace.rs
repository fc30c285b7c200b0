use pc_core::{ImageView, Rect};
use serde::{Deserialize, Serialize};

use crate::arena::{BorderKind, ContourArena, ContourId, ContourNode};

// Direction 0 is east; increasing direction turns counter-clockwise on screen
// (y grows downward).
const DX: [isize; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [isize; 8] = [0, -1, -1, -1, 0, 1, 1, 1];
const EAST: u8 = 0;
const WEST: u8 = 4;

/// Label of the virtual hole surrounding the whole image.
const FRAME_NBD: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Hierarchy {
    /// Outer borders are roots; each hole is a child of the outer border of
    /// the component that bounds it.
    #[default]
    TwoLevel,
    /// Full containment tree: outer borders of components nested inside a
    /// hole become children of that hole.
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceConfig {
    pub hierarchy: Hierarchy,
}

#[derive(Debug, Clone, Copy)]
struct Border {
    kind: BorderKind,
    parent: Option<i32>,
}

/// Traces every border of the non-zero components of `mask`.
///
/// Uses topological border following with 8-connected foreground; pixels
/// outside the image count as background. Contours are numbered in raster
/// discovery order, so the result is deterministic for a given mask.
pub fn trace_contours(mask: &ImageView<'_, u8>, cfg: &TraceConfig) -> ContourArena {
    let (width, height) = (mask.width(), mask.height());
    if width == 0 || height == 0 {
        return ContourArena {
            width,
            height,
            nodes: Vec::new(),
        };
    }

    // One pixel of zero padding keeps every neighbour lookup in bounds.
    let stride = width + 2;
    let mut labels = vec![0_i32; stride * (height + 2)];
    for y in 0..height {
        for (x, &v) in mask.row(y).iter().enumerate() {
            if v != 0 {
                labels[(y + 1) * stride + x + 1] = 1;
            }
        }
    }

    let offsets = neighbor_offsets(stride);

    let mut borders = vec![Border {
        kind: BorderKind::Hole,
        parent: None,
    }];
    let mut traced: Vec<Vec<usize>> = Vec::new();
    let mut nbd = FRAME_NBD;

    for y in 1..=height {
        let mut lnbd = FRAME_NBD;
        for x in 1..=width {
            let p = y * stride + x;
            let v = labels[p];
            if v == 0 {
                continue;
            }

            let start = if v == 1 && labels[p - 1] == 0 {
                Some((BorderKind::Outer, WEST))
            } else if v >= 1 && labels[p + 1] == 0 {
                if v > 1 {
                    lnbd = v;
                }
                Some((BorderKind::Hole, EAST))
            } else {
                None
            };

            if let Some((kind, from_dir)) = start {
                nbd += 1;
                let prev = borders[(lnbd - 1) as usize];
                let parent = if prev.kind == kind {
                    prev.parent
                } else {
                    Some(lnbd)
                };

                borders.push(Border { kind, parent });
                traced.push(follow_border(&mut labels, &offsets, p, from_dir, nbd));
            }

            let v = labels[p];
            if v != 1 {
                lnbd = v.abs();
            }
        }
    }

    let mut nodes = Vec::with_capacity(traced.len());
    for (id, path) in traced.into_iter().enumerate() {
        let border = borders[id + 1];
        let parent = match (cfg.hierarchy, border.kind) {
            (Hierarchy::TwoLevel, BorderKind::Outer) => None,
            _ => border.parent.and_then(contour_id_of),
        };

        let points: Vec<(usize, usize)> = path
            .iter()
            .map(|&p| (p % stride - 1, p / stride - 1))
            .collect();

        nodes.push(ContourNode {
            id,
            kind: border.kind,
            bbox: bounding_box(&points),
            points,
            parent,
            first_child: None,
            next_sibling: None,
        });
    }

    let mut arena = ContourArena {
        width,
        height,
        nodes,
    };
    arena.link_children();
    arena
}

/// Follows one border starting at `start`, whose background neighbour lies in
/// direction `from_dir`. Marks visited pixels with `nbd` (or `-nbd` when the
/// east neighbour is background) and returns the padded indices in order.
fn follow_border(
    labels: &mut [i32],
    offsets: &[isize; 8],
    start: usize,
    from_dir: u8,
    nbd: i32,
) -> Vec<usize> {
    // Clockwise scan from the background neighbour for the first set pixel.
    let Some(first_dir) = (0..8u8)
        .map(|k| (from_dir + 8 - k) & 7)
        .find(|&d| labels[step(start, offsets, d)] != 0)
    else {
        labels[start] = -nbd;
        return vec![start];
    };

    let first = step(start, offsets, first_dir);
    let mut points = Vec::new();
    let mut current = start;
    let mut back_dir = first_dir;

    loop {
        let mut dir = back_dir;
        let mut east_is_background = false;
        let next = loop {
            dir = (dir + 1) & 7;
            let q = step(current, offsets, dir);
            if labels[q] != 0 {
                break q;
            }
            if dir == EAST {
                east_is_background = true;
            }
        };

        if east_is_background {
            labels[current] = -nbd;
        } else if labels[current] == 1 {
            labels[current] = nbd;
        }
        points.push(current);

        if next == start && current == first {
            break;
        }

        back_dir = (dir + 4) & 7;
        current = next;
    }

    points
}

#[inline]
fn step(p: usize, offsets: &[isize; 8], dir: u8) -> usize {
    p.wrapping_add_signed(offsets[dir as usize])
}

fn neighbor_offsets(stride: usize) -> [isize; 8] {
    let mut out = [0_isize; 8];
    for (d, o) in out.iter_mut().enumerate() {
        *o = DY[d] * stride as isize + DX[d];
    }
    out
}

#[inline]
fn contour_id_of(nbd: i32) -> Option<ContourId> {
    usize::try_from(nbd - FRAME_NBD - 1).ok()
}

fn bounding_box(points: &[(usize, usize)]) -> Rect {
    let mut min_x = usize::MAX;
    let mut min_y = usize::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    Rect::from_inclusive(min_x, min_y, max_x, max_y)
}
