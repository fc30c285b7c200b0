//! Binary morphology with square structuring elements.
//!
//! Pixels are treated as binary with threshold `> 0`.
//! Outputs are `0` or `255` in `u8`.
//!
//! A `radius` of `r` selects a `(2r + 1) x (2r + 1)` square. The square is
//! separable, so each operation runs as a horizontal then a vertical pass.
//! Neighbours outside the image are ignored rather than treated as background,
//! so erosion does not eat into mask content touching the image border.

use pc_core::{Image, ImageView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Dilate,
    Erode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

pub fn dilate_rect_binary_u8(src: &ImageView<'_, u8>, radius: usize) -> Image<u8> {
    morph_rect(src, radius, Op::Dilate)
}

pub fn erode_rect_binary_u8(src: &ImageView<'_, u8>, radius: usize) -> Image<u8> {
    morph_rect(src, radius, Op::Erode)
}

/// Dilation followed by erosion. Bridges gaps up to `2 * radius` pixels wide
/// without thickening isolated lines.
pub fn close_rect_binary_u8(src: &ImageView<'_, u8>, radius: usize) -> Image<u8> {
    let dilated = dilate_rect_binary_u8(src, radius);
    erode_rect_binary_u8(&dilated.as_view(), radius)
}

fn morph_rect(src: &ImageView<'_, u8>, radius: usize, op: Op) -> Image<u8> {
    let (w, h) = (src.width(), src.height());
    let mut binary = Vec::with_capacity(w * h);
    for y in 0..h {
        binary.extend(src.row(y).iter().map(|&v| v != 0));
    }

    if w == 0 || h == 0 || radius == 0 {
        return to_mask(&binary, w, h);
    }

    let pass = sweep(&binary, w, h, radius, op, Axis::Horizontal);
    let out = sweep(&pass, w, h, radius, op, Axis::Vertical);
    to_mask(&out, w, h)
}

fn to_mask(bits: &[bool], w: usize, h: usize) -> Image<u8> {
    let mut mask = Image::new_fill(w, h, 0u8);
    for (dst, &set) in mask.data_mut().iter_mut().zip(bits) {
        if set {
            *dst = 255;
        }
    }
    mask
}

fn sweep(src: &[bool], w: usize, h: usize, radius: usize, op: Op, axis: Axis) -> Vec<bool> {
    let mut out = vec![false; w * h];
    for y in 0..h {
        for x in 0..w {
            let (pos, len) = match axis {
                Axis::Horizontal => (x, w),
                Axis::Vertical => (y, h),
            };
            let lo = pos.saturating_sub(radius);
            let hi = (pos + radius).min(len - 1);

            let mut window = (lo..=hi).map(|i| match axis {
                Axis::Horizontal => src[y * w + i],
                Axis::Vertical => src[i * w + x],
            });

            out[y * w + x] = match op {
                Op::Dilate => window.any(|v| v),
                Op::Erode => window.all(|v| v),
            };
        }
    }

    out
}
