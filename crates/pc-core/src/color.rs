use crate::{Image, ImageView};

// BT.601 luma weights in Q14 fixed point.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Luminance of an RGB pixel, `0.299 R + 0.587 G + 0.114 B` rounded.
#[inline]
pub fn luma_u8(px: [u8; 3]) -> u8 {
    let [r, g, b] = px;
    let y = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT;
    ((y + (1 << (SHIFT - 1))) >> SHIFT) as u8
}

pub fn to_luma(img: &ImageView<'_, [u8; 3]>) -> Image<u8> {
    let mut out = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        out.extend(img.row(y).iter().map(|&px| luma_u8(px)));
    }

    Image::from_parts(img.width(), img.height(), out)
}

/// Mean luminance of column `x` over all rows of the view.
///
/// Returns `None` when `x` is outside the view or the view has no rows.
pub fn mean_column_luma(img: &ImageView<'_, [u8; 3]>, x: usize) -> Option<f32> {
    if x >= img.width() || img.height() == 0 {
        return None;
    }

    let sum: u64 = (0..img.height())
        .map(|y| luma_u8(img.row(y)[x]) as u64)
        .sum();
    Some(sum as f32 / img.height() as f32)
}
