use pc_core::{Image, RasterImage, to_luma};
use pc_edge::canny_u8;
use pc_morph::close_rect_binary_u8;

use crate::EdgeMapConfig;

/// Binary edge map of `image`: luma, edge detection, then closing so broken
/// frame lines form closed curves. Same size as the input, values `0`/`255`.
pub fn build_edge_map(image: &RasterImage, cfg: &EdgeMapConfig) -> Image<u8> {
    let gray = to_luma(&image.as_view());
    let edges = canny_u8(&gray.as_view(), &cfg.canny());
    close_rect_binary_u8(&edges.as_view(), cfg.close_radius)
}
