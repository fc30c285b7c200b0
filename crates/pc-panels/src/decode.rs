use pc_core::{Image, RasterImage};

use crate::SegmentError;

/// Decodes any format the `image` crate recognises into an RGB raster.
/// Alpha is discarded.
pub fn decode_raster(bytes: &[u8]) -> Result<RasterImage, SegmentError> {
    let rgb = image::load_from_memory(bytes)
        .map_err(SegmentError::Decode)?
        .to_rgb8();
    let (width, height) = rgb.dimensions();

    let data = rgb
        .into_raw()
        .chunks_exact(3)
        .map(|px| [px[0], px[1], px[2]])
        .collect();

    Ok(Image::from_vec(width as usize, height as usize, data)?)
}
