//! Foundational raster primitives for comic panel segmentation.
//!
//! ## Images and Views
//! [`Image`] owns a row-major buffer of pixels. [`ImageView`] borrows one and
//! carries an element stride (distance, in elements, between adjacent row
//! starts), so crops of a larger image are views without copying.
//!
//! ## Pixels
//! Colour rasters are `Image<[u8; 3]>` in RGB order ([`RasterImage`]). Masks
//! and grayscale images are `Image<u8>`; masks use `0` for background and
//! `255` for set pixels.
//!
//! ## Rectangles
//! [`Rect`] is an axis-aligned box in pixel units with exclusive right and
//! bottom edges (`x + w`, `y + h`).

mod color;
mod error;
mod geom;
mod image;

pub use color::{luma_u8, mean_column_luma, to_luma};
pub use error::Error;
pub use geom::Rect;
pub use image::{Image, ImageView, RasterImage};
