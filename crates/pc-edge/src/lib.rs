//! Binary edge maps for panel border detection.
//!
//! Coordinates follow the raster grid: mask pixel `(x, y)` marks an edge at
//! source pixel `(x, y)`.
//!
//! Detection is tuned for dark rule lines on light paper. Thresholds in
//! [`CannyConfig`] are absolute, so results are stable across pages scanned
//! with similar contrast.

pub mod canny;

pub use canny::{
    CannyConfig, CannyDetector, DEFAULT_HIGH_THRESH, DEFAULT_LOW_THRESH, SmoothKind, canny_u8,
};
