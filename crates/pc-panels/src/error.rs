use thiserror::Error;

/// Failure of a whole segmentation request.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("unsupported output format '{0}' (expected webp, jpeg, jpg or png)")]
    UnsupportedFormat(String),
    #[error("input is not a decodable image")]
    Decode(#[source] image::ImageError),
    #[error("decoded raster is inconsistent")]
    Raster(#[from] pc_core::Error),
}

impl SegmentError {
    /// `true` when the caller sent bad input, as opposed to an internal
    /// failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_) | Self::Decode(_))
    }
}

/// Failure to encode a single panel. Other panels are unaffected.
#[derive(Debug, Error)]
pub enum PanelEncodeError {
    #[error("panel of {width}x{height} pixels exceeds encoder limits")]
    TooLarge { width: usize, height: usize },
    #[error("webp encoding failed: {0}")]
    WebP(String),
    #[error("jpeg encoding failed")]
    Jpeg(#[from] std::io::Error),
    #[error("jpeg encoder aborted")]
    JpegAborted,
    #[error("png encoding failed")]
    Png(#[from] image::ImageError),
}
