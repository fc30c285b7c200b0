use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use pc_core::RasterImage;
use serde::{Deserialize, Serialize};

use crate::{PanelEncodeError, SegmentError};

pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;
pub const DEFAULT_QUALITY: u8 = 80;

/// libwebp effort, 0 (fast) to 6 (smallest output).
const WEBP_METHOD: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    WebP,
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::WebP => "image/webp",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = SegmentError;

    /// Case-insensitive; `jpg` is accepted for JPEG.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webp" => Ok(Self::WebP),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(SegmentError::UnsupportedFormat(s.to_owned())),
        }
    }
}

/// Encoder quality in `1..=100`. Out-of-range requests are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Quality(u8);

impl Quality {
    pub fn new(requested: i64) -> Self {
        Self(requested.clamp(MIN_QUALITY.into(), MAX_QUALITY.into()) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_QUALITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EncodeOptions {
    pub format: OutputFormat,
    pub quality: Quality,
}

impl EncodeOptions {
    /// Validates `format` and clamps `quality`.
    pub fn parse(format: &str, quality: i64) -> Result<Self, SegmentError> {
        Ok(Self {
            format: format.parse()?,
            quality: Quality::new(quality),
        })
    }
}

/// Encodes one panel crop.
///
/// WebP is lossy at the requested quality with maximum effort. JPEG uses
/// optimized progressive coding without chroma subsampling. PNG is lossless;
/// quality only selects compression effort.
pub fn encode_panel(crop: &RasterImage, opts: &EncodeOptions) -> Result<Vec<u8>, PanelEncodeError> {
    let too_large = || PanelEncodeError::TooLarge {
        width: crop.width(),
        height: crop.height(),
    };
    let width = u32::try_from(crop.width()).map_err(|_| too_large())?;
    let height = u32::try_from(crop.height()).map_err(|_| too_large())?;
    let rgb = crop.data().as_flattened();

    match opts.format {
        OutputFormat::WebP => encode_webp(rgb, width, height, opts.quality),
        OutputFormat::Jpeg => encode_jpeg(rgb, crop.width(), crop.height(), opts.quality),
        OutputFormat::Png => encode_png(rgb, width, height, opts.quality),
    }
}

fn encode_webp(
    rgb: &[u8],
    width: u32,
    height: u32,
    quality: Quality,
) -> Result<Vec<u8>, PanelEncodeError> {
    let mut config = webp::WebPConfig::new()
        .map_err(|()| PanelEncodeError::WebP("libwebp rejected its default config".to_owned()))?;
    config.lossless = 0;
    config.quality = f32::from(quality.get());
    config.method = WEBP_METHOD;

    let encoded = webp::Encoder::from_rgb(rgb, width, height)
        .encode_advanced(&config)
        .map_err(|e| PanelEncodeError::WebP(format!("{e:?}")))?;

    Ok(encoded.to_vec())
}

fn encode_jpeg(
    rgb: &[u8],
    width: usize,
    height: usize,
    quality: Quality,
) -> Result<Vec<u8>, PanelEncodeError> {
    // libjpeg reports fatal errors by unwinding out of the encoder.
    let encoded = panic::catch_unwind(AssertUnwindSafe(|| -> std::io::Result<Vec<u8>> {
        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width, height);
        comp.set_quality(f32::from(quality.get()));
        comp.set_optimize_coding(true);
        comp.set_progressive_mode();
        for component in comp.components_mut() {
            component.h_samp_factor = 1;
            component.v_samp_factor = 1;
        }

        let mut started = comp.start_compress(Vec::new())?;
        started.write_scanlines(rgb)?;
        started.finish()
    }))
    .map_err(|_| PanelEncodeError::JpegAborted)?;

    Ok(encoded?)
}

/// Maps quality onto a zlib-style effort level `round(9 * (100 - q) / 100)`,
/// then onto the encoder's presets.
fn png_compression(quality: Quality) -> CompressionType {
    let level = (9.0 * f64::from(MAX_QUALITY - quality.get()) / 100.0).round() as u8;
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn encode_png(
    rgb: &[u8],
    width: u32,
    height: u32,
    quality: Quality,
) -> Result<Vec<u8>, PanelEncodeError> {
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, png_compression(quality), FilterType::Adaptive)
        .write_image(rgb, width, height, ExtendedColorType::Rgb8)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use image::codecs::png::CompressionType;
    use pc_core::{Image, RasterImage};

    use super::{EncodeOptions, OutputFormat, Quality, encode_panel, png_compression};
    use crate::PanelEncodeError;

    fn textured(w: usize, h: usize) -> RasterImage {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push([(x * 4) as u8, (y * 4) as u8, ((x * y + 3 * x) % 256) as u8]);
            }
        }
        Image::from_vec(w, h, data).expect("valid image")
    }

    fn encode(img: &RasterImage, format: OutputFormat, quality: i64) -> Vec<u8> {
        let opts = EncodeOptions {
            format,
            quality: Quality::new(quality),
        };
        encode_panel(img, &opts).expect("encodable panel")
    }

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!("WebP".parse::<OutputFormat>().ok(), Some(OutputFormat::WebP));
        assert_eq!("JPG".parse::<OutputFormat>().ok(), Some(OutputFormat::Jpeg));
        assert_eq!("jpeg".parse::<OutputFormat>().ok(), Some(OutputFormat::Jpeg));
        assert_eq!("Png".parse::<OutputFormat>().ok(), Some(OutputFormat::Png));

        let err = "gif".parse::<OutputFormat>().expect_err("unsupported");
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("gif"));
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(Quality::new(-5).get(), 1);
        assert_eq!(Quality::new(0).get(), 1);
        assert_eq!(Quality::new(55).get(), 55);
        assert_eq!(Quality::new(500).get(), 100);
        assert_eq!(Quality::default().get(), 80);

        let opts = EncodeOptions::parse("jpg", 1000).expect("valid options");
        assert_eq!(opts.format, OutputFormat::Jpeg);
        assert_eq!(opts.quality.get(), 100);
    }

    #[test]
    fn webp_rejects_oversized_panel() {
        // libwebp caps each dimension at 16383 pixels.
        let wide = Image::new_fill(17_000, 4, [200u8, 100, 50]);
        let opts = EncodeOptions {
            format: OutputFormat::WebP,
            quality: Quality::new(80),
        };

        let err = encode_panel(&wide, &opts).expect_err("too wide for webp");
        assert!(matches!(err, PanelEncodeError::WebP(_)), "{err:?}");
    }

    #[test]
    fn png_effort_follows_quality() {
        let level = |q| png_compression(Quality::new(q));
        assert!(matches!(level(100), CompressionType::Fast));
        assert!(matches!(level(80), CompressionType::Fast));
        assert!(matches!(level(70), CompressionType::Default));
        assert!(matches!(level(30), CompressionType::Default));
        assert!(matches!(level(20), CompressionType::Best));
        assert!(matches!(level(1), CompressionType::Best));
    }

    #[test]
    fn outputs_carry_format_signatures() {
        let img = textured(48, 32);

        let webp = encode(&img, OutputFormat::WebP, 80);
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");

        let jpeg = encode(&img, OutputFormat::Jpeg, 80);
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);

        let png = encode(&img, OutputFormat::Png, 80);
        assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn lossy_size_grows_with_quality() {
        let img = textured(64, 64);
        for format in [OutputFormat::WebP, OutputFormat::Jpeg] {
            let low = encode(&img, format, 5);
            let high = encode(&img, format, 95);
            assert!(low.len() < high.len(), "{format}: {} >= {}", low.len(), high.len());
        }
    }

    #[test]
    fn png_is_lossless() {
        let img = textured(33, 17);
        let bytes = encode(&img, OutputFormat::Png, 1);

        let decoded = image::load_from_memory(&bytes).expect("decodable").to_rgb8();
        assert_eq!(decoded.dimensions(), (33, 17));
        assert_eq!(decoded.as_raw().as_slice(), img.data().as_flattened());
    }
}
