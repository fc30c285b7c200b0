use pc_edge::{CannyConfig, SmoothKind};
use serde::{Deserialize, Serialize};

pub use pc_edge::{DEFAULT_HIGH_THRESH, DEFAULT_LOW_THRESH};
/// Radius 2 selects a 5x5 closing element.
pub const DEFAULT_CLOSE_RADIUS: usize = 2;

pub const DEFAULT_MIN_AREA_RATIO: f64 = 0.03;
pub const DEFAULT_MAX_AREA_RATIO: f64 = 0.85;
pub const DEFAULT_PARENT_BONUS_RATIO: f64 = 0.10;

pub const DEFAULT_MAX_OVERLAP_RATIO: f64 = 0.30;
pub const DEFAULT_MAX_PANELS: usize = 4;

pub const DEFAULT_ROW_TOLERANCE_RATIO: f64 = 0.10;
pub const DEFAULT_MIN_ROW_TOLERANCE: usize = 10;

pub const DEFAULT_PAD_RATIO: f64 = 0.02;
pub const DEFAULT_MIN_PAD: usize = 6;
pub const DEFAULT_DARK_LUMA: f32 = 65.0;
pub const DEFAULT_TRIM_ITERATIONS: usize = 10;
pub const DEFAULT_MIN_TRIM_WIDTH: usize = 20;

/// Tunables for every segmentation stage. Missing fields in a serialized
/// config fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub edges: EdgeMapConfig,
    pub candidates: CandidateConfig,
    pub suppress: SuppressConfig,
    pub order: OrderConfig,
    pub trim: TrimConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeMapConfig {
    pub smooth: SmoothKind,
    pub low_thresh: f32,
    pub high_thresh: f32,
    pub close_radius: usize,
}

impl Default for EdgeMapConfig {
    fn default() -> Self {
        Self {
            smooth: SmoothKind::Gaussian5,
            low_thresh: DEFAULT_LOW_THRESH,
            high_thresh: DEFAULT_HIGH_THRESH,
            close_radius: DEFAULT_CLOSE_RADIUS,
        }
    }
}

impl EdgeMapConfig {
    pub fn canny(&self) -> CannyConfig {
        CannyConfig {
            smooth: self.smooth,
            low_thresh: self.low_thresh,
            high_thresh: self.high_thresh,
        }
    }
}

/// Area band and scoring, as fractions of the page area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub min_area_ratio: f64,
    pub max_area_ratio: f64,
    pub parent_bonus_ratio: f64,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: DEFAULT_MIN_AREA_RATIO,
            max_area_ratio: DEFAULT_MAX_AREA_RATIO,
            parent_bonus_ratio: DEFAULT_PARENT_BONUS_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressConfig {
    /// Largest tolerated overlap, as a fraction of the candidate's own area.
    pub max_overlap_ratio: f64,
    pub max_panels: usize,
}

impl Default for SuppressConfig {
    fn default() -> Self {
        Self {
            max_overlap_ratio: DEFAULT_MAX_OVERLAP_RATIO,
            max_panels: DEFAULT_MAX_PANELS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Row bucket height as a fraction of the page height.
    pub row_tolerance_ratio: f64,
    pub min_row_tolerance: usize,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            row_tolerance_ratio: DEFAULT_ROW_TOLERANCE_RATIO,
            min_row_tolerance: DEFAULT_MIN_ROW_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// Inward pad as a fraction of the box size on that axis.
    pub pad_ratio: f64,
    pub min_pad: usize,
    /// Columns with mean luma below this are frame remnants.
    pub dark_luma: f32,
    pub max_iterations: usize,
    /// Columns are only removed while the crop is wider than this.
    pub min_width: usize,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            pad_ratio: DEFAULT_PAD_RATIO,
            min_pad: DEFAULT_MIN_PAD,
            dark_luma: DEFAULT_DARK_LUMA,
            max_iterations: DEFAULT_TRIM_ITERATIONS,
            min_width: DEFAULT_MIN_TRIM_WIDTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use pc_edge::CannyConfig;

    use super::{DEFAULT_MAX_PANELS, DEFAULT_MIN_PAD, EdgeMapConfig, SegmentConfig};

    #[test]
    fn edge_defaults_match_detector_defaults() {
        assert_eq!(EdgeMapConfig::default().canny(), CannyConfig::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SegmentConfig =
            serde_json::from_str(r#"{ "suppress": { "max_panels": 2 }, "trim": { "min_pad": 3 } }"#)
                .expect("valid config");

        assert_eq!(cfg.suppress.max_panels, 2);
        assert_eq!(cfg.trim.min_pad, 3);
        assert_eq!(cfg.edges, SegmentConfig::default().edges);
        assert_eq!(cfg.order, SegmentConfig::default().order);
        assert!((cfg.suppress.max_overlap_ratio - 0.30).abs() < 1e-12);
    }

    #[test]
    fn defaults_round_trip_through_json() {
        let json = serde_json::to_string(&SegmentConfig::default()).expect("serializable");
        let back: SegmentConfig = serde_json::from_str(&json).expect("valid config");
        assert_eq!(back, SegmentConfig::default());
        assert_eq!(back.suppress.max_panels, DEFAULT_MAX_PANELS);
        assert_eq!(back.trim.min_pad, DEFAULT_MIN_PAD);
    }
}
