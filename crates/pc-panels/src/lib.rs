//! Comic page segmentation into individually encoded panels.
//!
//! A page goes through these stages, each consuming the previous output:
//! 1. decode bytes into an RGB raster ([`decode_raster`]),
//! 2. build a closed binary edge map ([`build_edge_map`]),
//! 3. trace borders with a two-level hierarchy (`pc_contour`),
//! 4. keep plausibly sized boxes and score them ([`select_candidates`]),
//! 5. greedy overlap suppression, at most four boxes ([`suppress_overlaps`]),
//! 6. reading order by row buckets ([`sort_reading_order`]),
//! 7. inward pad and dark-column trimming ([`trim_panel`]),
//! 8. per-panel encoding ([`encode_panel`]).
//!
//! [`Segmenter`] runs the whole chain; [`segment_panels`] is the one-call
//! entry point taking a format name and an integer quality.

mod candidate;
mod config;
mod decode;
mod edge_map;
mod encode;
mod error;
mod order;
mod pipeline;
mod suppress;
mod trim;

pub use candidate::{CandidateBox, select_candidates};
pub use config::*;
pub use decode::decode_raster;
pub use edge_map::build_edge_map;
pub use encode::{
    DEFAULT_QUALITY, EncodeOptions, MAX_QUALITY, MIN_QUALITY, OutputFormat, Quality, encode_panel,
};
pub use error::{PanelEncodeError, SegmentError};
pub use order::{row_tolerance, sort_reading_order};
pub use pipeline::{PanelOutcome, Segmenter, segment_panels};
pub use suppress::suppress_overlaps;
pub use trim::{Panel, pad_inward, trim_dark_columns, trim_panel};
