//! Umbrella crate for the `panelcut` workspace.
//!
//! Re-exports the raster primitives, contour tracing and the panel
//! segmentation pipeline, so callers need a single dependency.

pub use pc_contour::{
    BorderKind, ContourArena, ContourId, ContourNode, Hierarchy, TraceConfig, trace_contours,
};
pub use pc_core::*;
pub use pc_panels::*;
