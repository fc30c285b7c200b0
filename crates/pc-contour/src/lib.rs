//! Border following on binary masks.
//!
//! Every non-zero connected component (8-connectivity) contributes one outer
//! border, plus one hole border per background region it encloses. Contours
//! are stored in a flat [`ContourArena`]; parent, first-child and
//! next-sibling links are indices into the arena.
//!
//! The default [`Hierarchy::TwoLevel`] keeps outer borders as roots and hangs
//! each hole under the outer border of its component. [`Hierarchy::Tree`]
//! keeps the full nesting, so components drawn inside a hole become children
//! of that hole.

mod arena;
mod trace;

pub use arena::{BorderKind, Children, ContourArena, ContourId, ContourNode};
pub use trace::{Hierarchy, TraceConfig, trace_contours};
