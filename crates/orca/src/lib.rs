#![forbid(unsafe_code)]

//! Headless radial shell layout for relationship graphs.
//!
//! `orca` is used by `narwhal` to position the visible subgraph. It is deterministic: the same
//! input graph, focal request and options always produce bit-identical positions. The small
//! per-node perturbation is derived from the node id and [`RadialOptions::random_seed`], never from the
//! wall clock.

pub mod algo;
pub mod error;
pub mod graph;

pub use algo::{MAX_JITTER, RadialOptions};
pub use error::{Error, Result};
pub use graph::{Edge, Graph, LayoutResult, Node, Point};

/// Headless layout entry point.
///
/// `focal` requests the node to place at the origin; when it is `None` or not part of `graph`,
/// the highest-degree node is used instead (ties resolve to the smallest id).
pub fn layout(graph: &Graph, focal: Option<&str>, opts: &RadialOptions) -> Result<LayoutResult> {
    algo::radial::layout(graph, focal, opts)
}
