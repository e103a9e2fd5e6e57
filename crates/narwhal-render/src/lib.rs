#![forbid(unsafe_code)]

//! Turns the visible subgraph, its layout and the current viewport into an ordered list of
//! screen-space drawing primitives, and exports such lists as standalone SVG documents.

pub mod draw;
pub mod svg;

pub use draw::{DrawList, DrawPrimitive, RenderInput, build_draw_list};
pub use svg::{SvgOptions, render_svg};
