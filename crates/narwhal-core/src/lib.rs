#![forbid(unsafe_code)]

//! View-model building blocks for `narwhal`: engine configuration, the visibility filter with
//! its legend aggregate, and the pointer interaction state machine.

pub mod config;
pub mod error;
pub mod filter;
pub mod interaction;
pub mod viewport;

pub use config::{EngineConfig, LayoutSettings, RenderSettings, ViewportSettings};
pub use error::{ConfigError, Result};
pub use filter::{
    FilterConfig, FilterOutput, LegendEntry, apply_filter, legend_counts, legend_entries,
};
pub use interaction::{
    InteractionController, InteractionMode, InteractionOutcome, PointerEvent, WheelEvent,
};
pub use viewport::ViewportState;
