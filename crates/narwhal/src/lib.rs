#![forbid(unsafe_code)]

//! `narwhal` is a headless graph visualization and interaction engine.
//!
//! An [`Engine`] owns a validated entity/relationship store, a visibility filter, a cached
//! radial layout of the visible subgraph and the pointer interaction state. Hosts feed it data
//! and input events and read back a backend-neutral [`DrawList`], the legend and the selection.
//!
//! ```
//! use narwhal::{Engine, Entity, Relationship};
//!
//! let mut engine = Engine::new();
//! engine
//!     .load_graph(
//!         vec![
//!             Entity::new("sc", "Actor", "ShadowCorp"),
//!             Entity::new("loader", "Tool", "Loader"),
//!         ],
//!         vec![Relationship::new("e1", "sc", "loader")],
//!     )
//!     .unwrap();
//! assert_eq!(engine.layout().focal.as_deref(), Some("loader"));
//! assert_eq!(engine.legend()[0].count, 1);
//! ```

mod document;
mod engine;
mod job;

pub use document::GraphDocument;
pub use engine::{Engine, NodeDetails, SubscriptionId};
pub use job::{LayoutJob, LayoutKey, LayoutOutcome};

pub use narwhal_core::{
    ConfigError, EngineConfig, FilterConfig, FilterOutput, InteractionMode, InteractionOutcome,
    LayoutSettings, LegendEntry, PointerEvent, RenderSettings, ViewportSettings, ViewportState,
    WheelEvent,
};
pub use narwhal_graph::{
    Entity, EntityType, LoadMode, LoadReport, NodeShape, Relationship, Severity, TypeRegistry,
    TypeRegistryEntry, ValidationError,
};
pub use narwhal_render::{DrawList, DrawPrimitive, SvgOptions};
pub use orca::{LayoutResult, Point};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] orca::Error),
    #[error("graph document JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
