#![forbid(unsafe_code)]

//! Entity/relationship store used by `narwhal`.
//!
//! The store is an immutable-per-load snapshot of typed entities and undirected relationships.
//! It is replaced wholesale through [`GraphStore::load`]; there is no partial mutation API, so
//! every invariant (unique ids, registered types, no dangling edges) is checked in one place.

pub mod error;
pub mod model;
pub mod registry;
pub mod store;

pub use error::{Result, ValidationError};
pub use model::{Entity, EntityType, NodeShape, ParseSeverityError, Relationship, Severity};
pub use registry::{TypeRegistry, TypeRegistryEntry};
pub use store::{GraphStore, LoadMode, LoadReport};
