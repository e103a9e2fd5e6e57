use crate::Result;
use narwhal_graph::{Entity, Relationship};
use serde::{Deserialize, Serialize};

/// Serialized graph input: `{ "nodes": [...], "edges": [...] }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Entity>,
    #[serde(default)]
    pub edges: Vec<Relationship>,
}

impl GraphDocument {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
