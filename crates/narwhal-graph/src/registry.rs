//! Type registry: the configured set of entity types and their legend styling.

use crate::model::{EntityType, NodeShape};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRegistryEntry {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Color token understood by the rendering surface (the SVG export expects a CSS color).
    pub color: String,
    #[serde(default)]
    pub shape: NodeShape,
}

impl TypeRegistryEntry {
    pub fn new(entity_type: impl Into<EntityType>, color: impl Into<String>, shape: NodeShape) -> Self {
        Self {
            entity_type: entity_type.into(),
            color: color.into(),
            shape,
        }
    }
}

/// Ordered registry of entity types. Registration order is the legend order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeRegistry {
    entries: IndexMap<EntityType, TypeRegistryEntry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five types of the threat-actor explorer.
    pub fn threat_intel_defaults() -> Self {
        let mut registry = Self::new();
        for entry in [
            TypeRegistryEntry::new("Actor", "#ef4444", NodeShape::Circle),
            TypeRegistryEntry::new("Tool", "#3b82f6", NodeShape::Square),
            TypeRegistryEntry::new("Target", "#06b6d4", NodeShape::Hexagon),
            TypeRegistryEntry::new("Vulnerability", "#f97316", NodeShape::Triangle),
            TypeRegistryEntry::new("Forum", "#6b7280", NodeShape::Pentagon),
        ] {
            registry.register(entry);
        }
        registry
    }

    /// Registers a type. Returns `false` (and keeps the existing entry) if the type is already
    /// registered.
    pub fn register(&mut self, entry: TypeRegistryEntry) -> bool {
        if self.entries.contains_key(&entry.entity_type) {
            return false;
        }
        self.entries.insert(entry.entity_type.clone(), entry);
        true
    }

    pub fn contains(&self, entity_type: &EntityType) -> bool {
        self.entries.contains_key(entity_type)
    }

    pub fn get(&self, entity_type: &EntityType) -> Option<&TypeRegistryEntry> {
        self.entries.get(entity_type)
    }

    /// Registration index of a type, used for dense per-type counters.
    pub fn index_of(&self, entity_type: &EntityType) -> Option<usize> {
        self.entries.get_index_of(entity_type)
    }

    pub fn entries(&self) -> impl Iterator<Item = &TypeRegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
