//! Visibility filtering and legend aggregation.

use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use narwhal_graph::{Entity, EntityType, GraphStore, NodeShape, Severity, TypeRegistry};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which entities are visible. The default shows everything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    /// Visible entity types; empty means all types.
    pub type_whitelist: BTreeSet<EntityType>,
    /// Minimum severity. Entities without a severity are hidden while this is set.
    pub severity_min: Option<Severity>,
    /// Case-insensitive substring matched against the label and attribute values.
    pub text_query: Option<String>,
}

impl FilterConfig {
    #[must_use]
    pub fn with_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntityType>,
    {
        self.type_whitelist = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_severity_min(mut self, severity: Severity) -> Self {
        self.severity_min = Some(severity);
        self
    }

    #[must_use]
    pub fn with_text_query(mut self, query: impl Into<String>) -> Self {
        self.text_query = Some(query.into());
        self
    }

    pub fn validate(&self, registry: &TypeRegistry) -> Result<()> {
        match self.type_whitelist.iter().find(|t| !registry.contains(t)) {
            Some(t) => Err(ConfigError::UnknownType {
                entity_type: t.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Lowercased query, matched as typed. A whitespace-only query disables text matching.
    fn normalized_query(&self) -> Option<String> {
        let q = self.text_query.as_deref()?;
        (!q.trim().is_empty()).then(|| q.to_lowercase())
    }

    fn admits(&self, entity: &Entity, query: Option<&str>) -> bool {
        if !self.type_whitelist.is_empty() && !self.type_whitelist.contains(&entity.entity_type) {
            return false;
        }
        if let Some(min) = self.severity_min {
            match entity.severity {
                Some(s) if s >= min => {}
                _ => return false,
            }
        }
        match query {
            None => true,
            Some(q) => {
                entity.label.to_lowercase().contains(q)
                    || entity
                        .attributes
                        .values()
                        .any(|v| v.to_lowercase().contains(q))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOutput {
    /// Visible node ids, sorted.
    pub visible_nodes: Vec<String>,
    /// Edges whose endpoints are both visible, sorted by id.
    pub visible_edges: Vec<String>,
    /// Per-type node counts over the whole store, in registry order.
    pub legend_counts: IndexMap<EntityType, usize>,
}

impl FilterOutput {
    pub fn is_node_visible(&self, id: &str) -> bool {
        self.visible_nodes
            .binary_search_by(|v| v.as_str().cmp(id))
            .is_ok()
    }

    pub fn is_edge_visible(&self, id: &str) -> bool {
        self.visible_edges
            .binary_search_by(|v| v.as_str().cmp(id))
            .is_ok()
    }
}

/// One legend row: a registered type, its styling and how many entities of it are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub color: String,
    pub shape: NodeShape,
    pub count: usize,
}

/// Computes the visible subgraph of `store` under `config`.
///
/// `config` is expected to have passed [`FilterConfig::validate`] against the store's registry.
pub fn apply_filter(store: &GraphStore, config: &FilterConfig) -> FilterOutput {
    let query = config.normalized_query();

    let mut visible_nodes: Vec<String> = store
        .nodes()
        .filter(|n| config.admits(n, query.as_deref()))
        .map(|n| n.id.clone())
        .collect();
    visible_nodes.sort_unstable();

    let shown: FxHashSet<&str> = visible_nodes.iter().map(String::as_str).collect();
    let mut visible_edges: Vec<String> = store
        .edges()
        .filter(|e| shown.contains(e.source.as_str()) && shown.contains(e.target.as_str()))
        .map(|e| e.id.clone())
        .collect();
    visible_edges.sort_unstable();

    let legend_counts = legend_counts(store);
    tracing::debug!(
        visible_nodes = visible_nodes.len(),
        visible_edges = visible_edges.len(),
        total_nodes = store.node_count(),
        "filter applied"
    );

    FilterOutput {
        visible_nodes,
        visible_edges,
        legend_counts,
    }
}

/// Node count per registered type, zero counts included.
pub fn legend_counts(store: &GraphStore) -> IndexMap<EntityType, usize> {
    let registry = store.registry();
    let mut counts: IndexMap<EntityType, usize> = registry
        .entries()
        .map(|entry| (entry.entity_type.clone(), 0))
        .collect();
    for node in store.nodes() {
        if let Some(count) = counts.get_mut(&node.entity_type) {
            *count += 1;
        }
    }
    counts
}

/// Joins counts with the registry styling, in registry order.
pub fn legend_entries(
    registry: &TypeRegistry,
    counts: &IndexMap<EntityType, usize>,
) -> Vec<LegendEntry> {
    registry
        .entries()
        .map(|entry| LegendEntry {
            entity_type: entry.entity_type.clone(),
            color: entry.color.clone(),
            shape: entry.shape,
            count: counts.get(&entry.entity_type).copied().unwrap_or(0),
        })
        .collect()
}
