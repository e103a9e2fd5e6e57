//! The canonical entity/relationship snapshot.

mod adjacency;

use crate::error::{Result, ValidationError};
use crate::model::{Entity, Relationship};
use crate::registry::TypeRegistry;
use adjacency::AdjacencyIndex;
use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// How [`GraphStore::load_with`] treats edges whose endpoints are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Reject the whole load with [`ValidationError::DanglingEdge`].
    #[default]
    Strict,
    /// Drop the offending edges and keep everything else.
    PruneDangling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub nodes: usize,
    pub edges: usize,
    pub pruned_edges: usize,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    nodes: Vec<Entity>,
    node_index: HashMap<String, usize>,
    edges: Vec<Relationship>,
    edge_index: HashMap<String, usize>,
    endpoints: Vec<(usize, usize)>,
    adjacency: AdjacencyIndex,
}

/// Holds the graph for the current session. Replaced only through a full load.
#[derive(Debug, Clone)]
pub struct GraphStore {
    registry: TypeRegistry,
    snapshot: Snapshot,
}

impl GraphStore {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            snapshot: Snapshot::default(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Replaces the store contents, rejecting dangling edges.
    ///
    /// On error the previous contents are left untouched.
    pub fn load(&mut self, nodes: Vec<Entity>, edges: Vec<Relationship>) -> Result<LoadReport> {
        self.load_with(nodes, edges, LoadMode::Strict)
    }

    pub fn load_with(
        &mut self,
        nodes: Vec<Entity>,
        edges: Vec<Relationship>,
        mode: LoadMode,
    ) -> Result<LoadReport> {
        let (snapshot, report) = build_snapshot(&self.registry, nodes, edges, mode)?;
        self.snapshot = snapshot;
        tracing::debug!(
            nodes = report.nodes,
            edges = report.edges,
            pruned_edges = report.pruned_edges,
            "graph store loaded"
        );
        Ok(report)
    }

    pub fn node_count(&self) -> usize {
        self.snapshot.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.snapshot.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot.node_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Entity> {
        self.snapshot
            .node_index
            .get(id)
            .map(|&ix| &self.snapshot.nodes[ix])
    }

    pub fn edge(&self, id: &str) -> Option<&Relationship> {
        self.snapshot
            .edge_index
            .get(id)
            .map(|&ix| &self.snapshot.edges[ix])
    }

    /// Entities in load order.
    pub fn nodes(&self) -> impl Iterator<Item = &Entity> {
        self.snapshot.nodes.iter()
    }

    /// Relationships in load order.
    pub fn edges(&self) -> impl Iterator<Item = &Relationship> {
        self.snapshot.edges.iter()
    }

    /// Relationships incident to `id` (empty for unknown ids).
    pub fn edges_of(&self, id: &str) -> impl Iterator<Item = &Relationship> {
        let incident: &[usize] = match self.snapshot.node_index.get(id) {
            Some(&ix) => self.snapshot.adjacency.edges(ix),
            None => &[],
        };
        incident.iter().map(|&e| &self.snapshot.edges[e])
    }

    /// Ids adjacent to `id`; a node with a self-loop lists itself.
    pub fn neighbors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> {
        self.edges_of(id).filter_map(move |e| e.other_end(id))
    }

    pub fn degree(&self, id: &str) -> usize {
        self.snapshot
            .node_index
            .get(id)
            .map(|&ix| self.snapshot.adjacency.degree(ix))
            .unwrap_or(0)
    }

    /// Node indices of each edge's endpoints, parallel to [`GraphStore::edges`].
    pub fn edge_endpoints(&self) -> &[(usize, usize)] {
        &self.snapshot.endpoints
    }
}

fn build_snapshot(
    registry: &TypeRegistry,
    nodes: Vec<Entity>,
    edges: Vec<Relationship>,
    mode: LoadMode,
) -> Result<(Snapshot, LoadReport)> {
    let mut node_index: HashMap<String, usize> = HashMap::default();
    node_index.reserve(nodes.len());
    for (ix, n) in nodes.iter().enumerate() {
        if !registry.contains(&n.entity_type) {
            return Err(ValidationError::UnknownType {
                node_id: n.id.clone(),
                entity_type: n.entity_type.to_string(),
            });
        }
        if node_index.insert(n.id.clone(), ix).is_some() {
            return Err(ValidationError::DuplicateNode { id: n.id.clone() });
        }
    }

    let mut kept: Vec<Relationship> = Vec::with_capacity(edges.len());
    let mut endpoints: Vec<(usize, usize)> = Vec::with_capacity(edges.len());
    let mut edge_index: HashMap<String, usize> = HashMap::default();
    edge_index.reserve(edges.len());
    let mut pruned = 0usize;

    for e in edges {
        if !(e.weight.is_finite() && e.weight > 0.0) {
            return Err(ValidationError::InvalidWeight {
                edge_id: e.id.clone(),
                weight: e.weight,
            });
        }
        let v = node_index.get(e.source.as_str()).copied();
        let w = node_index.get(e.target.as_str()).copied();
        let (Some(v), Some(w)) = (v, w) else {
            let missing = if v.is_none() { &e.source } else { &e.target };
            match mode {
                LoadMode::Strict => {
                    return Err(ValidationError::DanglingEdge {
                        edge_id: e.id.clone(),
                        node_id: missing.clone(),
                    });
                }
                LoadMode::PruneDangling => {
                    tracing::warn!(edge = %e.id, missing = %missing, "dropping dangling edge");
                    pruned += 1;
                    continue;
                }
            }
        };
        if edge_index.contains_key(e.id.as_str()) {
            return Err(ValidationError::DuplicateEdge { id: e.id.clone() });
        }
        edge_index.insert(e.id.clone(), kept.len());
        endpoints.push((v, w));
        kept.push(e);
    }

    let adjacency = AdjacencyIndex::build(nodes.len(), &endpoints);
    let report = LoadReport {
        nodes: nodes.len(),
        edges: kept.len(),
        pruned_edges: pruned,
    };
    Ok((
        Snapshot {
            nodes,
            node_index,
            edges: kept,
            edge_index,
            endpoints,
            adjacency,
        },
        report,
    ))
}
