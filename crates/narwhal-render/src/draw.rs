use narwhal_core::{RenderSettings, ViewportState};
use narwhal_graph::{GraphStore, NodeShape};
use orca::Point;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::BTreeMap;

/// Selection rings are drawn this much larger than the node glyph.
const SELECTION_RING_SCALE: f64 = 1.4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DrawPrimitive {
    Background {
        color: String,
    },
    Edge {
        id: String,
        from: Point,
        to: Point,
        color: String,
        width: f64,
        label: Option<String>,
        highlighted: bool,
        dimmed: bool,
    },
    Node {
        id: String,
        position: Point,
        radius: f64,
        shape: NodeShape,
        fill: String,
        /// Severity ring color, if the entity carries a severity.
        ring: Option<String>,
        /// `None` below the label zoom threshold.
        label: Option<String>,
        highlighted: bool,
        dimmed: bool,
        hovered: bool,
    },
    SelectionHighlight {
        id: String,
        position: Point,
        radius: f64,
        color: String,
    },
}

/// Ordered primitives: background, edges by id, nodes by id, then the selection highlight.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DrawList {
    pub primitives: Vec<DrawPrimitive>,
}

impl DrawList {
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawPrimitive> {
        self.primitives.iter()
    }

    pub fn node(&self, id: &str) -> Option<&DrawPrimitive> {
        self.primitives
            .iter()
            .find(|p| matches!(p, DrawPrimitive::Node { id: node_id, .. } if node_id == id))
    }
}

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub store: &'a GraphStore,
    pub visible_nodes: &'a [String],
    pub visible_edges: &'a [String],
    /// Graph-space positions with drag overrides already applied.
    pub positions: &'a BTreeMap<String, Point>,
    pub viewport: &'a ViewportState,
    pub hovered: Option<&'a str>,
    pub settings: &'a RenderSettings,
}

pub fn build_draw_list(input: &RenderInput<'_>) -> DrawList {
    let RenderInput {
        store,
        visible_nodes,
        visible_edges,
        positions,
        viewport,
        hovered,
        settings,
    } = *input;

    let screen = |id: &str| positions.get(id).map(|&p| viewport.graph_to_screen(p));
    let selected = viewport
        .selected_node_id()
        .filter(|id| visible_nodes.iter().any(|v| v.as_str() == *id));

    let mut edge_ids: Vec<&str> = visible_edges.iter().map(String::as_str).collect();
    edge_ids.sort_unstable();
    let mut node_ids: Vec<&str> = visible_nodes.iter().map(String::as_str).collect();
    node_ids.sort_unstable();

    let mut neighbors: FxHashSet<&str> = FxHashSet::default();
    if let Some(sel) = selected {
        neighbors.insert(sel);
        for id in &edge_ids {
            if let Some(other) = store.edge(id).and_then(|e| e.other_end(sel)) {
                neighbors.insert(other);
            }
        }
    }

    let mut primitives = Vec::with_capacity(2 + edge_ids.len() + node_ids.len());
    primitives.push(DrawPrimitive::Background {
        color: settings.background.clone(),
    });

    let show_labels = viewport.zoom() >= settings.label_min_zoom;
    for id in edge_ids {
        let Some(edge) = store.edge(id) else {
            continue;
        };
        let (Some(from), Some(to)) = (screen(&edge.source), screen(&edge.target)) else {
            continue;
        };
        let highlighted = selected.is_some_and(|sel| edge.other_end(sel).is_some());
        primitives.push(DrawPrimitive::Edge {
            id: edge.id.clone(),
            from,
            to,
            color: if highlighted {
                settings.highlight_color.clone()
            } else {
                settings.edge_color.clone()
            },
            width: settings.edge_width * viewport.zoom(),
            label: edge.label.clone().filter(|_| show_labels),
            highlighted,
            dimmed: selected.is_some() && !highlighted,
        });
    }

    let radius = settings.node_radius * viewport.zoom();
    for id in node_ids {
        let (Some(entity), Some(position)) = (store.node(id), screen(id)) else {
            continue;
        };
        let style = store.registry().get(&entity.entity_type);
        let highlighted = neighbors.contains(id);
        primitives.push(DrawPrimitive::Node {
            id: entity.id.clone(),
            position,
            radius,
            shape: style.map(|s| s.shape).unwrap_or_default(),
            fill: style.map_or_else(|| settings.edge_color.clone(), |s| s.color.clone()),
            ring: entity.severity.map(|s| s.color().to_string()),
            label: show_labels.then(|| entity.label.clone()),
            highlighted,
            dimmed: selected.is_some() && !highlighted,
            hovered: hovered == Some(id),
        });
    }

    if let Some((sel, position)) = selected.and_then(|sel| Some((sel, screen(sel)?))) {
        primitives.push(DrawPrimitive::SelectionHighlight {
            id: sel.to_string(),
            position,
            radius: radius * SELECTION_RING_SCALE,
            color: settings.highlight_color.clone(),
        });
    }

    DrawList { primitives }
}
