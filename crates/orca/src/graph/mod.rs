use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Undirected edge. `weight` orders siblings: heavier links are placed first under their parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: f64,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            weight: 1.0,
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f64 {
        self.distance(&Point::ORIGIN)
    }

    /// Angle from the positive x axis, in `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x).rem_euclid(std::f64::consts::TAU)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutResult {
    pub positions: BTreeMap<String, Point>,
    /// Node placed at the origin; `None` only for an empty layout.
    pub focal: Option<String>,
    /// BFS shells; `shells[0]` holds the focal node alone.
    pub shells: Vec<Vec<String>>,
    /// Nodes unreachable from the focal node, in id order, placed beyond the last shell.
    pub outer_ring: Vec<String>,
}

impl LayoutResult {
    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
