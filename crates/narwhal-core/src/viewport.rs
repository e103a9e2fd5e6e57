use orca::Point;
use serde::Serialize;

/// Current view transform and selection.
///
/// Screen coordinates are `graph * zoom + pan`. Only [`InteractionController`] mutates a
/// viewport, which keeps `zoom` inside the configured range.
///
/// [`InteractionController`]: crate::InteractionController
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub(crate) zoom: f64,
    pub(crate) pan: Point,
    pub(crate) selected_node_id: Option<String>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ORIGIN,
            selected_node_id: None,
        }
    }
}

impl ViewportState {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn selected_node_id(&self) -> Option<&str> {
        self.selected_node_id.as_deref()
    }

    pub fn screen_to_graph(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    pub fn graph_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }

    /// Sets the zoom while keeping the graph point under `anchor` (screen space) in place.
    pub(crate) fn zoom_about(&mut self, zoom: f64, anchor: Option<Point>) {
        if let Some(anchor) = anchor {
            let g = self.screen_to_graph(anchor);
            self.pan = Point::new(anchor.x - g.x * zoom, anchor.y - g.y * zoom);
        }
        self.zoom = zoom;
    }
}
