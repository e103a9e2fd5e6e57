//! Pointer and wheel handling: pan, zoom, selection, hover and node dragging.

use crate::config::ViewportSettings;
use crate::viewport::ViewportState;
use orca::Point;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// Pointer capture was lost.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Positive values zoom out.
    pub delta: f64,
    /// Pointer position in screen space; when present the graph point under it stays fixed.
    pub position: Option<Point>,
}

impl WheelEvent {
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            position: None,
        }
    }

    #[must_use]
    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionMode {
    Idle,
    Panning {
        origin: Point,
        last: Point,
        /// Travel exceeded the click slop; releasing will not clear the selection.
        moved: bool,
    },
    Dragging {
        node_id: String,
        last: Point,
    },
}

/// What an event changed. The engine uses this to decide whether to re-layout or redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionOutcome {
    pub viewport_changed: bool,
    pub selection_changed: bool,
    pub hover_changed: bool,
    pub pinned_changed: bool,
}

impl InteractionOutcome {
    pub fn is_noop(&self) -> bool {
        !(self.viewport_changed
            || self.selection_changed
            || self.hover_changed
            || self.pinned_changed)
    }
}

/// State machine over pointer events. Owns the [`ViewportState`], the hovered node and the
/// pinned positions produced by dragging.
#[derive(Debug, Clone)]
pub struct InteractionController {
    settings: ViewportSettings,
    hit_radius: f64,
    viewport: ViewportState,
    mode: InteractionMode,
    hovered: Option<String>,
    /// Last known pointer position, in screen space.
    pointer: Option<Point>,
    pinned: BTreeMap<String, Point>,
}

impl InteractionController {
    pub fn new(settings: ViewportSettings, hit_radius: f64) -> Self {
        Self {
            settings,
            hit_radius,
            viewport: ViewportState::default(),
            mode: InteractionMode::Idle,
            hovered: None,
            pointer: None,
            pinned: BTreeMap::new(),
        }
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.viewport.selected_node_id()
    }

    /// Node currently being dragged, if any.
    pub fn dragging(&self) -> Option<&str> {
        match &self.mode {
            InteractionMode::Dragging { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    /// Drag overrides of layout positions, in graph space.
    pub fn pinned(&self) -> &BTreeMap<String, Point> {
        &self.pinned
    }

    /// Layout position of `id` with any pinned override applied.
    pub fn effective_position(&self, id: &str, layout: &BTreeMap<String, Point>) -> Option<Point> {
        self.pinned.get(id).or_else(|| layout.get(id)).copied()
    }

    /// Node under the screen point `screen`, ties resolved to the smallest id.
    pub fn hit_test(&self, layout: &BTreeMap<String, Point>, screen: Point) -> Option<String> {
        let g = self.viewport.screen_to_graph(screen);
        layout
            .iter()
            .map(|(id, p)| (id, self.pinned.get(id).unwrap_or(p)))
            .find(|(_, p)| p.distance(&g) <= self.hit_radius)
            .map(|(id, _)| id.clone())
    }

    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        layout: &BTreeMap<String, Point>,
    ) -> InteractionOutcome {
        let mut out = InteractionOutcome::default();
        if let PointerEvent::Down { position }
        | PointerEvent::Move { position }
        | PointerEvent::Up { position } = event
        {
            self.pointer = Some(position);
        }
        match event {
            PointerEvent::Down { position } => {
                if self.mode != InteractionMode::Idle {
                    return out;
                }
                match self.hit_test(layout, position) {
                    Some(id) => {
                        out.selection_changed = self.select(Some(id.clone()));
                        if self.settings.drag_nodes {
                            self.mode = InteractionMode::Dragging {
                                node_id: id,
                                last: position,
                            };
                        }
                    }
                    None => {
                        self.mode = InteractionMode::Panning {
                            origin: position,
                            last: position,
                            moved: false,
                        };
                    }
                }
            }
            PointerEvent::Move { position } => {
                if self.mode == InteractionMode::Idle {
                    let hit = self.hit_test(layout, position);
                    if hit != self.hovered {
                        self.hovered = hit;
                        out.hover_changed = true;
                    }
                } else {
                    self.track_move(position, layout, &mut out);
                }
            }
            PointerEvent::Up { position } => {
                // Up may arrive without a preceding Move for its position.
                self.track_move(position, layout, &mut out);
                let mode = std::mem::replace(&mut self.mode, InteractionMode::Idle);
                if let InteractionMode::Panning { moved: false, .. } = mode {
                    out.selection_changed = self.select(None);
                }
            }
            PointerEvent::Cancel => {
                self.mode = InteractionMode::Idle;
            }
        }
        out
    }

    fn track_move(
        &mut self,
        position: Point,
        layout: &BTreeMap<String, Point>,
        out: &mut InteractionOutcome,
    ) {
        match &mut self.mode {
            InteractionMode::Idle => {}
            InteractionMode::Panning {
                origin,
                last,
                moved,
            } => {
                let (dx, dy) = (position.x - last.x, position.y - last.y);
                *last = position;
                if origin.distance(&position) > self.settings.click_slop {
                    *moved = true;
                }
                if dx != 0.0 || dy != 0.0 {
                    let pan = self.viewport.pan;
                    self.viewport.pan = Point::new(pan.x + dx, pan.y + dy);
                    out.viewport_changed = true;
                }
            }
            InteractionMode::Dragging { node_id, last } => {
                let zoom = self.viewport.zoom;
                let (dx, dy) = ((position.x - last.x) / zoom, (position.y - last.y) / zoom);
                *last = position;
                if dx == 0.0 && dy == 0.0 {
                    return;
                }
                let start = self
                    .pinned
                    .get(node_id.as_str())
                    .or_else(|| layout.get(node_id.as_str()))
                    .copied();
                if let Some(start) = start {
                    self.pinned
                        .insert(node_id.clone(), Point::new(start.x + dx, start.y + dy));
                    out.pinned_changed = true;
                }
            }
        }
    }

    /// Zooms by `exp(-delta * wheel_sensitivity)`. Ignored unless idle.
    pub fn handle_wheel(&mut self, event: WheelEvent) -> InteractionOutcome {
        if self.mode != InteractionMode::Idle || !event.delta.is_finite() {
            return InteractionOutcome::default();
        }
        let factor = (-event.delta * self.settings.wheel_sensitivity).exp();
        self.zoom_by(factor, event.position)
    }

    pub fn zoom_in(&mut self, anchor: Option<Point>) -> InteractionOutcome {
        self.zoom_by(self.settings.zoom_step, anchor)
    }

    pub fn zoom_out(&mut self, anchor: Option<Point>) -> InteractionOutcome {
        self.zoom_by(1.0 / self.settings.zoom_step, anchor)
    }

    /// Multiplies the zoom by `factor`, clamped to the configured range.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<Point>) -> InteractionOutcome {
        let mut out = InteractionOutcome::default();
        if !(factor.is_finite() && factor > 0.0) {
            return out;
        }
        let zoom = self.settings.clamp_zoom(self.viewport.zoom * factor);
        if zoom != self.viewport.zoom {
            self.viewport.zoom_about(zoom, anchor);
            out.viewport_changed = true;
        }
        out
    }

    /// Zoom 1 and no pan; the selection is kept.
    pub fn reset_view(&mut self) -> InteractionOutcome {
        let zoom = self.settings.clamp_zoom(1.0);
        let changed = self.viewport.zoom != zoom || self.viewport.pan != Point::ORIGIN;
        self.viewport.zoom = zoom;
        self.viewport.pan = Point::ORIGIN;
        self.mode = InteractionMode::Idle;
        InteractionOutcome {
            viewport_changed: changed,
            ..Default::default()
        }
    }

    /// Sets the selection. Returns whether it changed.
    pub fn select(&mut self, id: Option<String>) -> bool {
        if self.viewport.selected_node_id == id {
            return false;
        }
        tracing::debug!(from = ?self.viewport.selected_node_id, to = ?id, "selection changed");
        self.viewport.selected_node_id = id;
        true
    }

    /// Drops selection, hover, pins and an in-progress drag for nodes `is_visible` rejects.
    pub fn retain_visible(&mut self, is_visible: impl Fn(&str) -> bool) -> InteractionOutcome {
        let mut out = InteractionOutcome::default();
        if self.selected().is_some_and(|id| !is_visible(id)) {
            out.selection_changed = self.select(None);
        }
        if self.hovered.as_deref().is_some_and(|id| !is_visible(id)) {
            self.hovered = None;
            out.hover_changed = true;
        }
        let before = self.pinned.len();
        self.pinned.retain(|id, _| is_visible(id));
        out.pinned_changed = self.pinned.len() != before;
        let dragging_hidden = match &self.mode {
            InteractionMode::Dragging { node_id, .. } => !is_visible(node_id),
            _ => false,
        };
        if dragging_hidden {
            self.mode = InteractionMode::Idle;
        }
        out
    }

    /// Forgets the drag overrides when the layout is recomputed. The pin of a node that is
    /// still being dragged survives.
    pub fn clear_pins(&mut self) -> bool {
        let before = self.pinned.len();
        let active = match &self.mode {
            InteractionMode::Dragging { node_id, .. } => Some(node_id.as_str()),
            _ => None,
        };
        self.pinned.retain(|id, _| Some(id.as_str()) == active);
        self.pinned.len() != before
    }

    /// Re-runs the hover hit test at the last pointer position, e.g. after nodes moved.
    /// Returns whether the hovered node changed.
    pub fn refresh_hover(&mut self, layout: &BTreeMap<String, Point>) -> bool {
        if self.mode != InteractionMode::Idle {
            return false;
        }
        let hit = self
            .pointer
            .and_then(|pointer| self.hit_test(layout, pointer));
        if hit == self.hovered {
            return false;
        }
        self.hovered = hit;
        true
    }
}
