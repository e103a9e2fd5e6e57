use crate::job::{LayoutJob, LayoutKey, LayoutOutcome};
use crate::Result;
use narwhal_core::{
    EngineConfig, FilterConfig, FilterOutput, InteractionController, InteractionOutcome,
    LegendEntry, PointerEvent, ViewportState, WheelEvent, apply_filter, legend_entries,
};
use narwhal_graph::{Entity, GraphStore, LoadMode, LoadReport, Relationship};
use narwhal_render::{DrawList, RenderInput, SvgOptions, build_draw_list, render_svg};
use orca::{Edge, LayoutResult, Point};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// What the details panel shows for the selected node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetails {
    pub entity: Entity,
    /// Incident relationships in the whole store, visible or not.
    pub connections: usize,
    /// Distinct neighbor ids, sorted.
    pub neighbors: Vec<String>,
}

type Callback = Box<dyn FnMut(u64)>;

/// One interactive graph view.
///
/// Every mutation that can change the picture (loading, filtering, focal changes, input events,
/// view commands, layout commits) ends by diffing the draw list against the last one announced;
/// subscribers are called with a new revision number only when it differs.
pub struct Engine {
    config: EngineConfig,
    store: GraphStore,
    filter: FilterConfig,
    visible: FilterOutput,
    focal_request: Option<String>,
    /// Focal change from a press that started a drag; applied on release if the node stayed put.
    deferred_focal: Option<String>,
    layout: LayoutResult,
    layout_key: Option<LayoutKey>,
    generation: u64,
    controller: InteractionController,
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_subscription: u64,
    revision: u64,
    last_notified: Option<DrawList>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("nodes", &self.store.node_count())
            .field("edges", &self.store.edge_count())
            .field("filter", &self.filter)
            .field("focal", &self.layout.focal)
            .field("generation", &self.generation)
            .field("revision", &self.revision)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_validated(EngineConfig::default())
    }
}

impl Engine {
    /// Engine with the default configuration and the five threat-intel entity types.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: EngineConfig) -> Self {
        let store = GraphStore::new(config.registry());
        let controller =
            InteractionController::new(config.viewport.clone(), config.render.node_radius);
        let visible = apply_filter(&store, &FilterConfig::default());
        Self {
            config,
            store,
            filter: FilterConfig::default(),
            visible,
            focal_request: None,
            deferred_focal: None,
            layout: LayoutResult::default(),
            layout_key: None,
            generation: 0,
            controller,
            subscribers: Vec::new(),
            next_subscription: 0,
            revision: 0,
            last_notified: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn visible(&self) -> &FilterOutput {
        &self.visible
    }

    /// Current layout of the visible subgraph, without drag overrides.
    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn viewport(&self) -> &ViewportState {
        self.controller.viewport()
    }

    pub fn hovered_node(&self) -> Option<&str> {
        self.controller.hovered()
    }

    /// Revision of the last announced draw list; starts at 0.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the graph, rejecting dangling edges. On error nothing changes.
    pub fn load_graph(
        &mut self,
        nodes: Vec<Entity>,
        edges: Vec<Relationship>,
    ) -> Result<LoadReport> {
        self.load_graph_with(nodes, edges, LoadMode::Strict)
    }

    pub fn load_graph_with(
        &mut self,
        nodes: Vec<Entity>,
        edges: Vec<Relationship>,
        mode: LoadMode,
    ) -> Result<LoadReport> {
        let report = self.store.load_with(nodes, edges, mode)?;
        // Same ids can now mean different endpoints.
        self.layout_key = None;
        self.refresh_visible();
        self.relayout()?;
        self.notify_if_changed();
        Ok(report)
    }

    /// Installs a new filter. An invalid filter is rejected and the previous one stays active.
    pub fn set_filter(&mut self, filter: FilterConfig) -> Result<()> {
        filter.validate(self.store.registry())?;
        self.filter = filter;
        self.refresh_visible();
        self.relayout()?;
        self.notify_if_changed();
        Ok(())
    }

    /// Requests the node placed at the layout origin. `None`, or an id that is not visible,
    /// falls back to the highest-degree visible node.
    pub fn set_focal_node(&mut self, id: Option<&str>) -> Result<()> {
        self.focal_request = id.map(str::to_string);
        self.deferred_focal = None;
        self.relayout()?;
        self.notify_if_changed();
        Ok(())
    }

    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Result<InteractionOutcome> {
        let outcome = self.controller.handle_pointer(event, &self.layout.positions);
        if outcome.selection_changed {
            self.deferred_focal = None;
            if let Some(id) = self.controller.selected().map(str::to_string) {
                if self.controller.dragging().is_some() {
                    // Re-laying out now would move the node out from under the pointer.
                    self.deferred_focal = Some(id);
                } else {
                    self.focal_request = Some(id);
                    self.relayout()?;
                }
            }
        }
        if self.controller.dragging().is_none() {
            if let Some(id) = self.deferred_focal.take() {
                if self.controller.pinned().contains_key(&id) {
                    tracing::debug!(node = %id, "node dragged, keeping its placement");
                } else if self.visible.is_node_visible(&id) {
                    self.focal_request = Some(id);
                    self.relayout()?;
                }
            }
        }
        self.notify_if_changed();
        Ok(outcome)
    }

    /// Selects a node directly, as a list or search result click would. Hidden or unknown ids
    /// are ignored and `Ok(false)` is returned.
    pub fn select_node(&mut self, id: Option<&str>) -> Result<bool> {
        if id.is_some_and(|id| !self.visible.is_node_visible(id)) {
            return Ok(false);
        }
        if !self.controller.select(id.map(str::to_string)) {
            return Ok(false);
        }
        self.deferred_focal = None;
        if let Some(id) = id {
            self.focal_request = Some(id.to_string());
            self.relayout()?;
        }
        self.notify_if_changed();
        Ok(true)
    }

    pub fn handle_wheel_event(&mut self, event: WheelEvent) -> InteractionOutcome {
        let outcome = self.controller.handle_wheel(event);
        self.notify_if_changed();
        outcome
    }

    pub fn zoom_in(&mut self) -> InteractionOutcome {
        let outcome = self.controller.zoom_in(None);
        self.notify_if_changed();
        outcome
    }

    pub fn zoom_out(&mut self) -> InteractionOutcome {
        let outcome = self.controller.zoom_out(None);
        self.notify_if_changed();
        outcome
    }

    pub fn reset_view(&mut self) -> InteractionOutcome {
        let outcome = self.controller.reset_view();
        self.notify_if_changed();
        outcome
    }

    /// Starts a layout of the current visible subgraph. Preparing a job invalidates every
    /// earlier one.
    pub fn prepare_layout(&mut self) -> LayoutJob {
        self.generation += 1;
        let key = self.current_key();
        let edges = key
            .edges
            .iter()
            .filter_map(|id| self.store.edge(id))
            .map(|e| {
                Edge::new(e.id.clone(), e.source.clone(), e.target.clone()).with_weight(e.weight)
            })
            .collect();
        LayoutJob::new(self.generation, key, edges, self.config.radial_options())
    }

    /// Installs a finished layout. Returns `Ok(false)` for a stale outcome, which is dropped.
    pub fn commit_layout(&mut self, outcome: LayoutOutcome) -> Result<bool> {
        if outcome.generation != self.generation {
            tracing::warn!(
                generation = outcome.generation,
                latest = self.generation,
                "discarding stale layout"
            );
            return Ok(false);
        }
        let layout = outcome.result?;
        tracing::debug!(
            generation = outcome.generation,
            nodes = layout.positions.len(),
            focal = ?layout.focal,
            "layout committed"
        );
        self.layout = layout;
        self.layout_key = Some(outcome.key);
        self.controller.clear_pins();
        self.controller.refresh_hover(&self.layout.positions);
        self.notify_if_changed();
        Ok(true)
    }

    /// Backend-neutral primitives for the current frame.
    pub fn draw_list(&self) -> DrawList {
        let positions = self.effective_positions();
        build_draw_list(&RenderInput {
            store: &self.store,
            visible_nodes: &self.visible.visible_nodes,
            visible_edges: &self.visible.visible_edges,
            positions: &positions,
            viewport: self.controller.viewport(),
            hovered: self.controller.hovered(),
            settings: &self.config.render,
        })
    }

    pub fn export_svg(&self, options: &SvgOptions) -> String {
        render_svg(&self.draw_list(), options)
    }

    /// Legend rows in registry order. Counts cover the whole store, not just the visible part.
    pub fn legend(&self) -> Vec<LegendEntry> {
        legend_entries(self.store.registry(), &self.visible.legend_counts)
    }

    pub fn selected_node(&self) -> Option<&Entity> {
        self.controller.selected().and_then(|id| self.store.node(id))
    }

    pub fn selected_details(&self) -> Option<NodeDetails> {
        let entity = self.selected_node()?;
        let mut neighbors: Vec<String> = self
            .store
            .neighbors(&entity.id)
            .map(str::to_string)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        Some(NodeDetails {
            entity: entity.clone(),
            connections: self.store.degree(&entity.id),
            neighbors,
        })
    }

    /// Registers a change callback. It receives the new revision number.
    pub fn subscribe(&mut self, callback: impl FnMut(u64) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns whether `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Tears the engine down. Subscribers are dropped without being called.
    pub fn dispose(mut self) {
        tracing::debug!(subscribers = self.subscribers.len(), "engine disposed");
        self.subscribers.clear();
    }

    fn refresh_visible(&mut self) {
        self.visible = apply_filter(&self.store, &self.filter);
        let visible = &self.visible;
        self.controller.retain_visible(|id| visible.is_node_visible(id));
    }

    fn current_key(&self) -> LayoutKey {
        LayoutKey {
            nodes: self.visible.visible_nodes.clone(),
            edges: self.visible.visible_edges.clone(),
            focal: self.focal_request.clone(),
        }
    }

    /// Synchronous prepare, run and commit, skipped when the cached layout matches.
    fn relayout(&mut self) -> Result<()> {
        if self.layout_key.as_ref() == Some(&self.current_key()) {
            tracing::debug!("layout cache hit");
            return Ok(());
        }
        let outcome = self.prepare_layout().run();
        self.commit_layout(outcome)?;
        Ok(())
    }

    fn effective_positions(&self) -> Cow<'_, BTreeMap<String, Point>> {
        let pinned = self.controller.pinned();
        if pinned.is_empty() {
            return Cow::Borrowed(&self.layout.positions);
        }
        let mut positions = self.layout.positions.clone();
        for (id, p) in pinned {
            if let Some(slot) = positions.get_mut(id) {
                *slot = *p;
            }
        }
        Cow::Owned(positions)
    }

    fn notify_if_changed(&mut self) {
        let list = self.draw_list();
        if self.last_notified.as_ref() == Some(&list) {
            return;
        }
        self.revision += 1;
        self.last_notified = Some(list);
        let revision = self.revision;
        for (_, callback) in &mut self.subscribers {
            callback(revision);
        }
    }
}
