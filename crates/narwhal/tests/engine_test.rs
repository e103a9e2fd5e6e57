use chrono::{TimeZone, Utc};
use narwhal::{
    ConfigError, DrawPrimitive, Engine, EngineConfig, Entity, Error, FilterConfig, LoadMode, Point,
    PointerEvent, Relationship, Severity, SvgOptions, ValidationError, WheelEvent,
};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

fn star(neighbors: usize) -> (Vec<Entity>, Vec<Relationship>) {
    let mut nodes =
        vec![Entity::new("SC", "Actor", "ShadowCorp").with_severity(Severity::Critical)];
    let mut edges = Vec::new();
    for i in 0..neighbors {
        nodes.push(Entity::new(format!("t{i:02}"), "Tool", format!("Tool {i}")));
        edges.push(Relationship::new(format!("e{i:02}"), "SC", format!("t{i:02}")));
    }
    (nodes, edges)
}

fn actors_and_others() -> (Vec<Entity>, Vec<Relationship>) {
    let mut nodes: Vec<Entity> = (0..5)
        .map(|i| Entity::new(format!("actor{i}"), "Actor", format!("Actor {i}")))
        .collect();
    let mut edges = Vec::new();
    for i in 0..20 {
        let ty = ["Tool", "Target", "Vulnerability", "Forum"][i % 4];
        nodes.push(Entity::new(format!("other{i:02}"), ty, format!("{ty} {i}")));
        edges.push(Relationship::new(
            format!("e{i:02}"),
            format!("actor{}", i % 5),
            format!("other{i:02}"),
        ));
    }
    (nodes, edges)
}

fn engine_without_jitter() -> Engine {
    let config =
        EngineConfig::from_value(&json!({ "layout": { "jitter": 0.0 } })).expect("valid config");
    Engine::with_config(config).expect("valid config")
}

fn press(engine: &mut Engine, at: Point) {
    engine
        .handle_pointer_event(PointerEvent::Down { position: at })
        .expect("pointer down");
    engine
        .handle_pointer_event(PointerEvent::Up { position: at })
        .expect("pointer up");
}

#[test]
fn focal_node_sits_at_origin_with_neighbors_on_the_first_shell() {
    let mut engine = engine_without_jitter();
    let (nodes, edges) = star(12);
    engine.load_graph(nodes, edges).expect("valid graph");
    engine.set_focal_node(Some("SC")).expect("layout ok");

    let layout = engine.layout();
    assert_eq!(layout.focal.as_deref(), Some("SC"));
    assert_eq!(layout.position("SC"), Some(Point::ORIGIN));
    let step = 30f64.to_radians();
    for i in 0..12 {
        let p = layout.position(&format!("t{i:02}")).expect("placed");
        assert!((p.length() - 240.0).abs() < 1e-9);
        let slot = p.angle() / step;
        assert!((slot - slot.round()).abs() < 1e-9);
    }
}

#[test]
fn actor_whitelist_keeps_only_actors() {
    let mut engine = Engine::new();
    let (nodes, edges) = actors_and_others();
    engine.load_graph(nodes, edges).expect("valid graph");
    engine
        .set_filter(FilterConfig::default().with_types(["Actor"]))
        .expect("valid filter");

    assert_eq!(engine.visible().visible_nodes.len(), 5);
    assert!(engine.visible().visible_edges.is_empty());
    assert_eq!(engine.layout().positions.len(), 5);
    let drawn_edges = engine
        .draw_list()
        .iter()
        .filter(|p| matches!(p, DrawPrimitive::Edge { .. }))
        .count();
    assert_eq!(drawn_edges, 0);
}

#[test]
fn dangling_edge_is_rejected_and_previous_graph_kept() {
    let mut engine = Engine::new();
    let (nodes, edges) = star(3);
    engine.load_graph(nodes, edges).expect("valid graph");
    let before = engine.layout().clone();
    let revision = engine.revision();

    let err = engine
        .load_graph(
            vec![Entity::new("a", "Actor", "A")],
            vec![Relationship::new("e", "a", "ghost")],
        )
        .expect_err("dangling edge");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::DanglingEdge { .. })
    ));
    assert_eq!(engine.store().node_count(), 4);
    assert_eq!(engine.layout(), &before);
    assert_eq!(engine.revision(), revision);
}

#[test]
fn prune_mode_drops_dangling_edges() {
    let mut engine = Engine::new();
    let report = engine
        .load_graph_with(
            vec![Entity::new("a", "Actor", "A"), Entity::new("b", "Tool", "B")],
            vec![
                Relationship::new("ok", "a", "b"),
                Relationship::new("bad", "a", "ghost"),
            ],
            LoadMode::PruneDangling,
        )
        .expect("pruned load");
    assert_eq!(report.pruned_edges, 1);
    assert_eq!(engine.visible().visible_edges, vec!["ok".to_string()]);
}

#[test]
fn invalid_filter_keeps_the_previous_one() {
    let mut engine = Engine::new();
    let (nodes, edges) = actors_and_others();
    engine.load_graph(nodes, edges).expect("valid graph");
    engine
        .set_filter(FilterConfig::default().with_types(["Tool"]))
        .expect("valid filter");

    let err = engine
        .set_filter(FilterConfig::default().with_types(["Spaceship"]))
        .expect_err("unknown type");
    assert!(matches!(
        err,
        Error::Config(ConfigError::UnknownType { .. })
    ));
    assert_eq!(engine.filter(), &FilterConfig::default().with_types(["Tool"]));
    assert_eq!(engine.visible().visible_nodes.len(), 5);
}

#[test]
fn set_filter_is_idempotent() {
    let mut engine = Engine::new();
    let (nodes, edges) = actors_and_others();
    engine.load_graph(nodes, edges).expect("valid graph");
    let filter = FilterConfig::default().with_types(["Actor", "Forum"]);

    engine.set_filter(filter.clone()).expect("valid filter");
    let (visible, legend, layout) = (
        engine.visible().clone(),
        engine.legend(),
        engine.layout().clone(),
    );
    let revision = engine.revision();

    engine.set_filter(filter).expect("valid filter");
    assert_eq!(engine.visible(), &visible);
    assert_eq!(engine.legend(), legend);
    assert_eq!(engine.layout(), &layout);
    assert_eq!(engine.revision(), revision);
}

#[test]
fn legend_totals_ignore_the_filter() {
    let mut engine = Engine::new();
    let (nodes, edges) = actors_and_others();
    engine.load_graph(nodes, edges).expect("valid graph");
    engine
        .set_filter(FilterConfig::default().with_severity_min(Severity::Critical))
        .expect("valid filter");

    assert!(engine.visible().visible_nodes.is_empty());
    let legend = engine.legend();
    assert_eq!(legend.iter().map(|e| e.count).sum::<usize>(), 25);
    assert_eq!(legend[0].entity_type.as_str(), "Actor");
    assert_eq!(legend[0].count, 5);
}

#[test]
fn layouts_are_deterministic_across_engines() {
    let build = || {
        let mut engine = Engine::new();
        let (nodes, edges) = actors_and_others();
        engine.load_graph(nodes, edges).expect("valid graph");
        engine.layout().clone()
    };
    assert_eq!(build(), build());
}

#[test]
fn clicking_a_node_selects_it_and_makes_it_focal() {
    let mut engine = Engine::new();
    let (nodes, edges) = star(6);
    engine
        .load_graph(
            nodes
                .into_iter()
                .map(|n| {
                    let seen = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single();
                    match seen {
                        Some(ts) => n.with_last_seen(ts),
                        None => n,
                    }
                })
                .collect(),
            edges,
        )
        .expect("valid graph");
    assert_eq!(engine.layout().focal.as_deref(), Some("SC"));

    let at = engine.layout().position("t03").expect("placed");
    press(&mut engine, at);

    assert_eq!(engine.selected_node().map(|e| e.id.as_str()), Some("t03"));
    assert_eq!(engine.layout().focal.as_deref(), Some("t03"));
    assert_eq!(engine.layout().position("t03"), Some(Point::ORIGIN));

    let details = engine.selected_details().expect("selection");
    assert_eq!(details.connections, 1);
    assert_eq!(details.neighbors, vec!["SC".to_string()]);
    assert!(details.entity.last_seen.is_some());

    let list = engine.draw_list();
    assert!(matches!(
        list.iter().last(),
        Some(DrawPrimitive::SelectionHighlight { id, .. }) if id == "t03"
    ));
}

#[test]
fn background_click_deselects_but_keeps_the_focal_node() {
    let mut engine = Engine::new();
    let (nodes, edges) = star(4);
    engine.load_graph(nodes, edges).expect("valid graph");
    let at = engine.layout().position("t01").expect("placed");
    press(&mut engine, at);
    assert!(engine.selected_node().is_some());

    press(&mut engine, Point::new(5000.0, 5000.0));
    assert!(engine.selected_node().is_none());
    assert_eq!(engine.layout().focal.as_deref(), Some("t01"));

    engine.set_focal_node(None).expect("layout ok");
    assert_eq!(engine.layout().focal.as_deref(), Some("SC"));
}

#[test]
fn filtering_out_the_selection_clears_it() {
    let mut engine = Engine::new();
    let (nodes, edges) = star(4);
    engine.load_graph(nodes, edges).expect("valid graph");
    press(&mut engine, Point::ORIGIN);
    assert_eq!(engine.selected_node().map(|e| e.id.as_str()), Some("SC"));

    engine
        .set_filter(FilterConfig::default().with_types(["Tool"]))
        .expect("valid filter");
    assert!(engine.selected_node().is_none());
    assert!(engine.viewport().selected_node_id().is_none());
}

#[test]
fn stale_layout_results_are_discarded() {
    let mut engine = Engine::new();
    let (nodes, edges) = star(5);
    engine.load_graph(nodes, edges).expect("valid graph");

    let first = engine.prepare_layout();
    let second = engine.prepare_layout();
    assert!(second.generation() > first.generation());

    let late = std::thread::spawn(move || first.run())
        .join()
        .expect("layout thread");
    assert!(!engine.commit_layout(late).expect("stale outcome is not an error"));
    assert!(engine.commit_layout(second.run()).expect("latest outcome"));
}

#[test]
fn subscribers_fire_only_when_the_picture_changes() {
    let mut engine = Engine::new();
    let calls = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&calls);
    let id = engine.subscribe(move |_revision| seen.set(seen.get() + 1));

    let (nodes, edges) = star(4);
    engine.load_graph(nodes, edges).expect("valid graph");
    assert_eq!(calls.get(), 1);

    engine.set_filter(FilterConfig::default()).expect("valid filter");
    assert_eq!(calls.get(), 1);

    engine.handle_wheel_event(WheelEvent::new(-100.0));
    assert_eq!(calls.get(), 2);

    engine.reset_view();
    assert_eq!(calls.get(), 3);
    engine.reset_view();
    assert_eq!(calls.get(), 3);

    assert!(engine.unsubscribe(id));
    assert!(!engine.unsubscribe(id));
    engine.zoom_in();
    assert_eq!(calls.get(), 3);
    engine.dispose();
}

#[test]
fn revision_is_passed_to_subscribers() {
    let mut engine = Engine::new();
    let last = Rc::new(Cell::new(0u64));
    let sink = Rc::clone(&last);
    engine.subscribe(move |revision| sink.set(revision));

    let (nodes, edges) = star(2);
    engine.load_graph(nodes, edges).expect("valid graph");
    engine.zoom_in();
    engine.zoom_out();
    assert_eq!(last.get(), engine.revision());
    assert_eq!(engine.revision(), 3);
}

#[test]
fn svg_export_contains_every_visible_node() {
    let mut engine = Engine::new();
    let (nodes, edges) = star(3);
    engine.load_graph(nodes, edges).expect("valid graph");
    let svg = engine.export_svg(&SvgOptions::default());
    assert_eq!(svg.matches(r#"<g class="node""#).count(), 4);
    assert_eq!(svg.matches("<line ").count(), 3);
}

#[test]
fn select_node_ignores_hidden_ids() {
    let mut engine = Engine::new();
    let (nodes, edges) = star(3);
    engine.load_graph(nodes, edges).expect("valid graph");
    engine
        .set_filter(FilterConfig::default().with_types(["Tool"]))
        .expect("valid filter");

    assert!(!engine.select_node(Some("SC")).expect("no layout error"));
    assert!(!engine.select_node(Some("ghost")).expect("no layout error"));
    assert!(engine.select_node(Some("t02")).expect("selected"));
    assert_eq!(engine.layout().focal.as_deref(), Some("t02"));
    assert!(engine.select_node(None).expect("deselected"));
    assert!(engine.selected_node().is_none());
}

fn drawn_position(engine: &Engine, id: &str) -> Option<Point> {
    match engine.draw_list().node(id) {
        Some(DrawPrimitive::Node { position, .. }) => Some(*position),
        _ => None,
    }
}

fn engine_with_dragging() -> Engine {
    let config = EngineConfig::from_value(&json!({
        "layout": { "jitter": 0.0 },
        "viewport": { "drag_nodes": true }
    }))
    .expect("valid config");
    Engine::with_config(config).expect("valid config")
}

#[test]
fn dragged_node_follows_the_pointer() {
    let mut engine = engine_with_dragging();
    let (nodes, edges) = star(6);
    engine.load_graph(nodes, edges).expect("valid graph");
    assert_eq!(engine.layout().focal.as_deref(), Some("SC"));

    let start = drawn_position(&engine, "t02").expect("drawn");
    engine
        .handle_pointer_event(PointerEvent::Down { position: start })
        .expect("pointer down");
    assert_eq!(engine.selected_node().map(|e| e.id.as_str()), Some("t02"));
    assert_eq!(engine.layout().focal.as_deref(), Some("SC"));

    let target = Point::new(start.x + 10.0, start.y);
    engine
        .handle_pointer_event(PointerEvent::Move { position: target })
        .expect("pointer move");
    let drawn = drawn_position(&engine, "t02").expect("drawn");
    assert!(drawn.distance(&target) < 1e-9);

    let target = Point::new(start.x + 20.0, start.y - 5.0);
    engine
        .handle_pointer_event(PointerEvent::Up { position: target })
        .expect("pointer up");
    let drawn = drawn_position(&engine, "t02").expect("drawn");
    assert!(drawn.distance(&target) < 1e-9);
    assert_eq!(engine.layout().focal.as_deref(), Some("SC"));
    assert_eq!(engine.selected_node().map(|e| e.id.as_str()), Some("t02"));
}

#[test]
fn pressing_without_dragging_still_refocuses() {
    let mut engine = engine_with_dragging();
    let (nodes, edges) = star(6);
    engine.load_graph(nodes, edges).expect("valid graph");

    let at = drawn_position(&engine, "t04").expect("drawn");
    press(&mut engine, at);
    assert_eq!(engine.layout().focal.as_deref(), Some("t04"));
    assert_eq!(engine.layout().position("t04"), Some(Point::ORIGIN));
}

#[test]
fn hover_is_recomputed_after_a_relayout() {
    let mut engine = engine_without_jitter();
    let (nodes, edges) = star(6);
    engine.load_graph(nodes, edges).expect("valid graph");

    let at = engine.layout().position("t01").expect("placed");
    engine
        .handle_pointer_event(PointerEvent::Move { position: at })
        .expect("pointer move");
    assert_eq!(engine.hovered_node(), Some("t01"));

    press(&mut engine, at);
    assert_eq!(engine.layout().focal.as_deref(), Some("t01"));

    let radius = engine.config().render.node_radius;
    let under_pointer = engine
        .layout()
        .positions
        .iter()
        .find(|(_, p)| p.distance(&at) <= radius)
        .map(|(id, _)| id.as_str());
    assert_ne!(engine.hovered_node(), Some("t01"));
    assert_eq!(engine.hovered_node(), under_pointer);
    let draw_list = engine.draw_list();
    let flagged: Vec<&str> = draw_list
        .iter()
        .filter_map(|p| match p {
            DrawPrimitive::Node {
                id, hovered: true, ..
            } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(flagged, under_pointer.into_iter().collect::<Vec<_>>());
}
