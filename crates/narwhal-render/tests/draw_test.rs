use narwhal_core::{InteractionController, PointerEvent, RenderSettings, ViewportSettings};
use narwhal_graph::{Entity, GraphStore, NodeShape, Relationship, Severity, TypeRegistry};
use narwhal_render::{DrawList, DrawPrimitive, RenderInput, SvgOptions, build_draw_list, render_svg};
use orca::Point;
use std::collections::BTreeMap;

struct Fixture {
    store: GraphStore,
    nodes: Vec<String>,
    edges: Vec<String>,
    positions: BTreeMap<String, Point>,
    settings: RenderSettings,
}

fn fixture() -> Fixture {
    let mut store = GraphStore::new(TypeRegistry::threat_intel_defaults());
    store
        .load(
            vec![
                Entity::new("sc", "Actor", "ShadowCorp").with_severity(Severity::Critical),
                Entity::new("loader", "Tool", "Loader <v2>"),
                Entity::new("bank", "Target", "Bank"),
                Entity::new("forum", "Forum", "XSS"),
            ],
            vec![
                Relationship::new("e1", "sc", "loader").with_label("uses"),
                Relationship::new("e2", "sc", "bank"),
                Relationship::new("e3", "loader", "forum"),
            ],
        )
        .expect("valid graph");
    let positions = [
        ("sc", 0.0, 0.0),
        ("loader", 240.0, 0.0),
        ("bank", -240.0, 0.0),
        ("forum", 360.0, 0.0),
    ]
    .into_iter()
    .map(|(id, x, y)| (id.to_string(), Point::new(x, y)))
    .collect();
    Fixture {
        store,
        nodes: ["bank", "forum", "loader", "sc"].map(String::from).to_vec(),
        edges: ["e1", "e2", "e3"].map(String::from).to_vec(),
        positions,
        settings: RenderSettings::default(),
    }
}

fn draw(f: &Fixture, c: &InteractionController) -> DrawList {
    build_draw_list(&RenderInput {
        store: &f.store,
        visible_nodes: &f.nodes,
        visible_edges: &f.edges,
        positions: &f.positions,
        viewport: c.viewport(),
        hovered: c.hovered(),
        settings: &f.settings,
    })
}

fn kinds(list: &DrawList) -> Vec<&'static str> {
    list.iter()
        .map(|p| match p {
            DrawPrimitive::Background { .. } => "background",
            DrawPrimitive::Edge { .. } => "edge",
            DrawPrimitive::Node { .. } => "node",
            DrawPrimitive::SelectionHighlight { .. } => "selection",
        })
        .collect()
}

fn ids(list: &DrawList, kind: &str) -> Vec<String> {
    list.iter()
        .filter_map(|p| match (kind, p) {
            ("edge", DrawPrimitive::Edge { id, .. }) | ("node", DrawPrimitive::Node { id, .. }) => {
                Some(id.clone())
            }
            _ => None,
        })
        .collect()
}

#[test]
fn primitives_are_ordered_background_edges_nodes() {
    let f = fixture();
    let c = InteractionController::new(ViewportSettings::default(), 14.0);
    let list = draw(&f, &c);
    assert_eq!(
        kinds(&list),
        vec!["background", "edge", "edge", "edge", "node", "node", "node", "node"]
    );
    assert_eq!(ids(&list, "edge"), vec!["e1", "e2", "e3"]);
    assert_eq!(ids(&list, "node"), vec!["bank", "forum", "loader", "sc"]);
}

#[test]
fn nodes_carry_type_style_and_severity_ring() {
    let f = fixture();
    let c = InteractionController::new(ViewportSettings::default(), 14.0);
    let list = draw(&f, &c);
    match list.node("sc") {
        Some(DrawPrimitive::Node {
            shape, fill, ring, ..
        }) => {
            assert_eq!(*shape, NodeShape::Circle);
            assert_eq!(fill, "#ef4444");
            assert_eq!(ring.as_deref(), Some("#ef4444"));
        }
        other => panic!("unexpected primitive: {other:?}"),
    }
    match list.node("bank") {
        Some(DrawPrimitive::Node { shape, ring, .. }) => {
            assert_eq!(*shape, NodeShape::Hexagon);
            assert!(ring.is_none());
        }
        other => panic!("unexpected primitive: {other:?}"),
    }
}

#[test]
fn selection_highlights_neighbors_and_dims_the_rest() {
    let f = fixture();
    let mut c = InteractionController::new(ViewportSettings::default(), 14.0);
    c.handle_pointer(
        PointerEvent::Down {
            position: Point::ORIGIN,
        },
        &f.positions,
    );
    assert_eq!(c.selected(), Some("sc"));

    let list = draw(&f, &c);
    assert_eq!(kinds(&list).last(), Some(&"selection"));
    for p in list.iter() {
        match p {
            DrawPrimitive::Node {
                id,
                highlighted,
                dimmed,
                ..
            } => {
                let near = matches!(id.as_str(), "sc" | "loader" | "bank");
                assert_eq!(*highlighted, near, "{id}");
                assert_eq!(*dimmed, !near, "{id}");
            }
            DrawPrimitive::Edge {
                id, highlighted, ..
            } => assert_eq!(*highlighted, id != "e3", "{id}"),
            _ => {}
        }
    }
}

#[test]
fn coordinates_follow_the_view_transform() {
    let f = fixture();
    let mut c = InteractionController::new(ViewportSettings::default(), 14.0);
    c.zoom_by(2.0, None);
    c.handle_pointer(
        PointerEvent::Down {
            position: Point::new(900.0, 900.0),
        },
        &f.positions,
    );
    c.handle_pointer(
        PointerEvent::Move {
            position: Point::new(1000.0, 950.0),
        },
        &f.positions,
    );
    c.handle_pointer(
        PointerEvent::Up {
            position: Point::new(1000.0, 950.0),
        },
        &f.positions,
    );

    let list = draw(&f, &c);
    match list.node("loader") {
        Some(DrawPrimitive::Node {
            position, radius, ..
        }) => {
            assert_eq!(*position, Point::new(580.0, 50.0));
            assert_eq!(*radius, 28.0);
        }
        other => panic!("unexpected primitive: {other:?}"),
    }
}

#[test]
fn labels_disappear_when_zoomed_out() {
    let f = fixture();
    let mut c = InteractionController::new(ViewportSettings::default(), 14.0);
    c.zoom_by(0.2, None);
    let list = draw(&f, &c);
    assert!(list.iter().all(|p| match p {
        DrawPrimitive::Node { label, .. } | DrawPrimitive::Edge { label, .. } => label.is_none(),
        _ => true,
    }));
}

#[test]
fn draw_list_serializes_with_kind_tags() {
    let f = fixture();
    let c = InteractionController::new(ViewportSettings::default(), 14.0);
    let value = serde_json::to_value(draw(&f, &c)).expect("serializable");
    assert_eq!(value["primitives"][0]["kind"], "background");
    assert_eq!(value["primitives"][1]["kind"], "edge");
    assert_eq!(value["primitives"][4]["kind"], "node");
    assert_eq!(value["primitives"][4]["shape"], "hexagon");
}

#[test]
fn svg_export_escapes_labels() {
    let f = fixture();
    let c = InteractionController::new(ViewportSettings::default(), 14.0);
    let svg = render_svg(
        &draw(&f, &c),
        &SvgOptions {
            title: Some("Threat graph & friends".to_string()),
            ..Default::default()
        },
    );
    assert!(svg.contains("<title>Threat graph &amp; friends</title>"));
    assert!(svg.contains("Loader &lt;v2&gt;"));
    assert!(!svg.contains("Loader <v2>"));
    assert_eq!(svg.matches(r#"<g class="node""#).count(), 4);
    assert!(svg.contains("<polygon"));
}
