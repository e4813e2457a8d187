use std::collections::HashMap;
use std::path::Path;

use relroute::config::{Config, RoutingConfig};
use relroute::diagram::{Diagram, DiagramDocument, parse_document};
use relroute::drag::{DragController, DragEvent};
use relroute::error::RouteError;
use relroute::geometry::Point;
use relroute::highlight::SelectionSnapshot;
use relroute::path_dump::PathDump;
use relroute::routing::{EdgePath, PathStrategy};
use relroute::viewport::Viewport;
use relroute::{PairPalette, render_document};

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> DiagramDocument {
    let input = std::fs::read_to_string(fixture_path(name)).expect("fixture read failed");
    parse_document(&input).expect("fixture parse failed")
}

fn route_by_id(diagram: &Diagram, drag: &DragController) -> HashMap<String, EdgePath> {
    diagram
        .route(&RoutingConfig::default(), drag)
        .into_iter()
        .map(|path| (path.edge_id.clone(), path))
        .collect()
}

#[test]
fn parallel_pair_fans_out_symmetrically() {
    let diagram = Diagram::from_document(&load_fixture("parallel_pair.json"));
    let paths = route_by_id(&diagram, &DragController::new());

    let p0 = &paths["p0"];
    let p1 = &paths["p1"];
    assert_eq!(p0.start, Point::new(0.0, -12.5));
    assert_eq!(p0.end(), Point::new(300.0, -12.5));
    assert_eq!(p1.start, Point::new(0.0, 12.5));
    assert_eq!(p1.end(), Point::new(300.0, 12.5));
    assert_eq!(p0.strategy, PathStrategy::Straight);
    assert_eq!(p1.strategy, PathStrategy::Straight);
    assert_eq!(p0.label_anchor.x, p1.label_anchor.x);
    assert_eq!(p1.label_anchor.y - p0.label_anchor.y, 25.0);
}

#[test]
fn orthogonal_drag_snaps_and_commits() {
    let mut diagram = Diagram::from_document(&load_fixture("orthogonal_drag.json"));
    let config = RoutingConfig::default();
    let viewport = Viewport::default();
    let mut drag = DragController::new();

    let handle = diagram.handle_position("o", &config).expect("handle");
    assert_eq!(handle, Point::new(150.0, 0.0));

    let started = drag.start("o", handle, Point::new(150.0, 0.0), &viewport);
    assert!(matches!(started, Some(DragEvent::Started { .. })));
    assert_eq!(drag.session().map(|s| s.pointer_offset), Some(Point::new(0.0, 0.0)));

    drag.on_move("o", Point::new(160.0, 5.0), &viewport);
    assert_eq!(drag.live_point("o"), Some(Point::new(160.0, 5.0)));
    let live = diagram.route_edge("o", &config, &drag).expect("routed");
    assert_eq!(live.handle, Some(Point::new(160.0, 5.0)), "far from both anchors, nothing snaps");

    drag.on_move("o", Point::new(5.0, 5.0), &viewport);
    let live = diagram.route_edge("o", &config, &drag).expect("routed");
    assert_eq!(live.handle, Some(Point::new(0.0, 5.0)), "only X snaps onto the source anchor");

    let commit = drag.end("o", Point::new(5.0, 5.0), &viewport).expect("commit");
    diagram.apply(&commit, &config).expect("apply");
    assert!(!drag.is_dragging());
    assert_eq!(
        diagram.edge("o").and_then(|e| e.custom_control_point),
        Some(Point::new(0.0, 5.0))
    );
    let settled = diagram.route_edge("o", &config, &drag).expect("routed");
    assert_eq!(settled.handle, Some(Point::new(0.0, 0.0)));

    let reset = drag.reset("o");
    diagram.apply(&reset, &config).expect("apply");
    assert_eq!(diagram.handle_position("o", &config), Some(Point::new(150.0, 0.0)));
}

#[test]
fn drag_through_a_zoomed_viewport_keeps_the_grab_offset() {
    let diagram = Diagram::from_document(&load_fixture("orthogonal_drag.json"));
    let config = RoutingConfig::default();
    let viewport = Viewport::new(50.0, 20.0, 2.0);
    let mut drag = DragController::new();

    let handle = diagram.handle_position("o", &config).expect("handle");
    // Grab 10 screen px to the right of the handle.
    let grab = viewport.model_to_screen(handle);
    let grab = Point::new(grab.x + 10.0, grab.y);
    drag.start("o", handle, grab, &viewport);
    drag.on_move("o", Point::new(grab.x + 100.0, grab.y), &viewport);
    assert_eq!(drag.live_point("o"), Some(Point::new(200.0, 0.0)));
}

#[test]
fn every_merge_group_has_exactly_one_trunk() {
    let diagram = Diagram::from_document(&load_fixture("merge_groups.json"));
    let paths = diagram.route(&RoutingConfig::default(), &DragController::new());

    assert_eq!(diagram.merge_groups().len(), 3);
    for group in diagram.merge_groups().groups() {
        let trunks: Vec<&EdgePath> = paths
            .iter()
            .filter(|p| p.trunk.as_ref().is_some_and(|t| t.group_id == group.id))
            .collect();
        assert_eq!(trunks.len(), 1, "group {}", group.id);
        assert_eq!(trunks[0].edge_id, group.trunk_owner);
        for member in &group.members {
            let path = paths.iter().find(|p| &p.edge_id == member).expect("member routed");
            assert_eq!(path.strategy, PathStrategy::Merged);
            assert_eq!(path.end(), group.merge_point);
        }
    }

    let groups = diagram.merge_groups();
    assert!(groups.owns_trunk("a"));
    assert!(groups.owns_trunk("x1"), "first claimant keeps the trunk");
    assert!(!groups.owns_trunk("x2"));
    assert!(groups.owns_trunk("y1"), "ownerless group falls back to its first member");
}

#[test]
fn malformed_merge_groups_are_reported() {
    let diagram = Diagram::from_document(&load_fixture("merge_groups.json"));
    let problems = diagram.validate();
    assert!(problems.iter().any(|p| matches!(
        p,
        RouteError::MultipleTrunkOwners { group_id, .. } if group_id == "h"
    )));
    assert!(problems.contains(&RouteError::MissingTrunkOwner {
        group_id: "k".to_string(),
    }));
    assert!(!problems.iter().any(|p| matches!(
        p,
        RouteError::MultipleTrunkOwners { group_id, .. } | RouteError::MissingTrunkOwner { group_id }
            if group_id == "g"
    )));
}

#[test]
fn selecting_one_source_lights_the_whole_group() {
    let diagram = Diagram::from_document(&load_fixture("merge_groups.json"));
    let selection = SelectionSnapshot::with_nodes(["B"]);
    let frame = diagram.frame(&RoutingConfig::default(), &DragController::new(), &selection, None);
    let by_id: HashMap<&str, _> = frame
        .iter()
        .map(|r| (r.path.edge_id.as_str(), r.highlight))
        .collect();

    for id in ["a", "b", "c"] {
        assert!(by_id[id].merge_dot, "{id}");
        assert!(by_id[id].shared_trunk, "{id}");
    }
    assert!(by_id["b"].edge);
    assert!(!by_id["a"].edge);
    assert!(!by_id["x1"].merge_dot, "group h has no member touching B");
}

#[test]
fn routing_without_drag_is_idempotent() {
    for name in ["parallel_pair.json", "merge_groups.json", "editor_session.json5"] {
        let diagram = Diagram::from_document(&load_fixture(name));
        let drag = DragController::new();
        let first = diagram.route(&RoutingConfig::default(), &drag);
        let second = diagram.route(&RoutingConfig::default(), &drag);
        assert_eq!(first, second, "{name}");
    }
}

#[test]
fn cancelled_drag_leaves_no_trace() {
    let diagram = Diagram::from_document(&load_fixture("orthogonal_drag.json"));
    let before = route_by_id(&diagram, &DragController::new());

    let mut drag = DragController::new();
    drag.start("o", Point::new(150.0, 0.0), Point::new(150.0, 0.0), &Viewport::default());
    drag.on_move("o", Point::new(220.0, 40.0), &Viewport::default());
    assert_ne!(route_by_id(&diagram, &drag)["o"], before["o"]);
    assert!(drag.cancel());
    assert_eq!(route_by_id(&diagram, &drag)["o"], before["o"]);
    assert_eq!(diagram.edge("o").and_then(|e| e.custom_control_point), None);
}

#[test]
fn editor_session_uses_every_curve_strategy() {
    let document = load_fixture("editor_session.json5");
    assert_eq!(document.viewport, Viewport::new(20.0, 10.0, 1.5));
    let diagram = Diagram::from_document(&document);
    let paths = route_by_id(&diagram, &DragController::new());

    assert_eq!(paths["lives"].strategy, PathStrategy::SmoothCurve);
    assert_eq!(paths["plays"].strategy, PathStrategy::CustomCurve);
    assert_eq!(paths["plays"].handle, Some(Point::new(260.0, 90.0)));
    assert_eq!(paths["owns"].strategy, PathStrategy::Orthogonal);
    assert_eq!(paths["twin0"].strategy, PathStrategy::Straight);
}

#[test]
fn assigned_parallel_lanes_change_the_route() {
    let mut diagram = Diagram::from_document(&load_fixture("editor_session.json5"));
    diagram.assign_parallel_slots();
    assert_eq!(diagram.edge("twin1").map(|e| (e.parallel_index, e.parallel_count)), Some((1, 2)));

    let paths = route_by_id(&diagram, &DragController::new());
    assert_eq!(paths["twin0"].strategy, PathStrategy::Orthogonal);
    assert_eq!(paths["twin1"].start.x - paths["twin0"].start.x, 25.0);
    assert_eq!(paths["lives"].strategy, PathStrategy::SmoothCurve);
}

#[test]
fn render_all_fixtures() {
    let config = Config::default();
    for name in [
        "parallel_pair.json",
        "orthogonal_drag.json",
        "merge_groups.json",
        "editor_session.json5",
    ] {
        let input = std::fs::read_to_string(fixture_path(name)).expect("fixture read failed");
        let svg = render_document(&input, &config).expect("render failed");
        assert!(svg.contains("<svg"), "{name}: missing <svg tag");
        assert!(svg.contains("</svg>"), "{name}: missing </svg tag");
    }
}

#[test]
fn multiplicities_are_rendered_off_the_stroke() {
    let document = load_fixture("editor_session.json5");
    let diagram = Diagram::from_document(&document);
    let frame = diagram.frame(
        &RoutingConfig::default(),
        &DragController::new(),
        &document.selection,
        None,
    );
    let lives = frame.iter().find(|r| r.path.edge_id == "lives").expect("lives");
    let source = lives.multiplicity.source.expect("source label anchor");
    assert_ne!(source, lives.path.start);

    let svg = relroute::render::render_svg(
        &diagram,
        &frame,
        &Config::default().theme,
        &PairPalette::for_edges(diagram.edges()),
        &Config::default().render,
    );
    assert!(svg.contains(">0..*<"));
}

#[test]
fn path_dump_serializes_merge_groups() {
    let diagram = Diagram::from_document(&load_fixture("merge_groups.json"));
    let frame = diagram.frame(
        &RoutingConfig::default(),
        &DragController::new(),
        &SelectionSnapshot::default(),
        None,
    );
    let dump = serde_json::to_value(PathDump::from_frame(&diagram, &frame)).expect("dump");
    assert_eq!(dump["mergeGroups"].as_array().map(Vec::len), Some(3));
    assert_eq!(dump["edges"].as_array().map(Vec::len), Some(7));
    let owners: Vec<&str> = dump["edges"]
        .as_array()
        .into_iter()
        .flatten()
        .filter(|e| !e["trunk"].is_null())
        .filter_map(|e| e["id"].as_str())
        .collect();
    assert_eq!(owners, vec!["a", "x1", "y1"]);
}
