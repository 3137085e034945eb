use super::*;
use crate::connector::def::ConnectorDef;
use crate::geometry::anchor::Anchor;
use crate::geometry::waypoint::Waypoint;
use crate::host::headless::{HeadlessElement, HeadlessHost};

type El = Rc<HeadlessElement>;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::from_origin_size((x, y), (w, h))
}

fn registry() -> Rc<ConnectorRegistry> {
    Rc::new(
        ConnectorRegistry::new(vec![
            ConnectorDef::new("a-b", "a", "b").anchors(Anchor::RIGHT, Anchor::LEFT),
            ConnectorDef::new("b-c", "b", "c")
                .step(1)
                .delay(0.4)
                .anchors(Anchor::BOTTOM, Anchor::TOP)
                .via(Waypoint::branch(0.5)),
            ConnectorDef::new("c-d", "c", "d").step(2).without_arrow(),
        ])
        .unwrap(),
    )
}

struct Fixture {
    host: HeadlessHost,
    nodes: NodeTracker<El>,
    engine: LayoutEngine<El>,
}

fn fixture() -> Fixture {
    let nodes = NodeTracker::new();
    let engine = LayoutEngine::new(registry(), nodes.clone());
    Fixture {
        host: HeadlessHost::new(),
        nodes,
        engine,
    }
}

impl Fixture {
    fn mount(&self, id: &str, bounds: Rect) -> El {
        let el = self.host.create_element(bounds);
        self.nodes.register(id).mount(Rc::clone(&el));
        el
    }

    fn mount_abc(&self) {
        self.mount("a", rect(0.0, 0.0, 10.0, 10.0));
        self.mount("b", rect(100.0, 0.0, 10.0, 10.0));
        self.mount("c", rect(50.0, 100.0, 10.0, 10.0));
    }

    fn ids(&self) -> Vec<String> {
        self.engine
            .connectors()
            .iter()
            .map(|c| c.id.0.clone())
            .collect()
    }
}

#[test]
fn straight_connector_between_side_anchors() {
    let reg = registry();
    let boxes = |id: &NodeId| match id.as_str() {
        "a" => Some(rect(0.0, 0.0, 10.0, 10.0)),
        "b" => Some(rect(100.0, 0.0, 10.0, 10.0)),
        _ => None,
    };
    let out = compute_connectors(&reg, rect(0.0, 0.0, 200.0, 200.0), boxes);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].path, "M 10 5 L 100 5");
    assert!(out[0].with_arrow);
}

#[test]
fn branch_waypoints_sit_between_resolved_anchors() {
    let reg = registry();
    let boxes = |id: &NodeId| match id.as_str() {
        "b" => Some(rect(100.0, 0.0, 10.0, 10.0)),
        "c" => Some(rect(50.0, 100.0, 10.0, 10.0)),
        _ => None,
    };
    let out = compute_connectors(&reg, rect(0.0, 0.0, 200.0, 200.0), boxes);
    let bc = &out[0];
    assert_eq!(
        bc.points,
        vec![
            Point::new(105.0, 10.0),
            Point::new(105.0, 55.0),
            Point::new(55.0, 55.0),
            Point::new(55.0, 100.0),
        ]
    );
    assert_eq!(bc.path, "M 105 10 L 105 55 L 55 55 L 55 100");
    assert_eq!(bc.step_index, 1);
    assert_eq!(bc.delay, 0.4);
}

#[test]
fn branch_from_center_anchor_splits_at_half_span() {
    let reg = ConnectorRegistry::new(vec![
        ConnectorDef::new("b-c", "b", "c")
            .anchors(Anchor::CENTER, Anchor::TOP)
            .via(Waypoint::branch(0.5)),
    ])
    .unwrap();
    let boxes = |id: &NodeId| match id.as_str() {
        "b" => Some(rect(100.0, 0.0, 10.0, 10.0)),
        "c" => Some(rect(50.0, 100.0, 10.0, 10.0)),
        _ => None,
    };
    let out = compute_connectors(&reg, rect(0.0, 0.0, 200.0, 200.0), boxes);
    assert_eq!(out[0].points[1], Point::new(105.0, 52.5));
}

#[test]
fn output_is_relative_to_container_origin() {
    let reg = registry();
    let boxes = |id: &NodeId| match id.as_str() {
        "a" => Some(rect(20.0, 30.0, 10.0, 10.0)),
        "b" => Some(rect(120.0, 30.0, 10.0, 10.0)),
        _ => None,
    };
    let out = compute_connectors(&reg, rect(20.0, 30.0, 200.0, 200.0), boxes);
    assert_eq!(out[0].path, "M 10 5 L 100 5");
}

#[test]
fn nothing_published_without_container() {
    let f = fixture();
    f.mount_abc();
    assert_eq!(f.engine.generation(), 0);
    assert!(f.engine.connectors().is_empty());
    assert!(!f.engine.handle(Trigger::WindowResize));
}

#[test]
fn container_mount_recomputes_eagerly() {
    let f = fixture();
    f.mount_abc();
    f.engine
        .set_container(Some(f.host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    assert_eq!(f.engine.generation(), 1);
    assert_eq!(f.ids(), ["a-b", "b-c"]);
}

#[test]
fn clearing_container_keeps_previous_output() {
    let f = fixture();
    f.mount_abc();
    f.engine
        .set_container(Some(f.host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    f.engine.set_container(None);
    assert!(f.engine.container().is_none());
    assert!(!f.engine.handle(Trigger::WindowResize));
    assert_eq!(f.ids(), ["a-b", "b-c"]);
}

#[test]
fn unmounted_endpoints_are_omitted_and_return_when_mounted() {
    let f = fixture();
    f.engine
        .set_container(Some(f.host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    f.mount_abc();
    assert_eq!(f.ids(), ["a-b", "b-c"]);

    f.nodes.register("b").unmount();
    assert!(f.ids().is_empty());

    f.mount("b", rect(100.0, 0.0, 10.0, 10.0));
    f.mount("d", rect(0.0, 150.0, 10.0, 10.0));
    assert_eq!(f.ids(), ["a-b", "b-c", "c-d"]);
}

#[test]
fn redundant_registration_does_not_recompute() {
    let f = fixture();
    f.engine
        .set_container(Some(f.host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    let a = f.mount("a", rect(0.0, 0.0, 10.0, 10.0));
    let generation = f.engine.generation();

    f.nodes.register("a").mount(Rc::clone(&a));
    f.nodes.register("a").mount(a);
    assert!(!f.engine.handle(Trigger::Registration));
    assert_eq!(f.engine.generation(), generation);
}

#[test]
fn detached_engine_ignores_registrations() {
    let f = fixture();
    f.engine
        .set_container(Some(f.host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    f.engine.detach();
    let generation = f.engine.generation();

    f.mount_abc();
    assert_eq!(f.engine.generation(), generation);
    assert!(f.ids().is_empty());

    assert!(f.engine.handle(Trigger::WindowResize));
    assert_eq!(f.ids(), ["a-b", "b-c"]);
}

#[test]
fn node_resize_republishes_new_geometry() {
    let f = fixture();
    f.engine
        .set_container(Some(f.host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    f.mount_abc();
    let before = f.engine.connectors();

    f.nodes
        .element("a")
        .unwrap()
        .set_bounds(rect(0.0, 0.0, 20.0, 10.0));
    assert!(f.engine.handle(Trigger::NodeResize));

    let after = f.engine.connectors();
    assert_eq!(after[0].path, "M 20 5 L 100 5");
    // Earlier snapshots are untouched by the replacement.
    assert_eq!(before[0].path, "M 10 5 L 100 5");
}

#[test]
fn reentrant_triggers_are_coalesced() {
    let f = fixture();
    f.mount_abc();

    let engine = f.engine.clone();
    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);
    let _sub = f.engine.subscribe(Rc::new(move || {
        if !flag.replace(true) {
            assert!(!engine.handle(Trigger::ContainerResize));
        }
    }));

    f.engine
        .set_container(Some(f.host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    assert!(fired.get());
    assert_eq!(f.engine.generation(), 2);
    assert_eq!(f.engine.connectors().len(), 2);
}

#[test]
fn output_size_matches_connectors_with_both_endpoints() {
    let f = fixture();
    f.engine
        .set_container(Some(f.host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    let steps: [(&str, Option<Rect>); 6] = [
        ("c", Some(rect(50.0, 100.0, 10.0, 10.0))),
        ("d", Some(rect(0.0, 150.0, 10.0, 10.0))),
        ("a", Some(rect(0.0, 0.0, 10.0, 10.0))),
        ("b", Some(rect(100.0, 0.0, 10.0, 10.0))),
        ("c", None),
        ("a", None),
    ];
    for (id, bounds) in steps {
        match bounds {
            Some(b) => {
                f.mount(id, b);
            }
            None => {
                f.nodes.register(id).unmount();
            }
        }
        let expected = f
            .engine
            .registry()
            .defs()
            .iter()
            .filter(|d| {
                f.nodes.element(d.from.as_str()).is_some()
                    && f.nodes.element(d.to.as_str()).is_some()
            })
            .count();
        assert_eq!(f.engine.connectors().len(), expected, "after step {id}");
    }
}
