use super::*;
use crate::connector::def::ConnectorDef;
use crate::connector::registry::ConnectorRegistry;
use crate::foundation::core::Rect;
use crate::geometry::anchor::Anchor;
use crate::host::headless::{HeadlessElement, HeadlessHost};

type El = Rc<HeadlessElement>;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::from_origin_size((x, y), (w, h))
}

fn setup(
    host: HeadlessHost,
) -> (
    Rc<HeadlessHost>,
    NodeTracker<El>,
    LayoutEngine<El>,
    LayoutObservers<HeadlessHost>,
) {
    let host = Rc::new(host);
    let registry = Rc::new(
        ConnectorRegistry::new(vec![
            ConnectorDef::new("a-b", "a", "b").anchors(Anchor::RIGHT, Anchor::LEFT),
        ])
        .unwrap(),
    );
    let nodes = NodeTracker::new();
    let engine = LayoutEngine::new(registry, nodes.clone());
    let observers = LayoutObservers::attach(Rc::clone(&host), engine.clone(), nodes.clone());
    (host, nodes, engine, observers)
}

#[test]
fn node_box_resize_recomputes_without_window_resize() {
    let (host, nodes, engine, observers) = setup(HeadlessHost::new());
    observers.set_container(Some(host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    let a = host.create_element(rect(0.0, 0.0, 10.0, 10.0));
    nodes.register("a").mount(Rc::clone(&a));
    nodes
        .register("b")
        .mount(host.create_element(rect(100.0, 0.0, 10.0, 10.0)));
    assert_eq!(observers.observed_nodes(), 2);
    assert_eq!(engine.connectors()[0].path, "M 10 5 L 100 5");

    a.set_bounds(rect(0.0, 0.0, 30.0, 10.0));
    assert_eq!(engine.connectors()[0].path, "M 30 5 L 100 5");
}

#[test]
fn container_resize_and_window_resize_both_recompute() {
    let (host, nodes, engine, observers) = setup(HeadlessHost::new());
    let container = host.create_element(rect(0.0, 0.0, 200.0, 200.0));
    observers.set_container(Some(Rc::clone(&container)));
    nodes
        .register("a")
        .mount(host.create_element(rect(0.0, 0.0, 10.0, 10.0)));
    let generation = engine.generation();

    container.set_bounds(rect(0.0, 0.0, 300.0, 200.0));
    assert_eq!(engine.generation(), generation + 1);
    host.resize_window();
    assert_eq!(engine.generation(), generation + 2);
}

#[test]
fn unmount_releases_node_observer() {
    let (host, nodes, _engine, observers) = setup(HeadlessHost::new());
    let a = host.create_element(rect(0.0, 0.0, 10.0, 10.0));
    nodes.register("a").mount(Rc::clone(&a));
    assert_eq!(a.observer_count(), 1);

    let replacement = host.create_element(rect(0.0, 0.0, 10.0, 10.0));
    nodes.register("a").mount(Rc::clone(&replacement));
    assert_eq!(a.observer_count(), 0);
    assert_eq!(replacement.observer_count(), 1);

    nodes.register("a").unmount();
    assert_eq!(replacement.observer_count(), 0);
    assert_eq!(observers.observed_nodes(), 0);
}

#[test]
fn degraded_host_still_follows_window_resizes() {
    let (host, nodes, engine, observers) = setup(HeadlessHost::without_box_observation());
    observers.set_container(Some(host.create_element(rect(0.0, 0.0, 200.0, 200.0))));
    let a = host.create_element(rect(0.0, 0.0, 10.0, 10.0));
    nodes.register("a").mount(Rc::clone(&a));
    nodes
        .register("b")
        .mount(host.create_element(rect(100.0, 0.0, 10.0, 10.0)));
    assert_eq!(observers.observed_nodes(), 0);

    a.set_bounds(rect(0.0, 0.0, 30.0, 10.0));
    assert_eq!(engine.connectors()[0].path, "M 10 5 L 100 5");
    host.resize_window();
    assert_eq!(engine.connectors()[0].path, "M 30 5 L 100 5");
}

#[test]
fn detach_releases_everything() {
    let (host, nodes, engine, observers) = setup(HeadlessHost::new());
    let container = host.create_element(rect(0.0, 0.0, 200.0, 200.0));
    observers.set_container(Some(Rc::clone(&container)));
    let a = host.create_element(rect(0.0, 0.0, 10.0, 10.0));
    nodes.register("a").mount(Rc::clone(&a));

    observers.detach();
    assert_eq!(host.window_listeners(), 0);
    assert_eq!(container.observer_count(), 0);
    assert_eq!(a.observer_count(), 0);

    let generation = engine.generation();
    nodes
        .register("b")
        .mount(host.create_element(rect(100.0, 0.0, 10.0, 10.0)));
    // The engine itself still follows registrations; only resize observation stopped.
    assert_eq!(engine.generation(), generation + 1);
    assert_eq!(a.observer_count(), 0);
}
