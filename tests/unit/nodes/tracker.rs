use super::*;
use crate::foundation::core::Rect;
use crate::host::headless::{HeadlessElement, HeadlessHost};

type Tracker = NodeTracker<Rc<HeadlessElement>>;

#[test]
fn same_element_twice_does_not_bump_version() {
    let host = HeadlessHost::new();
    let tracker = Tracker::new();
    let el = host.create_element(Rect::new(0.0, 0.0, 10.0, 10.0));
    let reg = tracker.register("a");

    assert!(reg.mount(Rc::clone(&el)));
    assert_eq!(tracker.version(), 1);
    assert!(!reg.mount(Rc::clone(&el)));
    assert!(!reg.mount(el));
    assert_eq!(tracker.version(), 1);
}

#[test]
fn replacing_or_clearing_bumps_version() {
    let host = HeadlessHost::new();
    let tracker = Tracker::new();
    let reg = tracker.register("a");

    assert!(!reg.unmount());
    assert_eq!(tracker.version(), 0);

    reg.mount(host.create_element(Rect::ZERO));
    reg.mount(host.create_element(Rect::ZERO));
    assert_eq!(tracker.version(), 2);

    assert!(reg.unmount());
    assert_eq!(tracker.version(), 3);
    assert!(tracker.element("a").is_none());
    assert!(!reg.unmount());
    assert_eq!(tracker.version(), 3);
}

#[test]
fn registrations_are_stable_per_node() {
    let tracker = Tracker::new();
    assert_eq!(tracker.register("a"), tracker.register("a"));
    assert_ne!(tracker.register("a"), tracker.register("b"));
    assert_eq!(tracker.register("a").node().as_str(), "a");
}

#[test]
fn mounted_lists_live_elements_only() {
    let host = HeadlessHost::new();
    let tracker = Tracker::new();
    tracker.register("b").mount(host.create_element(Rect::ZERO));
    tracker.register("a").mount(host.create_element(Rect::ZERO));
    tracker.register("c").mount(host.create_element(Rect::ZERO));
    tracker.register("c").unmount();

    let ids: Vec<_> = tracker.mounted().into_iter().map(|(id, _)| id.0).collect();
    assert_eq!(ids, ["a", "b"]);
}

#[test]
fn subscribers_hear_each_change_once() {
    let host = HeadlessHost::new();
    let tracker = Tracker::new();
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    let _sub = tracker.subscribe(Rc::new(move || h.set(h.get() + 1)));

    let el = host.create_element(Rect::ZERO);
    let cb = tracker.register("a").into_callback();
    cb(Some(Rc::clone(&el)));
    cb(Some(el));
    cb(None);
    assert_eq!(hits.get(), 2);
}

#[test]
fn registration_outliving_tracker_is_inert() {
    let host = HeadlessHost::new();
    let reg = Tracker::new().register("a");
    assert!(!reg.mount(host.create_element(Rect::ZERO)));
}
