use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::{Rc, Weak},
    time::Duration,
};

use crate::{
    foundation::core::Rect,
    host::{BoxSource, Callback, DiagramHost, Subscription, listeners::ListenerSet},
};

/// An element living in a [`HeadlessHost`].
///
/// Box observers fire only when the size changes, matching browser resize-observer semantics:
/// a pure move is not a resize.
pub struct HeadlessElement {
    bounds: Cell<Rect>,
    observers: ListenerSet,
}

impl HeadlessElement {
    /// Current absolute box.
    pub fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    /// Move and/or resize the element.
    pub fn set_bounds(&self, bounds: Rect) {
        let old = self.bounds.replace(bounds);
        if old.size() != bounds.size() {
            self.observers.notify();
        }
    }

    /// Number of live box observers attached to this element.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl BoxSource for HeadlessElement {
    fn bounding_box(&self) -> Rect {
        self.bounds.get()
    }
}

impl std::fmt::Debug for HeadlessElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessElement")
            .field("bounds", &self.bounds.get())
            .finish()
    }
}

struct Timer {
    period_secs: f64,
    next_due_secs: f64,
    on_tick: Callback,
}

/// Deterministic host without a real view layer.
///
/// Time only moves through [`HeadlessHost::advance`], and window resizes only happen through
/// [`HeadlessHost::resize_window`], which makes diagram behaviour reproducible in tests and in
/// the CLI.
pub struct HeadlessHost {
    box_observation: bool,
    window: ListenerSet,
    now_secs: Cell<f64>,
    next_timer_id: Cell<u64>,
    timers: Rc<RefCell<BTreeMap<u64, Timer>>>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Host with box observation available.
    pub fn new() -> Self {
        Self {
            box_observation: true,
            window: ListenerSet::new(),
            now_secs: Cell::new(0.0),
            next_timer_id: Cell::new(0),
            timers: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    /// Host that cannot observe element boxes, only window resizes.
    pub fn without_box_observation() -> Self {
        Self {
            box_observation: false,
            ..Self::new()
        }
    }

    /// Create an element at `bounds`.
    pub fn create_element(&self, bounds: Rect) -> Rc<HeadlessElement> {
        Rc::new(HeadlessElement {
            bounds: Cell::new(bounds),
            observers: ListenerSet::new(),
        })
    }

    /// Fire window-resize listeners.
    pub fn resize_window(&self) {
        self.window.notify();
    }

    /// Elapsed host time in seconds.
    pub fn now_secs(&self) -> f64 {
        self.now_secs.get()
    }

    /// Number of running interval timers.
    pub fn active_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Number of window-resize listeners.
    pub fn window_listeners(&self) -> usize {
        self.window.len()
    }

    /// Advance host time, firing every timer tick that falls due, in due order.
    ///
    /// Timers are allowed to start or stop other timers from inside their callback.
    pub fn advance(&self, elapsed: Duration) {
        let target = self.now_secs.get() + elapsed.as_secs_f64();
        loop {
            let due = {
                let mut timers = self.timers.borrow_mut();
                let next = timers
                    .iter()
                    .filter(|(_, t)| t.next_due_secs <= target + 1e-9)
                    .min_by(|(ia, a), (ib, b)| {
                        a.next_due_secs
                            .total_cmp(&b.next_due_secs)
                            .then(ia.cmp(ib))
                    })
                    .map(|(id, _)| *id);
                next.and_then(|id| timers.get_mut(&id)).map(|t| {
                    let at = t.next_due_secs;
                    t.next_due_secs += t.period_secs;
                    (at, Rc::clone(&t.on_tick))
                })
            };
            let Some((at, on_tick)) = due else {
                break;
            };
            self.now_secs.set(at);
            on_tick();
        }
        self.now_secs.set(target);
    }
}

impl DiagramHost for HeadlessHost {
    type Element = Rc<HeadlessElement>;

    fn observe_box(&self, element: &Self::Element, on_resize: Callback) -> Option<Subscription> {
        if !self.box_observation {
            return None;
        }
        Some(element.observers.subscribe(on_resize))
    }

    fn observe_window_resize(&self, on_resize: Callback) -> Subscription {
        self.window.subscribe(on_resize)
    }

    fn start_interval(&self, period: Duration, on_tick: Callback) -> Subscription {
        let period_secs = period.as_secs_f64().max(1e-6);
        let id = self.next_timer_id.get();
        self.next_timer_id.set(id + 1);
        self.timers.borrow_mut().insert(
            id,
            Timer {
                period_secs,
                next_due_secs: self.now_secs.get() + period_secs,
                on_tick,
            },
        );

        let weak: Weak<RefCell<BTreeMap<u64, Timer>>> = Rc::downgrade(&self.timers);
        Subscription::new(move || {
            if let Some(timers) = weak.upgrade() {
                timers.borrow_mut().remove(&id);
            }
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/headless.rs"]
mod tests;
