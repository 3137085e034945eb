use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use crate::{
    foundation::core::NodeId,
    host::{Callback, ElementRef, Subscription, listeners::ListenerSet},
};

/// Keyed store of node id to live element, with a registration version.
///
/// The version increments on every actual change, so dependents can compare one number instead
/// of listening for per-node events. Cloning yields another handle to the same store.
pub struct NodeTracker<E: ElementRef> {
    inner: Rc<TrackerInner<E>>,
}

impl<E: ElementRef> Clone for NodeTracker<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct TrackerInner<E> {
    entries: RefCell<BTreeMap<NodeId, Option<E>>>,
    slots: RefCell<BTreeMap<NodeId, Rc<Slot<E>>>>,
    version: Cell<u64>,
    changed: ListenerSet,
}

struct Slot<E> {
    node: NodeId,
    tracker: Weak<TrackerInner<E>>,
}

impl<E: ElementRef> Default for NodeTracker<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ElementRef> NodeTracker<E> {
    /// Empty tracker at version 0.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(TrackerInner {
                entries: RefCell::new(BTreeMap::new()),
                slots: RefCell::new(BTreeMap::new()),
                version: Cell::new(0),
                changed: ListenerSet::new(),
            }),
        }
    }

    /// Registration callback bound to `node`.
    ///
    /// Repeated calls for the same node return the same registration.
    pub fn register(&self, node: impl Into<NodeId>) -> NodeRegistration<E> {
        let node = node.into();
        let mut slots = self.inner.slots.borrow_mut();
        let slot = slots.entry(node.clone()).or_insert_with(|| {
            Rc::new(Slot {
                node,
                tracker: Rc::downgrade(&self.inner),
            })
        });
        NodeRegistration {
            slot: Rc::clone(slot),
        }
    }

    /// Current registration version.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Live element for `node`, if mounted.
    pub fn element(&self, node: &str) -> Option<E> {
        self.inner.entries.borrow().get(node).cloned().flatten()
    }

    /// Every node with a live element, sorted by id.
    pub fn mounted(&self) -> Vec<(NodeId, E)> {
        self.inner
            .entries
            .borrow()
            .iter()
            .filter_map(|(id, el)| el.as_ref().map(|el| (id.clone(), el.clone())))
            .collect()
    }

    /// Be notified after every version change.
    pub fn subscribe(&self, on_change: Callback) -> Subscription {
        self.inner.changed.subscribe(on_change)
    }
}

impl<E: ElementRef> TrackerInner<E> {
    fn set(&self, node: &NodeId, element: Option<E>) -> bool {
        {
            let mut entries = self.entries.borrow_mut();
            let unchanged = match (entries.get(node), &element) {
                (Some(Some(old)), Some(new)) => old.same_element(new),
                (Some(None) | None, None) => true,
                _ => false,
            };
            if unchanged {
                return false;
            }
            entries.insert(node.clone(), element);
        }

        let version = self.version.get() + 1;
        self.version.set(version);
        tracing::debug!(node = %node, version, "node registration changed");
        self.changed.notify();
        true
    }
}

/// Stable mount/unmount callback for one node.
///
/// Invoke with `Some(element)` on mount and `None` on unmount. Re-invoking with the element that
/// is already registered is a no-op and does not bump the version.
pub struct NodeRegistration<E: ElementRef> {
    slot: Rc<Slot<E>>,
}

impl<E: ElementRef> Clone for NodeRegistration<E> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<E: ElementRef> PartialEq for NodeRegistration<E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<E: ElementRef> std::fmt::Debug for NodeRegistration<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeRegistration")
            .field(&self.slot.node)
            .finish()
    }
}

impl<E: ElementRef> NodeRegistration<E> {
    /// Node this registration is bound to.
    pub fn node(&self) -> &NodeId {
        &self.slot.node
    }

    /// Record the node's element, or `None` on unmount.
    ///
    /// Returns `true` when the registration actually changed. A registration that outlives its
    /// tracker does nothing.
    pub fn call(&self, element: Option<E>) -> bool {
        match self.slot.tracker.upgrade() {
            Some(tracker) => tracker.set(&self.slot.node, element),
            None => false,
        }
    }

    /// Shorthand for `call(Some(element))`.
    pub fn mount(&self, element: E) -> bool {
        self.call(Some(element))
    }

    /// Shorthand for `call(None)`.
    pub fn unmount(&self) -> bool {
        self.call(None)
    }

    /// Convert into a plain closure for view layers that expect one.
    pub fn into_callback(self) -> Rc<dyn Fn(Option<E>)> {
        Rc::new(move |element| {
            self.call(element);
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/tracker.rs"]
mod tests;
