use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use crate::{
    foundation::core::NodeId,
    host::{Callback, DiagramHost, ElementRef, Subscription},
    layout::engine::{LayoutEngine, Trigger},
    nodes::tracker::NodeTracker,
};

/// Owns every resize subscription that feeds a [`LayoutEngine`].
///
/// Window resizes, the container's box, and each mounted node's box are observed independently.
/// Per-node observers follow the node registrations: they are attached on mount, moved when an
/// element is replaced, and released on unmount. If the host cannot observe boxes, only window
/// resizes remain.
pub struct LayoutObservers<H: DiagramHost> {
    inner: Rc<ObserversInner<H>>,
}

type Observed<E> = (E, Option<Subscription>);

struct ObserversInner<H: DiagramHost> {
    host: Rc<H>,
    engine: LayoutEngine<H::Element>,
    nodes: NodeTracker<H::Element>,
    window: RefCell<Option<Subscription>>,
    registrations: RefCell<Option<Subscription>>,
    container: RefCell<Option<Observed<H::Element>>>,
    per_node: RefCell<BTreeMap<NodeId, Observed<H::Element>>>,
    warned_degraded: Cell<bool>,
}

impl<H: DiagramHost + 'static> LayoutObservers<H> {
    /// Start observing window resizes and node registrations.
    pub fn attach(
        host: Rc<H>,
        engine: LayoutEngine<H::Element>,
        nodes: NodeTracker<H::Element>,
    ) -> Self {
        let window = host.observe_window_resize(engine.trigger_callback(Trigger::WindowResize));
        let inner = Rc::new(ObserversInner {
            host,
            engine,
            nodes,
            window: RefCell::new(Some(window)),
            registrations: RefCell::new(None),
            container: RefCell::new(None),
            per_node: RefCell::new(BTreeMap::new()),
            warned_degraded: Cell::new(false),
        });

        let weak: Weak<ObserversInner<H>> = Rc::downgrade(&inner);
        let sub = inner.nodes.subscribe(Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.reconcile_nodes();
            }
        }));
        *inner.registrations.borrow_mut() = Some(sub);
        inner.reconcile_nodes();

        Self { inner }
    }

    /// Provide or clear the container element, moving its box observer along with it.
    pub fn set_container(&self, container: Option<H::Element>) {
        {
            let mut slot = self.inner.container.borrow_mut();
            let same = match (slot.as_ref(), container.as_ref()) {
                (Some((old, _)), Some(new)) => old.same_element(new),
                (None, None) => true,
                _ => false,
            };
            if !same {
                *slot = container.as_ref().map(|el| {
                    let on_resize = self.inner.engine.trigger_callback(Trigger::ContainerResize);
                    let sub = self.inner.observe(el, on_resize);
                    (el.clone(), sub)
                });
            }
        }
        self.inner.engine.set_container(container);
    }

    /// Number of nodes currently watched for box changes.
    pub fn observed_nodes(&self) -> usize {
        self.inner
            .per_node
            .borrow()
            .values()
            .filter(|(_, sub)| sub.is_some())
            .count()
    }

    /// Release every subscription. Further registrations are no longer followed.
    pub fn detach(&self) {
        self.inner.registrations.borrow_mut().take();
        self.inner.window.borrow_mut().take();
        self.inner.container.borrow_mut().take();
        let released = std::mem::take(&mut *self.inner.per_node.borrow_mut());
        drop(released);
    }
}

impl<H: DiagramHost> ObserversInner<H> {
    fn observe(&self, element: &H::Element, on_resize: Callback) -> Option<Subscription> {
        let sub = self.host.observe_box(element, on_resize);
        if sub.is_none() && !self.warned_degraded.replace(true) {
            tracing::warn!("host cannot observe element boxes, falling back to window resizes");
        }
        sub
    }

    fn reconcile_nodes(&self) {
        let mounted = self.nodes.mounted();
        let mut per_node = self.per_node.borrow_mut();

        per_node.retain(|id, (el, _)| {
            mounted
                .iter()
                .any(|(mid, mel)| mid == id && mel.same_element(el))
        });

        for (id, el) in mounted {
            if per_node.contains_key(&id) {
                continue;
            }
            let sub = self.observe(&el, self.engine.trigger_callback(Trigger::NodeResize));
            tracing::trace!(node = %id, observed = sub.is_some(), "watching node box");
            per_node.insert(id, (el, sub));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/observe.rs"]
mod tests;
