use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use crate::{
    connector::registry::ConnectorRegistry,
    foundation::core::{ConnectorId, NodeId, Point, Rect, StepIndex},
    geometry::anchor::resolve_anchor,
    geometry::path::build_path_string,
    geometry::waypoint::{PathContext, WaypointGenerator},
    host::{Callback, ElementRef, Subscription, listeners::ListenerSet},
    nodes::tracker::NodeTracker,
};

/// One connector resolved against the current layout.
///
/// Rebuilt wholesale on every recomputation, never patched in place.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComputedConnector {
    /// Connector id.
    pub id: ConnectorId,
    /// SVG path description, container-relative.
    pub path: String,
    /// Polyline vertices behind `path`: start, waypoints, end.
    pub points: Vec<Point>,
    /// Reveal step.
    pub step_index: StepIndex,
    /// Activation delay in seconds.
    pub delay: f64,
    /// Whether an arrow head is drawn at the end.
    pub with_arrow: bool,
}

/// Resolve every connector whose endpoints both have a box.
///
/// `container` and the boxes returned by `bounds_of` are absolute; output points are relative
/// to `container`. Connectors with a missing endpoint are omitted. Output follows definition
/// order.
pub fn compute_connectors(
    registry: &ConnectorRegistry,
    container: Rect,
    bounds_of: impl Fn(&NodeId) -> Option<Rect>,
) -> Vec<ComputedConnector> {
    let mut out = Vec::with_capacity(registry.len());
    let mut points = Vec::<Point>::new();

    for def in registry.defs() {
        let (Some(from), Some(to)) = (bounds_of(&def.from), bounds_of(&def.to)) else {
            tracing::trace!(connector = %def.id, "endpoint not mounted, omitting connector");
            continue;
        };

        let ctx = PathContext {
            start: resolve_anchor(from, container, def.start_anchor),
            end: resolve_anchor(to, container, def.end_anchor),
        };

        points.clear();
        points.push(ctx.start);
        for waypoint in &def.via {
            waypoint.push_waypoints(&ctx, &mut points);
        }
        points.push(ctx.end);

        out.push(ComputedConnector {
            id: def.id.clone(),
            path: build_path_string(&points),
            points: points.clone(),
            step_index: def.step_index,
            delay: def.delay,
            with_arrow: def.with_arrow,
        });
    }
    out
}

/// What caused a recomputation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// The container element became available or was replaced.
    ContainerMounted,
    /// The node registration version may have changed.
    Registration,
    /// The window was resized.
    WindowResize,
    /// The container's box changed size.
    ContainerResize,
    /// A registered node's box changed size.
    NodeResize,
}

/// Keeps the published connector list in sync with the live layout.
///
/// Every accepted trigger runs a full, synchronous recomputation and publishes the result as a
/// single replacement of the previous list. Triggers that arrive while a recomputation is running
/// (for example from a publish listener) are coalesced into one follow-up pass.
pub struct LayoutEngine<E: ElementRef> {
    inner: Rc<EngineInner<E>>,
}

impl<E: ElementRef> Clone for LayoutEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct EngineInner<E: ElementRef> {
    registry: Rc<ConnectorRegistry>,
    nodes: NodeTracker<E>,
    container: RefCell<Option<E>>,
    published: RefCell<Rc<[ComputedConnector]>>,
    generation: Cell<u64>,
    seen_version: Cell<Option<u64>>,
    running: Cell<bool>,
    pending: Cell<bool>,
    on_publish: ListenerSet,
    registration_sub: RefCell<Option<Subscription>>,
}

impl<E: ElementRef> LayoutEngine<E> {
    /// Engine over `registry`, recomputing whenever `nodes` changes version.
    pub fn new(registry: Rc<ConnectorRegistry>, nodes: NodeTracker<E>) -> Self {
        let inner = Rc::new(EngineInner {
            registry,
            nodes,
            container: RefCell::new(None),
            published: RefCell::new(Rc::from(Vec::new())),
            generation: Cell::new(0),
            seen_version: Cell::new(None),
            running: Cell::new(false),
            pending: Cell::new(false),
            on_publish: ListenerSet::new(),
            registration_sub: RefCell::new(None),
        });

        let engine = Self { inner };
        let sub = engine
            .inner
            .nodes
            .subscribe(engine.trigger_callback(Trigger::Registration));
        *engine.inner.registration_sub.borrow_mut() = Some(sub);
        engine
    }

    /// Provide or clear the container element.
    ///
    /// A newly available container recomputes eagerly. Clearing it keeps the last published
    /// list, so the diagram does not flash empty.
    pub fn set_container(&self, container: Option<E>) {
        let changed = {
            let mut slot = self.inner.container.borrow_mut();
            let changed = match (slot.as_ref(), container.as_ref()) {
                (Some(old), Some(new)) => !old.same_element(new),
                (None, None) => false,
                _ => true,
            };
            if changed {
                *slot = container;
            }
            changed
        };
        if changed && self.inner.container.borrow().is_some() {
            self.handle(Trigger::ContainerMounted);
        }
    }

    /// Current container element.
    pub fn container(&self) -> Option<E> {
        self.inner.container.borrow().clone()
    }

    /// Request a recomputation. Returns `true` if at least one list was published.
    ///
    /// A [`Trigger::Registration`] whose version was already consumed is ignored.
    pub fn handle(&self, trigger: Trigger) -> bool {
        if trigger == Trigger::Registration
            && self.inner.seen_version.get() == Some(self.inner.nodes.version())
        {
            return false;
        }
        if self.inner.running.get() {
            self.inner.pending.set(true);
            return false;
        }

        self.inner.running.set(true);
        let mut published = false;
        loop {
            self.inner.pending.set(false);
            published |= self.recompute(trigger);
            if !self.inner.pending.get() {
                break;
            }
        }
        self.inner.running.set(false);
        published
    }

    /// Callback that forwards to [`LayoutEngine::handle`] without keeping the engine alive.
    pub fn trigger_callback(&self, trigger: Trigger) -> Callback {
        let weak: Weak<EngineInner<E>> = Rc::downgrade(&self.inner);
        Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                LayoutEngine { inner }.handle(trigger);
            }
        })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(trigger = ?trigger))]
    fn recompute(&self, trigger: Trigger) -> bool {
        let Some(container) = self.inner.container.borrow().clone() else {
            tracing::trace!("container unavailable, keeping previous connectors");
            return false;
        };

        let version = self.inner.nodes.version();
        let container_box = container.bounding_box();
        let nodes = &self.inner.nodes;
        let computed = compute_connectors(&self.inner.registry, container_box, |id| {
            nodes.element(id.as_str()).map(|el| el.bounding_box())
        });

        let count = computed.len();
        *self.inner.published.borrow_mut() = Rc::from(computed);
        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);
        self.inner.seen_version.set(Some(version));
        tracing::debug!(count, generation, version, "published connectors");

        self.inner.on_publish.notify();
        true
    }

    /// Last published connector list.
    pub fn connectors(&self) -> Rc<[ComputedConnector]> {
        Rc::clone(&self.inner.published.borrow())
    }

    /// Number of lists published so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.get()
    }

    /// Connector definitions driving this engine.
    pub fn registry(&self) -> &Rc<ConnectorRegistry> {
        &self.inner.registry
    }

    /// Stop following node registrations. Explicit triggers and the published list still work.
    pub fn detach(&self) {
        let sub = self.inner.registration_sub.borrow_mut().take();
        drop(sub);
    }

    /// Be notified after every publication.
    pub fn subscribe(&self, on_publish: Callback) -> Subscription {
        self.inner.on_publish.subscribe(on_publish)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
