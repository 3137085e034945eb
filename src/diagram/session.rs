use std::{collections::BTreeMap, rc::Rc};

use crate::{
    connector::registry::ConnectorRegistry,
    diagram::model::DiagramSpec,
    foundation::core::{ConnectorId, NodeId, StepIndex},
    foundation::error::FlowlinesResult,
    host::{Callback, DiagramHost, Subscription},
    layout::engine::{ComputedConnector, LayoutEngine},
    layout::observe::LayoutObservers,
    nodes::tracker::{NodeRegistration, NodeTracker},
    timeline::sequencer::{ClockState, StepSequencer},
};

/// Render-time view of one connector.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ConnectorFrame {
    /// Connector id.
    pub id: ConnectorId,
    /// SVG path description.
    pub path: String,
    /// Reveal step.
    pub step_index: StepIndex,
    /// Activation delay in seconds.
    pub delay: f64,
    /// Whether an arrow head is drawn.
    pub with_arrow: bool,
    /// Whether the clock has reached this connector's step.
    pub active: bool,
}

/// Render-time view of one node with a highlight step.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct NodeFrame {
    /// Node id.
    pub id: NodeId,
    /// Highlight step.
    pub step_index: StepIndex,
    /// Whether the clock has reached this node's step.
    pub active: bool,
}

/// Published connectors combined with the clock.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DiagramFrame {
    /// Clock state the frame was derived from.
    pub clock: ClockState,
    /// Connectors in definition order.
    pub connectors: Vec<ConnectorFrame>,
    /// Nodes with highlight steps, sorted by id.
    pub nodes: Vec<NodeFrame>,
}

/// Owning context of an animated diagram.
///
/// Wires the connector registry, node tracker, layout engine, resize observers, and step
/// sequencer to one host. Dropping the diagram (or calling [`Diagram::teardown`]) releases every
/// observer and the step timer.
pub struct Diagram<H: DiagramHost + 'static> {
    host: Rc<H>,
    node_steps: BTreeMap<NodeId, StepIndex>,
    nodes: NodeTracker<H::Element>,
    engine: LayoutEngine<H::Element>,
    observers: LayoutObservers<H>,
    sequencer: StepSequencer,
}

impl<H: DiagramHost + 'static> Diagram<H> {
    /// Validate `spec`, attach to `host`, and start the step clock.
    pub fn new(host: Rc<H>, spec: DiagramSpec) -> FlowlinesResult<Self> {
        let registry = Rc::new(spec.registry()?);
        let sequencer = StepSequencer::new(spec.timeline)?;
        let nodes = NodeTracker::new();
        let engine = LayoutEngine::new(Rc::clone(&registry), nodes.clone());
        let observers = LayoutObservers::attach(Rc::clone(&host), engine.clone(), nodes.clone());
        sequencer.start(host.as_ref());

        tracing::debug!(
            connectors = registry.len(),
            total_steps = spec.timeline.total_steps,
            "diagram attached"
        );

        Ok(Self {
            host,
            node_steps: spec.node_steps,
            nodes,
            engine,
            observers,
            sequencer,
        })
    }

    /// Host this diagram is attached to.
    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    /// Mount/unmount callback for `node`.
    pub fn register_node(&self, node: impl Into<NodeId>) -> NodeRegistration<H::Element> {
        self.nodes.register(node)
    }

    /// Provide or clear the container element.
    pub fn set_container(&self, container: Option<H::Element>) {
        self.observers.set_container(container);
    }

    /// Latest published connectors.
    pub fn computed_connectors(&self) -> Rc<[ComputedConnector]> {
        self.engine.connectors()
    }

    /// Current clock state.
    pub fn clock(&self) -> ClockState {
        self.sequencer.state()
    }

    /// Connector definitions.
    pub fn registry(&self) -> &Rc<ConnectorRegistry> {
        self.engine.registry()
    }

    /// Node tracker.
    pub fn nodes(&self) -> &NodeTracker<H::Element> {
        &self.nodes
    }

    /// Layout engine.
    pub fn engine(&self) -> &LayoutEngine<H::Element> {
        &self.engine
    }

    /// Step sequencer.
    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    /// Number of nodes whose boxes are observed.
    pub fn observed_nodes(&self) -> usize {
        self.observers.observed_nodes()
    }

    /// Be notified whenever a new connector list is published.
    pub fn on_connectors_changed(&self, callback: Callback) -> Subscription {
        self.engine.subscribe(callback)
    }

    /// Be notified on every clock tick.
    pub fn on_tick(&self, callback: Callback) -> Subscription {
        self.sequencer.subscribe(callback)
    }

    /// Combine the published connectors with the current clock.
    pub fn frame(&self) -> DiagramFrame {
        let clock = self.clock();
        let connectors = self
            .computed_connectors()
            .iter()
            .map(|c| ConnectorFrame {
                id: c.id.clone(),
                path: c.path.clone(),
                step_index: c.step_index,
                delay: c.delay,
                with_arrow: c.with_arrow,
                active: clock.is_active(c.step_index),
            })
            .collect();
        let nodes = self
            .node_steps
            .iter()
            .map(|(id, &step_index)| NodeFrame {
                id: id.clone(),
                step_index,
                active: clock.is_active(step_index),
            })
            .collect();
        DiagramFrame {
            clock,
            connectors,
            nodes,
        }
    }

    /// Release the step timer and every resize observer.
    ///
    /// The last published connectors and clock state stay readable.
    pub fn teardown(&self) {
        self.sequencer.stop();
        self.observers.detach();
        self.engine.detach();
        tracing::debug!("diagram torn down");
    }
}

impl<H: DiagramHost + 'static> Drop for Diagram<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/diagram/session.rs"]
mod tests;
