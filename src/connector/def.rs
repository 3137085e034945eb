use crate::{
    foundation::core::{ConnectorId, NodeId, StepIndex},
    foundation::error::{FlowlinesError, FlowlinesResult},
    geometry::anchor::Anchor,
    geometry::waypoint::Waypoint,
};

/// Static description of one directional connector between two nodes.
///
/// Definitions are immutable once collected into a [`crate::ConnectorRegistry`]. They can be
/// built programmatically with the chained setters below or loaded from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConnectorDef {
    /// Unique connector id.
    pub id: ConnectorId,
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Reveal step at which the connector becomes active.
    #[serde(default)]
    pub step_index: StepIndex,
    /// Animation delay in seconds, applied by the renderer when the connector activates.
    #[serde(default)]
    pub delay: f64,
    /// Whether the renderer draws an arrow head at the target end.
    #[serde(default = "default_with_arrow")]
    pub with_arrow: bool,
    /// Anchor on the source node.
    #[serde(default)]
    pub start_anchor: Anchor,
    /// Anchor on the target node.
    #[serde(default)]
    pub end_anchor: Anchor,
    /// Ordered waypoint generators between the two anchors.
    #[serde(default)]
    pub via: Vec<Waypoint>,
}

fn default_with_arrow() -> bool {
    true
}

impl ConnectorDef {
    /// Straight center-to-center connector at step 0 with an arrow head.
    pub fn new(id: impl Into<ConnectorId>, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            step_index: 0,
            delay: 0.0,
            with_arrow: true,
            start_anchor: Anchor::CENTER,
            end_anchor: Anchor::CENTER,
            via: Vec::new(),
        }
    }

    /// Set the reveal step.
    pub fn step(mut self, step_index: StepIndex) -> Self {
        self.step_index = step_index;
        self
    }

    /// Set the activation delay in seconds.
    pub fn delay(mut self, secs: f64) -> Self {
        self.delay = secs;
        self
    }

    /// Set both anchors.
    pub fn anchors(mut self, start: Anchor, end: Anchor) -> Self {
        self.start_anchor = start;
        self.end_anchor = end;
        self
    }

    /// Append a waypoint generator.
    pub fn via(mut self, waypoint: Waypoint) -> Self {
        self.via.push(waypoint);
        self
    }

    /// Drop the arrow head.
    pub fn without_arrow(mut self) -> Self {
        self.with_arrow = false;
        self
    }

    /// Validate this definition in isolation.
    pub fn validate(&self) -> FlowlinesResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(FlowlinesError::validation("connector id must be non-empty"));
        }
        if self.from.as_str().trim().is_empty() || self.to.as_str().trim().is_empty() {
            return Err(FlowlinesError::validation(format!(
                "connector '{}' must name both endpoint nodes",
                self.id
            )));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(FlowlinesError::validation(format!(
                "connector '{}' delay must be finite and >= 0",
                self.id
            )));
        }
        for w in &self.via {
            match w.validate() {
                Ok(()) => {}
                Err(FlowlinesError::Validation(msg)) => {
                    return Err(FlowlinesError::validation(format!(
                        "connector '{}': {msg}",
                        self.id
                    )));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/connector/def.rs"]
mod tests;
