use std::collections::BTreeMap;

use crate::{
    connector::def::ConnectorDef,
    connector::registry::ConnectorRegistry,
    foundation::core::{NodeId, StepIndex},
    foundation::error::{FlowlinesError, FlowlinesResult},
    timeline::sequencer::TimelineConfig,
};

/// Complete, serializable description of an animated diagram.
///
/// ```json
/// {
///   "connectors": [{ "id": "a-b", "from": "a", "to": "b", "step_index": 1 }],
///   "timeline": { "total_steps": 3 },
///   "node_steps": { "b": 2 }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiagramSpec {
    /// Connector definitions in drawing order.
    pub connectors: Vec<ConnectorDef>,
    /// Reveal loop configuration.
    pub timeline: TimelineConfig,
    /// Reveal steps for node highlighting, keyed by node.
    #[serde(default)]
    pub node_steps: BTreeMap<NodeId, StepIndex>,
}

impl DiagramSpec {
    /// Parse from JSON without validating.
    pub fn from_json_str(s: &str) -> FlowlinesResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Pretty JSON form.
    pub fn to_json_string_pretty(&self) -> FlowlinesResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate connectors, timeline, and every step index against the loop length.
    pub fn validate(&self) -> FlowlinesResult<()> {
        self.registry().map(|_| ())
    }

    /// Validate and freeze the connectors.
    pub fn registry(&self) -> FlowlinesResult<ConnectorRegistry> {
        self.timeline.validate()?;
        let registry = ConnectorRegistry::new(self.connectors.clone())?;
        self.check_steps(&registry)?;
        Ok(registry)
    }

    fn check_steps(&self, registry: &ConnectorRegistry) -> FlowlinesResult<()> {
        let total = self.timeline.total_steps;
        for def in registry.defs() {
            if def.step_index >= total {
                return Err(FlowlinesError::validation(format!(
                    "connector '{}' step_index {} is outside the {total}-step timeline",
                    def.id, def.step_index
                )));
            }
        }
        for (node, step) in &self.node_steps {
            if *step >= total {
                return Err(FlowlinesError::validation(format!(
                    "node '{node}' step {step} is outside the {total}-step timeline"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/diagram/model.rs"]
mod tests;
