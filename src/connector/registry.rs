use std::collections::BTreeSet;

use crate::{
    connector::def::ConnectorDef,
    foundation::core::{NodeId, StepIndex},
    foundation::error::{FlowlinesError, FlowlinesResult},
};

/// Validated, immutable, ordered list of connector definitions.
///
/// Definition order is the output order of every recomputation.
#[derive(Clone, Debug, Default)]
pub struct ConnectorRegistry {
    defs: Vec<ConnectorDef>,
}

impl ConnectorRegistry {
    /// Validate `defs` and freeze them.
    pub fn new(defs: Vec<ConnectorDef>) -> FlowlinesResult<Self> {
        let mut seen = BTreeSet::<&str>::new();
        for def in &defs {
            def.validate()?;
            if !seen.insert(def.id.as_str()) {
                return Err(FlowlinesError::validation(format!(
                    "duplicate connector id '{}'",
                    def.id
                )));
            }
        }
        Ok(Self { defs })
    }

    /// Definitions in declaration order.
    pub fn defs(&self) -> &[ConnectorDef] {
        &self.defs
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Return `true` when no connectors are defined.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&ConnectorDef> {
        self.defs.iter().find(|d| d.id.as_str() == id)
    }

    /// Highest step index used by any connector.
    pub fn max_step_index(&self) -> Option<StepIndex> {
        self.defs.iter().map(|d| d.step_index).max()
    }

    /// Every node referenced as an endpoint, sorted and deduplicated.
    pub fn endpoint_nodes(&self) -> BTreeSet<&NodeId> {
        self.defs
            .iter()
            .flat_map(|d| [&d.from, &d.to])
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/connector/registry.rs"]
mod tests;
