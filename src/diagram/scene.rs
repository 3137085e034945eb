use std::{
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use crate::{
    diagram::model::DiagramSpec,
    diagram::session::Diagram,
    foundation::core::{NodeId, Rect},
    foundation::error::{FlowlinesError, FlowlinesResult},
    host::headless::{HeadlessElement, HeadlessHost},
    layout::rows::RowLayout,
};

/// A diagram plus the node layout and canvas size needed to run it headless.
///
/// This is the file format read by the `flowlines` CLI.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Connectors, timeline, and node steps.
    pub diagram: DiagramSpec,
    /// Node boxes arranged in rows.
    pub layout: RowLayout,
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
}

impl Scene {
    /// Parse from JSON without validating.
    pub fn from_json_str(s: &str) -> FlowlinesResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Validate the diagram, the layout, and the canvas size.
    ///
    /// Every connector endpoint must be placed by the layout, since a headless scene never
    /// mounts anything else.
    pub fn validate(&self) -> FlowlinesResult<()> {
        check_canvas(self.width, self.height)?;
        let registry = self.diagram.registry()?;
        self.layout.validate()?;

        let placed: BTreeSet<&NodeId> =
            self.layout.rows.iter().flatten().map(|b| &b.id).collect();
        if let Some(missing) = registry
            .endpoint_nodes()
            .into_iter()
            .find(|id| !placed.contains(id))
        {
            return Err(FlowlinesError::validation(format!(
                "connector endpoint '{missing}' is not placed by the layout"
            )));
        }
        Ok(())
    }

    /// Container rectangle at the origin.
    pub fn container(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Lay out nodes, mount them on `host`, and attach a [`Diagram`].
    pub fn mount(&self, host: Rc<HeadlessHost>) -> FlowlinesResult<MountedScene> {
        self.validate()?;
        let boxes = self.layout.solve(self.container())?;
        let diagram = Diagram::new(Rc::clone(&host), self.diagram.clone())?;

        let container = host.create_element(self.container());
        diagram.set_container(Some(Rc::clone(&container)));

        let mut elements = BTreeMap::new();
        for (id, bounds) in boxes {
            let element = host.create_element(bounds);
            diagram.register_node(id.clone()).mount(Rc::clone(&element));
            elements.insert(id, element);
        }
        tracing::debug!(nodes = elements.len(), "scene mounted");

        Ok(MountedScene {
            host,
            layout: self.layout.clone(),
            container,
            elements,
            diagram,
        })
    }
}

fn check_canvas(width: f64, height: f64) -> FlowlinesResult<()> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(FlowlinesError::validation(format!(
            "canvas size must be finite and > 0, got {width}x{height}"
        )));
    }
    Ok(())
}

/// A [`Scene`] running on a [`HeadlessHost`].
pub struct MountedScene {
    host: Rc<HeadlessHost>,
    layout: RowLayout,
    container: Rc<HeadlessElement>,
    elements: BTreeMap<NodeId, Rc<HeadlessElement>>,
    diagram: Diagram<HeadlessHost>,
}

impl MountedScene {
    /// Host driving the scene.
    pub fn host(&self) -> &Rc<HeadlessHost> {
        &self.host
    }

    /// Attached diagram.
    pub fn diagram(&self) -> &Diagram<HeadlessHost> {
        &self.diagram
    }

    /// Current container rectangle.
    pub fn container(&self) -> Rect {
        self.container.bounds()
    }

    /// Current node boxes in container coordinates.
    pub fn node_boxes(&self) -> BTreeMap<NodeId, Rect> {
        let origin = self.container.bounds().origin().to_vec2();
        self.elements
            .iter()
            .map(|(id, el)| (id.clone(), el.bounds() - origin))
            .collect()
    }

    /// Resize the canvas and relayout the nodes, then fire a window resize.
    pub fn resize(&self, width: f64, height: f64) -> FlowlinesResult<()> {
        check_canvas(width, height)?;
        let container = Rect::new(0.0, 0.0, width, height);
        let boxes = self.layout.solve(container)?;
        self.container.set_bounds(container);
        for (id, bounds) in boxes {
            if let Some(el) = self.elements.get(&id) {
                el.set_bounds(bounds);
            }
        }
        self.host.resize_window();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/diagram/scene.rs"]
mod tests;
