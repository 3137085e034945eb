use std::collections::{BTreeMap, BTreeSet};

use taffy::TaffyTree;
use taffy::prelude::{AvailableSpace, Size};
use taffy::style::{AlignItems, Dimension, FlexDirection, JustifyContent, LengthPercentage, Style};

use crate::{
    foundation::core::{NodeId, Rect},
    foundation::error::{FlowlinesError, FlowlinesResult},
};

/// Fixed-size node box placed by [`RowLayout`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeBox {
    /// Node id.
    pub id: NodeId,
    /// Width in layout pixels.
    pub width: f64,
    /// Height in layout pixels.
    pub height: f64,
}

/// Rows of node boxes, stacked top to bottom and centered horizontally.
///
/// Used by hosts without a view layer to produce node boxes that move with the container width.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RowLayout {
    /// Rows from top to bottom; boxes left to right.
    pub rows: Vec<Vec<NodeBox>>,
    /// Vertical gap between rows.
    #[serde(default = "default_row_gap")]
    pub row_gap: f64,
    /// Horizontal gap between boxes of a row.
    #[serde(default = "default_column_gap")]
    pub column_gap: f64,
    /// Inner padding of the container.
    #[serde(default = "default_padding")]
    pub padding: f64,
}

fn default_row_gap() -> f64 {
    64.0
}

fn default_column_gap() -> f64 {
    32.0
}

fn default_padding() -> f64 {
    24.0
}

impl RowLayout {
    /// Check sizes, gaps, and id uniqueness.
    pub fn validate(&self) -> FlowlinesResult<()> {
        for (name, v) in [
            ("row_gap", self.row_gap),
            ("column_gap", self.column_gap),
            ("padding", self.padding),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(FlowlinesError::validation(format!(
                    "layout {name} must be finite and >= 0"
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for b in self.rows.iter().flatten() {
            if !seen.insert(&b.id) {
                return Err(FlowlinesError::validation(format!(
                    "node '{}' appears more than once in the layout",
                    b.id
                )));
            }
            if !b.width.is_finite() || !b.height.is_finite() || b.width <= 0.0 || b.height <= 0.0
            {
                return Err(FlowlinesError::validation(format!(
                    "node '{}' must have a finite, positive size",
                    b.id
                )));
            }
        }
        Ok(())
    }

    /// Place every box inside `container`, returning absolute boxes keyed by node.
    pub fn solve(&self, container: Rect) -> FlowlinesResult<BTreeMap<NodeId, Rect>> {
        self.validate()?;

        let mut tree: TaffyTree<()> = TaffyTree::new();
        let mut row_nodes = Vec::with_capacity(self.rows.len());
        let mut leaves = Vec::new();

        for row in &self.rows {
            let mut children = Vec::with_capacity(row.len());
            for b in row {
                let leaf = tree.new_leaf(Style {
                    size: Size {
                        width: Dimension::length(b.width as f32),
                        height: Dimension::length(b.height as f32),
                    },
                    flex_shrink: 0.0,
                    ..Style::default()
                })?;
                children.push(leaf);
                leaves.push((row_nodes.len(), leaf, &b.id));
            }
            let row_node = tree.new_with_children(
                Style {
                    flex_direction: FlexDirection::Row,
                    justify_content: Some(JustifyContent::Center),
                    align_items: Some(AlignItems::Center),
                    gap: Size {
                        width: LengthPercentage::length(self.column_gap as f32),
                        height: LengthPercentage::length(0.0),
                    },
                    flex_shrink: 0.0,
                    ..Style::default()
                },
                &children,
            )?;
            row_nodes.push(row_node);
        }

        let pad = LengthPercentage::length(self.padding as f32);
        let root = tree.new_with_children(
            Style {
                flex_direction: FlexDirection::Column,
                justify_content: Some(JustifyContent::Start),
                align_items: Some(AlignItems::Stretch),
                gap: Size {
                    width: LengthPercentage::length(0.0),
                    height: LengthPercentage::length(self.row_gap as f32),
                },
                padding: taffy::Rect {
                    left: pad,
                    right: pad,
                    top: pad,
                    bottom: pad,
                },
                size: Size {
                    width: Dimension::length(container.width() as f32),
                    height: Dimension::length(container.height() as f32),
                },
                ..Style::default()
            },
            &row_nodes,
        )?;

        tree.compute_layout(
            root,
            Size {
                width: AvailableSpace::Definite(container.width() as f32),
                height: AvailableSpace::Definite(container.height() as f32),
            },
        )?;

        let mut out = BTreeMap::new();
        for (row_idx, leaf, id) in leaves {
            let row = tree.layout(row_nodes[row_idx])?;
            let l = tree.layout(leaf)?;
            let x = container.x0 + f64::from(row.location.x + l.location.x);
            let y = container.y0 + f64::from(row.location.y + l.location.y);
            out.insert(
                id.clone(),
                Rect::from_origin_size(
                    (x, y),
                    (f64::from(l.size.width), f64::from(l.size.height)),
                ),
            );
        }
        tracing::debug!(nodes = out.len(), width = container.width(), "row layout solved");
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/rows.rs"]
mod tests;
