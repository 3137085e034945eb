use crate::foundation::core::{Point, Rect};

/// Horizontal position of an anchor on a rectangle's border.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorX {
    /// Left edge.
    Left,
    /// Horizontal midpoint.
    #[default]
    Center,
    /// Right edge.
    Right,
}

/// Vertical position of an anchor on a rectangle's border.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorY {
    /// Top edge.
    Top,
    /// Vertical midpoint.
    #[default]
    Center,
    /// Bottom edge.
    Bottom,
}

/// A point on the 3x3 anchor grid of a rectangle.
///
/// Omitted fields deserialize to `center`, so `{}` is the rectangle's center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Anchor {
    /// Horizontal component.
    #[serde(default)]
    pub x: AnchorX,
    /// Vertical component.
    #[serde(default)]
    pub y: AnchorY,
}

impl Anchor {
    /// Center of the rectangle.
    pub const CENTER: Self = Self::new(AnchorX::Center, AnchorY::Center);
    /// Middle of the top edge.
    pub const TOP: Self = Self::new(AnchorX::Center, AnchorY::Top);
    /// Middle of the bottom edge.
    pub const BOTTOM: Self = Self::new(AnchorX::Center, AnchorY::Bottom);
    /// Middle of the left edge.
    pub const LEFT: Self = Self::new(AnchorX::Left, AnchorY::Center);
    /// Middle of the right edge.
    pub const RIGHT: Self = Self::new(AnchorX::Right, AnchorY::Center);

    /// Build an anchor from its two components.
    pub const fn new(x: AnchorX, y: AnchorY) -> Self {
        Self { x, y }
    }
}

/// Resolve `anchor` on `element` into a point relative to `container`'s top-left corner.
///
/// Both rectangles are absolute (viewport) boxes. The axes are resolved independently, so every
/// combination of the anchor grid is valid.
pub fn resolve_anchor(element: Rect, container: Rect, anchor: Anchor) -> Point {
    let left = element.x0 - container.x0;
    let top = element.y0 - container.y0;

    let x = match anchor.x {
        AnchorX::Left => left,
        AnchorX::Center => left + element.width() / 2.0,
        AnchorX::Right => left + element.width(),
    };
    let y = match anchor.y {
        AnchorY::Top => top,
        AnchorY::Center => top + element.height() / 2.0,
        AnchorY::Bottom => top + element.height(),
    };

    Point::new(x, y)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/anchor.rs"]
mod tests;
