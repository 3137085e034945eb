use std::{collections::BTreeMap, fmt::Write as _};

use crate::{
    diagram::session::DiagramFrame,
    foundation::core::{NodeId, Rect},
    geometry::path::Coord,
};

/// Colors and sizes used by [`render_svg`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SvgStyle {
    /// Canvas fill, or `None` for a transparent background.
    pub background: Option<String>,
    /// Node box fill.
    pub node_fill: String,
    /// Node box outline and label color.
    pub node_stroke: String,
    /// Connector color.
    pub connector_stroke: String,
    /// Connector width.
    pub stroke_width: f64,
    /// Opacity of connectors and nodes whose step has not been reached.
    pub inactive_opacity: f64,
    /// Label font size.
    pub font_size: f64,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            background: Some("#ffffff".to_owned()),
            node_fill: "#f4f6fb".to_owned(),
            node_stroke: "#2d3748".to_owned(),
            connector_stroke: "#3b82f6".to_owned(),
            stroke_width: 2.0,
            inactive_opacity: 0.2,
            font_size: 12.0,
        }
    }
}

const ARROW_ID: &str = "flowlines-arrow";

/// Render `frame` over `nodes` as a standalone SVG document of `width` x `height`.
///
/// Node boxes are container-relative, like connector paths. Nodes without a highlight step in
/// the frame are always drawn fully opaque. Connectors carry `data-step` and `data-delay` so a
/// stylesheet can animate the reveal.
pub fn render_svg(
    frame: &DiagramFrame,
    nodes: &BTreeMap<NodeId, Rect>,
    width: f64,
    height: f64,
    style: &SvgStyle,
) -> String {
    let active_nodes: BTreeMap<&NodeId, bool> =
        frame.nodes.iter().map(|n| (&n.id, n.active)).collect();

    let mut out = String::with_capacity(512 + 256 * (nodes.len() + frame.connectors.len()));
    // Writing into a String cannot fail, so the results below are ignored.
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" data-step="{step}" data-loop="{lp}">"#,
        w = Coord(width),
        h = Coord(height),
        step = frame.clock.active_step,
        lp = frame.clock.loop_count,
    );
    let _ = writeln!(
        out,
        r#"  <defs><marker id="{ARROW_ID}" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto"><path d="M 0 0 L 10 5 L 0 10 z" fill="{}"/></marker></defs>"#,
        escape(&style.connector_stroke)
    );
    if let Some(bg) = &style.background {
        let _ = writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            escape(bg)
        );
    }

    for (id, b) in nodes {
        let active = active_nodes.get(id).copied().unwrap_or(true);
        let _ = writeln!(
            out,
            r#"  <g class="node" data-node="{id}" opacity="{op}"><rect x="{x}" y="{y}" width="{w}" height="{h}" rx="6" fill="{fill}" stroke="{stroke}"/><text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="central" font-family="sans-serif" font-size="{fs}" fill="{stroke}">{id}</text></g>"#,
            id = escape(id.as_str()),
            op = opacity(active, style),
            x = Coord(b.x0),
            y = Coord(b.y0),
            w = Coord(b.width()),
            h = Coord(b.height()),
            fill = escape(&style.node_fill),
            stroke = escape(&style.node_stroke),
            cx = Coord(b.center().x),
            cy = Coord(b.center().y),
            fs = Coord(style.font_size),
        );
    }

    for c in &frame.connectors {
        let marker = if c.with_arrow {
            format!(r#" marker-end="url(#{ARROW_ID})""#)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            r#"  <path class="connector" data-connector="{id}" data-step="{step}" data-delay="{delay}" d="{d}" fill="none" stroke="{stroke}" stroke-width="{sw}" opacity="{op}"{marker}/>"#,
            id = escape(c.id.as_str()),
            step = c.step_index,
            delay = Coord(c.delay),
            d = c.path,
            stroke = escape(&style.connector_stroke),
            sw = Coord(style.stroke_width),
            op = opacity(c.active, style),
        );
    }

    out.push_str("</svg>\n");
    out
}

fn opacity(active: bool, style: &SvgStyle) -> Coord {
    Coord(if active { 1.0 } else { style.inactive_opacity })
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
