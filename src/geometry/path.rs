use std::fmt::Write as _;

use crate::foundation::core::{BezPath, Point};

/// Build an SVG polyline path description from `points`.
///
/// The first point becomes an absolute move (`M x y`), every following point an absolute
/// line-to (`L x y`), in input order. A single point yields a move-only path. An empty slice
/// yields an empty string.
pub fn build_path_string(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 16);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let cmd = if i == 0 { 'M' } else { 'L' };
        // Writing into a String cannot fail.
        let _ = write!(out, "{cmd} {} {}", Coord(p.x), Coord(p.y));
    }
    out
}

/// Build the same polyline as [`build_path_string`] as a `kurbo` path.
pub fn build_bez_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
    }
    path
}

/// Shortest round-trip decimal form, with `-0` folded into `0`.
pub(crate) struct Coord(pub(crate) f64);

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = if self.0 == 0.0 { 0.0 } else { self.0 };
        write!(f, "{v}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/path.rs"]
mod tests;
