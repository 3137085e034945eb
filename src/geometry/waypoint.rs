use std::{fmt, sync::Arc};

use crate::foundation::core::Point;
use crate::foundation::error::{FlowlinesError, FlowlinesResult};

/// Resolved endpoints of a connector, handed to waypoint generators.
///
/// Waypoints are expressed relative to this line rather than in absolute coordinates, so they
/// follow the endpoints when the layout changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathContext {
    /// Resolved start anchor, container-relative.
    pub start: Point,
    /// Resolved end anchor, container-relative.
    pub end: Point,
}

impl PathContext {
    /// Y coordinate at fraction `ratio` of the vertical span from `start` to `end`.
    pub fn split_y(&self, ratio: f64) -> f64 {
        self.start.y + ratio * (self.end.y - self.start.y)
    }
}

/// Produces intermediate points for a connector from its resolved endpoints.
///
/// Implementations append to `out` in routing order. Any closure
/// `Fn(&PathContext) -> Point` is a generator producing one point.
pub trait WaypointGenerator {
    /// Append this generator's points for `ctx` to `out`.
    fn push_waypoints(&self, ctx: &PathContext, out: &mut Vec<Point>);
}

impl<F> WaypointGenerator for F
where
    F: Fn(&PathContext) -> Point,
{
    fn push_waypoints(&self, ctx: &PathContext, out: &mut Vec<Point>) {
        out.push(self(ctx));
    }
}

/// One routing step of a connector's `via` list.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waypoint {
    /// Fan-out branch: drop from the source by `ratio` of the vertical span, then run
    /// horizontally to the target column. Siblings sharing a source and ratio share the
    /// horizontal level.
    Branch {
        /// Fraction of the vertical span, in `[0, 1]`.
        ratio: f64,
    },
    /// Elbow bend with the same geometry as [`Waypoint::Branch`], used for single bends that sit
    /// near one end (ratio close to 0 or 1) rather than mid-span.
    Elbow {
        /// Fraction of the vertical span, in `[0, 1]`.
        ratio: f64,
    },
    /// Programmatic generator. Not representable in JSON.
    #[serde(skip)]
    Custom(CustomWaypoint),
}

impl Waypoint {
    /// Branch-offset generator at `ratio`.
    pub fn branch(ratio: f64) -> Self {
        Self::Branch { ratio }
    }

    /// Elbow generator at `ratio`.
    pub fn elbow(ratio: f64) -> Self {
        Self::Elbow { ratio }
    }

    /// Wrap any generator as a waypoint.
    pub fn custom(generator: impl WaypointGenerator + Send + Sync + 'static) -> Self {
        Self::Custom(CustomWaypoint(Arc::new(generator)))
    }

    /// Check that ratios are finite and inside `[0, 1]`.
    pub fn validate(&self) -> FlowlinesResult<()> {
        match self {
            Self::Branch { ratio } | Self::Elbow { ratio } => {
                if !ratio.is_finite() || !(0.0..=1.0).contains(ratio) {
                    return Err(FlowlinesError::validation(format!(
                        "waypoint ratio must be finite and within [0, 1], got {ratio}"
                    )));
                }
                Ok(())
            }
            Self::Custom(_) => Ok(()),
        }
    }
}

impl WaypointGenerator for Waypoint {
    fn push_waypoints(&self, ctx: &PathContext, out: &mut Vec<Point>) {
        match self {
            Self::Branch { ratio } | Self::Elbow { ratio } => {
                let y = ctx.split_y(*ratio);
                out.push(Point::new(ctx.start.x, y));
                out.push(Point::new(ctx.end.x, y));
            }
            Self::Custom(custom) => custom.0.push_waypoints(ctx, out),
        }
    }
}

/// Shared handle to a user-supplied generator.
#[derive(Clone)]
pub struct CustomWaypoint(Arc<dyn WaypointGenerator + Send + Sync>);

impl fmt::Debug for CustomWaypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomWaypoint(..)")
    }
}

impl PartialEq for CustomWaypoint {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/waypoint.rs"]
mod tests;
