//! Flowlines computes connector geometry for auto-laid-out pipeline diagrams and sequences their
//! step-by-step reveal.
//!
//! Nodes are placed by whatever layout the host uses. Flowlines only observes their boxes and
//! turns a static list of [`ConnectorDef`]s into container-relative SVG paths, republished
//! whenever the layout moves.
//!
//! # Pipeline overview
//!
//! 1. **Define**: [`ConnectorDef`]s (anchors, waypoint generators, reveal step) are frozen into a
//!    validated [`ConnectorRegistry`], usually through a JSON [`DiagramSpec`].
//! 2. **Track**: node elements mount and unmount through [`NodeRegistration`] callbacks on a
//!    [`NodeTracker`].
//! 3. **Recompute**: [`LayoutEngine`] resolves anchors and waypoints against the current boxes on
//!    every trigger (mount, registration, window/container/node resize) and publishes a fresh
//!    `[ComputedConnector]` list. [`compute_connectors`] is the pure core of that step.
//! 4. **Sequence**: [`StepSequencer`] ticks an active step that loops over the timeline.
//!    [`Diagram::frame`] combines both into render-ready [`DiagramFrame`]s.
//!
//! All host interaction goes through the [`DiagramHost`] trait. [`HeadlessHost`] is a
//! deterministic implementation used by tests and the `flowlines` CLI, together with
//! [`Scene`], [`render_svg`], and [`rasterize_svg`].
//!
//! The model is single-threaded: handles are reference-counted and notifications run
//! synchronously on the caller's thread.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod connector;
mod diagram;
mod foundation;
mod geometry;
mod host;
mod layout;
mod nodes;
mod render;
mod timeline;

pub use connector::def::ConnectorDef;
pub use connector::registry::ConnectorRegistry;
pub use diagram::model::DiagramSpec;
pub use diagram::scene::{MountedScene, Scene};
pub use diagram::session::{ConnectorFrame, Diagram, DiagramFrame, NodeFrame};
pub use foundation::core::{BezPath, ConnectorId, NodeId, Point, Rect, StepIndex, Vec2};
pub use foundation::error::{FlowlinesError, FlowlinesResult};
pub use geometry::anchor::{Anchor, AnchorX, AnchorY, resolve_anchor};
pub use geometry::path::{build_bez_path, build_path_string};
pub use geometry::waypoint::{CustomWaypoint, PathContext, Waypoint, WaypointGenerator};
pub use host::headless::{HeadlessElement, HeadlessHost};
pub use host::{BoxSource, Callback, DiagramHost, ElementRef, Subscription};
pub use layout::engine::{ComputedConnector, LayoutEngine, Trigger, compute_connectors};
pub use layout::observe::LayoutObservers;
pub use layout::rows::{NodeBox, RowLayout};
pub use nodes::tracker::{NodeRegistration, NodeTracker};
pub use render::raster::{MAX_RASTER_DIM, RasterImage, rasterize_svg};
pub use render::svg::{SvgStyle, render_svg};
pub use timeline::sequencer::{
    ClockState, DEFAULT_STEP_INTERVAL_SECS, StepDriver, StepSequencer, TimelineConfig,
};
