//! Static snapshots of a diagram frame.

pub(crate) mod raster;
pub(crate) mod svg;
