pub(crate) mod anchor;
pub(crate) mod path;
pub(crate) mod waypoint;
