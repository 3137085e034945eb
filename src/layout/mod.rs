//! Connector recomputation and the triggers that drive it.

pub(crate) mod engine;
pub(crate) mod observe;
pub(crate) mod rows;
