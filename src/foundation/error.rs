/// Result alias used across the crate.
pub type FlowlinesResult<T> = Result<T, FlowlinesError>;

/// Error type for configuration, auto-layout, rendering, and serialization failures.
///
/// Recomputation and clock ticks never fail; they degrade to stale or partial output instead.
#[derive(thiserror::Error, Debug)]
pub enum FlowlinesError {
    /// A diagram, connector, or timeline definition violates an invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Headless auto-layout could not place the node boxes.
    #[error("layout error: {0}")]
    Layout(String),

    /// SVG snapshot could not be parsed or rasterized.
    #[error("render error: {0}")]
    Render(String),

    /// JSON input or output failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowlinesError {
    /// Build a [`FlowlinesError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlowlinesError::Layout`].
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`FlowlinesError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FlowlinesError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for FlowlinesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

impl From<taffy::TaffyError> for FlowlinesError {
    fn from(err: taffy::TaffyError) -> Self {
        Self::Layout(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
