//! Error taxonomy.

/// Convenience result type used across the crate.
pub type SynthResult<T> = Result<T, SynthError>;

/// Top-level error taxonomy.
///
/// Configuration errors mean the pipeline itself is invalid and are never retried. The
/// attempt-level variants mean one particular random draw was unlucky; the generator's retry loop
/// consumes them according to its [`RetryPolicy`](crate::generator::RetryPolicy).
#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    /// Invalid configuration, missing resources, or a meta that does not fit the component tree.
    #[error("configuration error: {0}")]
    Config(String),

    /// No configured font can render every character of the sampled text.
    #[error("unrenderable text: {0}")]
    UnrenderableText(String),

    /// Every blend mode failed the visibility check.
    #[error("visibility exhausted: no blend mode keeps the foreground legible")]
    VisibilityExhausted,

    /// A geometric transform degenerated (e.g. a singular homography).
    #[error("geometry error: {0}")]
    Geometry(String),

    /// A pixel filter failed on this particular image.
    #[error("filter error: {0}")]
    Filter(String),

    /// The component does not implement the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Errors when serializing or deserializing metas and configuration documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SynthError {
    /// Build a [`SynthError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SynthError::UnrenderableText`] value.
    pub fn unrenderable(msg: impl Into<String>) -> Self {
        Self::UnrenderableText(msg.into())
    }

    /// Build a [`SynthError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`SynthError::Filter`] value.
    pub fn filter(msg: impl Into<String>) -> Self {
        Self::Filter(msg.into())
    }

    /// Build a [`SynthError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`SynthError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures scoped to a single generation attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UnrenderableText(_) | Self::VisibilityExhausted | Self::Geometry(_) | Self::Filter(_)
        )
    }
}

impl From<serde_json::Error> for SynthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
