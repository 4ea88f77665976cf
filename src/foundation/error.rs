/// Convenience result type used across ropeline.
pub type RopelineResult<T> = Result<T, RopelineError>;

/// Top-level error taxonomy used by crate APIs.
///
/// Geometry refreshes never produce errors; missing texture metadata degrades to a no-op
/// reported through [`crate::RefreshOutcome`].
#[derive(thiserror::Error, Debug)]
pub enum RopelineError {
    /// Invalid user-provided rects, paths or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// An asset request (fetch, decode, chained load) failed.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RopelineError {
    /// Build a [`RopelineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RopelineError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`RopelineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for RopelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
