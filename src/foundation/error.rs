/// Convenience result type used across framevault.
pub type FramevaultResult<T> = Result<T, FramevaultError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum FramevaultError {
    /// Invalid user-provided data (bad rectangle, bad tile size, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors in the per-object hash cache graph (unknown slot, cycle).
    #[error("hash graph error: {0}")]
    HashGraph(String),

    /// Errors in the thread-local action context stack.
    #[error("action context error: {0}")]
    Context(String),

    /// Pixel-format errors (unsupported bit depth, depth mismatch).
    #[error("pixel format error: {0}")]
    PixelFormat(String),

    /// Errors when serializing or deserializing cache metadata.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramevaultError {
    /// Build a [`FramevaultError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramevaultError::HashGraph`] value.
    pub fn hash_graph(msg: impl Into<String>) -> Self {
        Self::HashGraph(msg.into())
    }

    /// Build a [`FramevaultError::Context`] value.
    pub fn context(msg: impl Into<String>) -> Self {
        Self::Context(msg.into())
    }

    /// Build a [`FramevaultError::PixelFormat`] value.
    pub fn pixel_format(msg: impl Into<String>) -> Self {
        Self::PixelFormat(msg.into())
    }

    /// Build a [`FramevaultError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
