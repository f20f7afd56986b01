use crate::store::StoreError;

/// Convenience result type used across Fractime.
pub type FractimeResult<T> = Result<T, FractimeError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Time-source failures are deliberately absent: they are recovered locally
/// by falling back to fixed fractal constants and never surface here.
#[derive(thiserror::Error, Debug)]
pub enum FractimeError {
    /// Invalid caller-provided data (resolution, zoom, table contents).
    #[error("validation error: {0}")]
    Validation(String),

    /// The request failed its size class's privilege requirement.
    ///
    /// Evaluated before any cache or render work happens. An explicit result
    /// value, not a panic path.
    #[error("invalid permissions: {0}")]
    PermissionDenied(String),

    /// A backend (object store, metadata store, cache, queue) failed.
    ///
    /// Safe for the caller to retry: publish is an idempotent overwrite.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FractimeError {
    /// Build a [`FractimeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FractimeError::PermissionDenied`] value.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Build a [`FractimeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
