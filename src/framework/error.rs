//! # Framework Errors
//!
//! Errors shared by the cache actor, its client and every section boundary.
//!
//! All of them are `Clone`: a single load result is fanned out to every reader
//! parked on the same key, so the error has to be handed to each of them.

/// Errors raised by the cache plumbing itself (not by a data source).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Cache actor closed")]
    ActorClosed,
    #[error("Cache actor dropped response channel")]
    ActorDropped,
}

/// A resource could not be produced for a key.
///
/// This is the only error a [`SectionBoundary`](crate::framework::SectionBoundary)
/// ever sees. It is converted into an `Unavailable` view there and goes no further.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FetchError {
    /// Network or transport failure reported by the data source.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The data source has nothing for this resource.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The payload arrived but did not match the expected record shape.
    #[error("Decode error for {kind}: {reason}")]
    Decode { kind: String, reason: String },

    /// The loader task panicked or was cancelled before producing a result.
    #[error("Loader failed: {0}")]
    Panicked(String),

    #[error(transparent)]
    Framework(#[from] FrameworkError),
}
