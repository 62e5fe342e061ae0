//! Errors reported by external service collaborators.

use thiserror::Error;

/// A call to the validation or update service did not complete normally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The request never got a usable response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a failure status.
    #[error("Service returned {status}: {message}")]
    Status { status: u16, message: String },
}
