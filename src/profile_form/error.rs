//! Error types for the profile edit form.

use crate::clients::ServiceError;
use crate::model::ProfileField;
use thiserror::Error;

use super::FormMode;

/// A field value was not accepted. Local to one field; only gates Save.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The validation service judged the value invalid.
    #[error("{field} was rejected")]
    Rejected { field: ProfileField },

    /// The validation service could not be reached; the value is unverified.
    #[error("{field} could not be validated: {reason}")]
    Unavailable { field: ProfileField, reason: String },

    /// The update service refused the value on save.
    #[error("{field} was refused by the server: {reason}")]
    Refused { field: ProfileField, reason: String },
}

/// The update call failed. The form returns to `Editing` with the draft intact.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SaveError {
    /// The server answered with a non-success status.
    #[error("Save rejected: {0}")]
    Rejected(String),

    /// The server pinned the failure on one field.
    #[error("Save rejected for {field}: {reason}")]
    Field { field: ProfileField, reason: String },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// A form operation was not allowed in the current state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Cannot {action} while {mode:?}")]
    InvalidTransition {
        action: &'static str,
        mode: FormMode,
    },

    #[error("Cannot save with invalid fields: {0:?}")]
    FieldErrors(Vec<ProfileField>),

    #[error("Cannot save while {0:?} is being validated")]
    ValidationPending(Vec<ProfileField>),

    #[error(transparent)]
    Save(#[from] SaveError),
}
