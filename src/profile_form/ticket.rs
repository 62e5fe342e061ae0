//! Detached halves of the form's external calls.

use crate::clients::{FieldValidator, ServiceError, UserService};
use crate::model::{ProfileDraft, ProfileField, User};
use crate::profile_form::SaveError;
use std::sync::Arc;
use tracing::debug;

/// One pending blur validation.
pub struct ValidationTicket {
    pub(crate) field: ProfileField,
    pub(crate) value: String,
    pub(crate) generation: u64,
    pub(crate) validator: Arc<dyn FieldValidator>,
}

impl ValidationTicket {
    pub fn field(&self) -> ProfileField {
        self.field
    }

    /// The value being validated, as it was when the ticket was issued.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub async fn run(self) -> ValidationOutcome {
        debug!(field = %self.field, generation = self.generation, "Validating");
        let result = self.validator.validate_field(self.field, &self.value).await;
        ValidationOutcome {
            field: self.field,
            value: self.value,
            generation: self.generation,
            result,
        }
    }
}

/// The answer to a [`ValidationTicket`], to be handed back to the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub(crate) field: ProfileField,
    pub(crate) value: String,
    pub(crate) generation: u64,
    pub(crate) result: Result<bool, ServiceError>,
}

impl ValidationOutcome {
    pub fn field(&self) -> ProfileField {
        self.field
    }

    pub fn result(&self) -> &Result<bool, ServiceError> {
        &self.result
    }
}

/// One issued save. Holds a snapshot of the full draft.
pub struct SaveTicket {
    pub(crate) user_id: String,
    pub(crate) draft: ProfileDraft,
    pub(crate) users: Arc<dyn UserService>,
}

impl SaveTicket {
    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub async fn submit(self) -> Result<Option<User>, SaveError> {
        debug!(user_id = %self.user_id, draft = ?self.draft, "Submitting");
        self.users.update_user(&self.user_id, &self.draft).await
    }
}
