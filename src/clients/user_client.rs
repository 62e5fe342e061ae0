//! # Update Service
//!
//! The write side of the external API, used by the profile edit form on Save.

use crate::model::{ProfileDraft, User};
use crate::profile_form::SaveError;
use async_trait::async_trait;

/// Persists profile edits.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Sends the full draft for user `id`.
    ///
    /// Returns the server-confirmed record, or `None` when the API answers
    /// without a body. In that case the caller applies the draft itself.
    async fn update_user(&self, id: &str, draft: &ProfileDraft) -> Result<Option<User>, SaveError>;
}
