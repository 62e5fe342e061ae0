use crate::clients::{FieldValidator, UserService};
use crate::framework::{CacheClient, ResourceKey};
use crate::model::{ProfileDraft, ProfileField, Resource, ResourceKind, User};
use crate::profile_form::{
    FormError, FormMode, SaveError, SaveTicket, ValidationError, ValidationOutcome,
    ValidationTicket,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Edit state for one user's profile.
///
/// Owned exclusively by the editable profile section. The read-only view and
/// the other sections never see it.
pub struct ProfileEditForm {
    original: User,
    draft: ProfileDraft,
    mode: FormMode,
    field_errors: BTreeMap<ProfileField, ValidationError>,
    /// Current validation ticket per field.
    validating: BTreeMap<ProfileField, u64>,
    next_ticket: u64,
    form_error: Option<SaveError>,
    validator: Arc<dyn FieldValidator>,
    users: Arc<dyn UserService>,
    cache: CacheClient<Resource>,
    user_key: ResourceKey,
}

impl ProfileEditForm {
    /// Creates a form in `Viewing` for an already resolved user record.
    pub fn new(
        original: User,
        validator: Arc<dyn FieldValidator>,
        users: Arc<dyn UserService>,
        cache: CacheClient<Resource>,
    ) -> Self {
        let user_key = ResourceKind::User.key(&original.id);
        Self {
            draft: ProfileDraft::from(&original),
            original,
            mode: FormMode::Viewing,
            field_errors: BTreeMap::new(),
            validating: BTreeMap::new(),
            next_ticket: 0,
            form_error: None,
            validator,
            users,
            cache,
            user_key,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn original(&self) -> &User {
        &self.original
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn field_errors(&self) -> &BTreeMap<ProfileField, ValidationError> {
        &self.field_errors
    }

    pub fn field_error(&self, field: ProfileField) -> Option<&ValidationError> {
        self.field_errors.get(&field)
    }

    pub fn is_validating(&self, field: ProfileField) -> bool {
        self.validating.contains_key(&field)
    }

    /// The last save failure that was not attributed to a single field.
    pub fn form_error(&self) -> Option<&SaveError> {
        self.form_error.as_ref()
    }

    /// Save is enabled only while editing with no field errors and no
    /// validation in flight.
    pub fn can_save(&self) -> bool {
        self.mode == FormMode::Editing && self.field_errors.is_empty() && self.validating.is_empty()
    }

    fn require(&self, mode: FormMode, action: &'static str) -> Result<(), FormError> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(FormError::InvalidTransition {
                action,
                mode: self.mode,
            })
        }
    }

    fn reset_draft(&mut self) {
        self.draft = ProfileDraft::from(&self.original);
        self.field_errors.clear();
        self.validating.clear();
        self.form_error = None;
    }

    /// `Viewing -> Editing`. The draft starts as a copy of `original`.
    pub fn start_edit(&mut self) -> Result<(), FormError> {
        self.require(FormMode::Viewing, "start editing")?;
        self.reset_draft();
        self.mode = FormMode::Editing;
        info!(user_id = %self.original.id, "Editing started");
        Ok(())
    }

    /// Updates one field of the draft. The other field is left as is.
    ///
    /// A changed value supersedes any validation still pending for the field.
    /// Rejected while `Saving`; the draft is not touched then.
    pub fn set_field(
        &mut self,
        field: ProfileField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        self.require(FormMode::Editing, "edit")?;
        let value = value.into();
        if self.draft.get(field) == value {
            return Ok(());
        }
        if self.validating.remove(&field).is_some() {
            debug!(%field, "Pending validation superseded by edit");
        }
        self.draft.set(field, value);
        Ok(())
    }

    /// `Editing -> Viewing`. Discards the draft without any external call.
    pub fn cancel(&mut self) -> Result<(), FormError> {
        self.require(FormMode::Editing, "cancel")?;
        self.reset_draft();
        self.mode = FormMode::Viewing;
        info!(user_id = %self.original.id, "Editing cancelled");
        Ok(())
    }

    /// Marks `field` as validating and issues a ticket for its current value.
    ///
    /// Issuing a new ticket for the same field supersedes the previous one.
    pub fn begin_validation(&mut self, field: ProfileField) -> Result<ValidationTicket, FormError> {
        self.require(FormMode::Editing, "validate")?;
        self.next_ticket += 1;
        let generation = self.next_ticket;
        self.validating.insert(field, generation);
        Ok(ValidationTicket {
            field,
            value: self.draft.get(field).to_string(),
            generation,
            validator: self.validator.clone(),
        })
    }

    /// Applies a validation outcome. Returns whether it was applied.
    ///
    /// The outcome is discarded when its ticket was superseded, when the form
    /// left `Editing`, or when the draft value changed since the ticket was
    /// issued.
    pub fn apply_validation(&mut self, outcome: ValidationOutcome) -> bool {
        let field = outcome.field;
        if self.validating.get(&field) != Some(&outcome.generation) {
            debug!(%field, generation = outcome.generation, "Discarding superseded validation");
            return false;
        }
        self.validating.remove(&field);

        if self.mode != FormMode::Editing || self.draft.get(field) != outcome.value {
            debug!(%field, mode = ?self.mode, "Discarding stale validation");
            return false;
        }

        match outcome.result {
            Ok(true) => {
                self.field_errors.remove(&field);
                debug!(%field, "Field valid");
            }
            Ok(false) => {
                self.field_errors
                    .insert(field, ValidationError::Rejected { field });
                debug!(%field, "Field rejected");
            }
            Err(error) => {
                warn!(%field, %error, "Validation service unavailable");
                self.field_errors.insert(
                    field,
                    ValidationError::Unavailable {
                        field,
                        reason: error.to_string(),
                    },
                );
            }
        }
        true
    }

    /// Runs a blur validation for `field` to completion.
    pub async fn blur(&mut self, field: ProfileField) -> Result<bool, FormError> {
        let ticket = self.begin_validation(field)?;
        let outcome = ticket.run().await;
        Ok(self.apply_validation(outcome))
    }

    /// `Editing -> Saving`. Refused while any field has an error or is still
    /// being validated, in which case no update is issued.
    pub fn begin_save(&mut self) -> Result<SaveTicket, FormError> {
        self.require(FormMode::Editing, "save")?;
        if !self.field_errors.is_empty() {
            let fields = self.field_errors.keys().copied().collect();
            return Err(FormError::FieldErrors(fields));
        }
        if !self.validating.is_empty() {
            let fields = self.validating.keys().copied().collect();
            return Err(FormError::ValidationPending(fields));
        }

        self.mode = FormMode::Saving;
        self.form_error = None;
        info!(user_id = %self.original.id, "Saving");
        Ok(SaveTicket {
            user_id: self.original.id.clone(),
            draft: self.draft.clone(),
            users: self.users.clone(),
        })
    }

    /// Settles a save.
    ///
    /// On success the form returns to `Viewing` with `original` replaced by
    /// the server record, or by the draft applied locally when the server sent
    /// none, and the cached user is invalidated. On failure it returns to
    /// `Editing` with the draft intact and the error recorded.
    pub async fn finish_save(
        &mut self,
        result: Result<Option<User>, SaveError>,
    ) -> Result<(), FormError> {
        self.require(FormMode::Saving, "finish saving")?;
        match result {
            Ok(confirmed) => {
                self.original = confirmed.unwrap_or_else(|| self.original.with_draft(&self.draft));
                self.reset_draft();
                self.mode = FormMode::Viewing;
                info!(user_id = %self.original.id, "Saved");
                if let Err(error) = self.cache.invalidate(&self.user_key).await {
                    warn!(key = %self.user_key, %error, "Could not invalidate saved user");
                }
                Ok(())
            }
            Err(error) => {
                self.mode = FormMode::Editing;
                match &error {
                    SaveError::Field { field, reason } => {
                        self.field_errors.insert(
                            *field,
                            ValidationError::Refused {
                                field: *field,
                                reason: reason.clone(),
                            },
                        );
                    }
                    _ => self.form_error = Some(error.clone()),
                }
                warn!(user_id = %self.original.id, %error, "Save failed");
                Err(error.into())
            }
        }
    }

    /// Runs a whole save cycle.
    pub async fn save(&mut self) -> Result<(), FormError> {
        let ticket = self.begin_save()?;
        let result = ticket.submit().await;
        self.finish_save(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockUserService, MockValidator, ServiceError};
    use crate::framework::CacheActor;

    struct Harness {
        form: ProfileEditForm,
        validator: MockValidator,
        users: MockUserService,
    }

    fn harness() -> Harness {
        let (actor, cache) = CacheActor::new(8);
        tokio::spawn(actor.run());
        let validator = MockValidator::new();
        let users = MockUserService::new();
        let form = ProfileEditForm::new(
            User::new("42", "Al", "hello"),
            Arc::new(validator.clone()),
            Arc::new(users.clone()),
            cache,
        );
        Harness {
            form,
            validator,
            users,
        }
    }

    #[tokio::test]
    async fn test_start_edit_copies_original() {
        let Harness { mut form, .. } = harness();
        assert_eq!(form.mode(), FormMode::Viewing);

        form.start_edit().unwrap();

        assert_eq!(form.mode(), FormMode::Editing);
        assert_eq!(form.draft(), &ProfileDraft::from(form.original()));
    }

    #[tokio::test]
    async fn test_sequential_edits_keep_both_fields() {
        let Harness { mut form, .. } = harness();
        form.start_edit().unwrap();

        form.set_field(ProfileField::Name, "Alice").unwrap();
        form.set_field(ProfileField::Bio, "rustacean").unwrap();

        assert_eq!(form.draft().name, "Alice");
        assert_eq!(form.draft().bio, "rustacean");
    }

    #[tokio::test]
    async fn test_cancel_restores_original() {
        let Harness { mut form, users, .. } = harness();
        form.start_edit().unwrap();
        form.set_field(ProfileField::Name, "Bob").unwrap();

        form.cancel().unwrap();

        assert_eq!(form.mode(), FormMode::Viewing);
        assert_eq!(form.draft().name, "Al");
        assert_eq!(form.draft().bio, "hello");
        users.verify();
    }

    #[tokio::test]
    async fn test_edit_requires_editing_mode() {
        let Harness { mut form, .. } = harness();

        let result = form.set_field(ProfileField::Name, "Bob");

        assert_eq!(
            result,
            Err(FormError::InvalidTransition {
                action: "edit",
                mode: FormMode::Viewing
            })
        );
        assert_eq!(form.draft().name, "Al");
    }

    #[tokio::test]
    async fn test_rejected_field_blocks_save() {
        let Harness {
            mut form,
            validator,
            users,
        } = harness();
        validator.expect_validate(ProfileField::Name).return_ok(false);
        form.start_edit().unwrap();
        form.set_field(ProfileField::Name, "").unwrap();

        assert!(form.blur(ProfileField::Name).await.unwrap());

        assert_eq!(
            form.field_error(ProfileField::Name),
            Some(&ValidationError::Rejected {
                field: ProfileField::Name
            })
        );
        assert!(!form.can_save());
        assert_eq!(
            form.save().await,
            Err(FormError::FieldErrors(vec![ProfileField::Name]))
        );
        assert_eq!(users.update_count("42"), 0);
        validator.verify();
    }

    #[tokio::test]
    async fn test_stale_validation_is_discarded() {
        let Harness {
            mut form,
            validator,
            ..
        } = harness();
        validator.expect_validate(ProfileField::Name).return_ok(false);
        form.start_edit().unwrap();
        form.set_field(ProfileField::Name, "").unwrap();

        let ticket = form.begin_validation(ProfileField::Name).unwrap();
        form.set_field(ProfileField::Name, "Alice").unwrap();
        let outcome = ticket.run().await;

        assert!(!form.apply_validation(outcome));
        assert!(form.field_errors().is_empty());
        assert!(!form.is_validating(ProfileField::Name));
    }

    #[tokio::test]
    async fn test_superseded_validation_is_discarded() {
        let Harness {
            mut form,
            validator,
            ..
        } = harness();
        let first = validator.expect_validate(ProfileField::Name).defer();
        validator.expect_validate(ProfileField::Name).return_ok(true);
        form.start_edit().unwrap();

        let older = form.begin_validation(ProfileField::Name).unwrap();
        let newer = form.begin_validation(ProfileField::Name).unwrap();
        let (old_outcome, new_outcome, ()) = tokio::join!(older.run(), newer.run(), async {
            first.resolve_ok(false);
        });

        assert!(form.apply_validation(new_outcome));
        assert!(!form.apply_validation(old_outcome));
        assert!(form.field_errors().is_empty());
        assert!(form.can_save());
    }

    #[tokio::test]
    async fn test_pending_validation_blocks_save() {
        let Harness { mut form, .. } = harness();
        form.start_edit().unwrap();

        let _ticket = form.begin_validation(ProfileField::Bio).unwrap();

        assert!(form.is_validating(ProfileField::Bio));
        assert!(!form.can_save());
        assert!(matches!(
            form.begin_save(),
            Err(FormError::ValidationPending(fields)) if fields == vec![ProfileField::Bio]
        ));
        assert_eq!(form.mode(), FormMode::Editing);
    }

    #[tokio::test]
    async fn test_edits_rejected_while_saving() {
        let Harness { mut form, .. } = harness();
        form.start_edit().unwrap();
        form.set_field(ProfileField::Name, "Alice").unwrap();
        let _ticket = form.begin_save().unwrap();

        let result = form.set_field(ProfileField::Name, "Zed");

        assert!(matches!(
            result,
            Err(FormError::InvalidTransition {
                mode: FormMode::Saving,
                ..
            })
        ));
        assert_eq!(form.draft().name, "Alice");
        assert!(form.cancel().is_err());
    }

    #[tokio::test]
    async fn test_save_success_uses_server_record() {
        let Harness {
            mut form, users, ..
        } = harness();
        users
            .expect_update("42")
            .return_ok(Some(User::new("42", "Alice (verified)", "hello")));
        form.start_edit().unwrap();
        form.set_field(ProfileField::Name, "Alice").unwrap();

        form.save().await.unwrap();

        assert_eq!(form.mode(), FormMode::Viewing);
        assert_eq!(form.original().name, "Alice (verified)");
        assert_eq!(form.draft().name, "Alice (verified)");
        users.verify();
    }

    #[tokio::test]
    async fn test_save_without_body_applies_draft() {
        let Harness {
            mut form, users, ..
        } = harness();
        users.expect_update("42").return_ok(None);
        form.start_edit().unwrap();
        form.set_field(ProfileField::Bio, "new bio").unwrap();

        form.save().await.unwrap();

        assert_eq!(form.original(), &User::new("42", "Al", "new bio"));
    }

    #[tokio::test]
    async fn test_save_failure_keeps_draft() {
        let Harness {
            mut form, users, ..
        } = harness();
        users
            .expect_update("42")
            .return_err(SaveError::Service(ServiceError::Status {
                status: 500,
                message: "boom".into(),
            }));
        form.start_edit().unwrap();
        form.set_field(ProfileField::Name, "Alice").unwrap();

        assert!(matches!(form.save().await, Err(FormError::Save(_))));

        assert_eq!(form.mode(), FormMode::Editing);
        assert_eq!(form.draft().name, "Alice");
        assert!(form.form_error().is_some());
        assert!(form.field_errors().is_empty());
        assert!(form.can_save());
    }

    #[tokio::test]
    async fn test_field_save_failure_becomes_field_error() {
        let Harness {
            mut form, users, ..
        } = harness();
        users.expect_update("42").return_err(SaveError::Field {
            field: ProfileField::Name,
            reason: "taken".into(),
        });
        form.start_edit().unwrap();
        form.set_field(ProfileField::Name, "Admin").unwrap();

        assert!(form.save().await.is_err());

        assert_eq!(form.mode(), FormMode::Editing);
        assert!(form.form_error().is_none());
        assert!(matches!(
            form.field_error(ProfileField::Name),
            Some(ValidationError::Refused { .. })
        ));
        assert!(!form.can_save());
    }
}
