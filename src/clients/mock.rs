//! # Client Mocks
//!
//! Scripted stand-ins for the external collaborators, built on
//! [`Script`](crate::framework::mock::Script).
//!
//! A call that was not scripted, or whose deferred response was dropped, fails
//! with a transport-style error so the code under test sees an ordinary
//! failure. `verify()` still reports it afterwards.

use crate::clients::{DataSource, FieldValidator, ServiceError, UserService};
use crate::framework::mock::{ExpectationBuilder, Script};
use crate::framework::FetchError;
use crate::model::{ProfileDraft, ProfileField, ResourceKind, User};
use crate::profile_form::SaveError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

const NO_RESPONSE: &str = "no scripted response";

type FetchKey = (ResourceKind, String);

/// Mock [`DataSource`], scripted per `(kind, id)`.
#[derive(Clone, Default)]
pub struct MockDataSource {
    script: Script<FetchKey, Result<Value, FetchError>>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_fetch(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> ExpectationBuilder<FetchKey, Result<Value, FetchError>> {
        self.script.expect((kind, id.to_string()))
    }

    pub fn fetch_count(&self, kind: ResourceKind, id: &str) -> usize {
        self.script.call_count(&(kind, id.to_string()))
    }

    pub fn verify(&self) {
        self.script.verify();
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch(&self, kind: ResourceKind, id: &str) -> Result<Value, FetchError> {
        self.script
            .next((kind, id.to_string()))
            .await
            .unwrap_or_else(|| Err(FetchError::Transport(NO_RESPONSE.to_string())))
    }
}

/// Argument log shared by the clones of one mock.
type Recorded<T> = Arc<Mutex<Vec<T>>>;

fn record<T>(log: &Recorded<T>, entry: T) {
    log.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
}

fn recorded<T: Clone>(log: &Recorded<T>) -> Vec<T> {
    log.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Mock [`FieldValidator`], scripted per field.
#[derive(Clone, Default)]
pub struct MockValidator {
    script: Script<ProfileField, Result<bool, ServiceError>>,
    values: Recorded<(ProfileField, String)>,
}

impl MockValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_validate(
        &self,
        field: ProfileField,
    ) -> ExpectationBuilder<ProfileField, Result<bool, ServiceError>> {
        self.script.expect(field)
    }

    pub fn validate_count(&self, field: ProfileField) -> usize {
        self.script.call_count(&field)
    }

    /// Every `(field, value)` sent for validation, in call order.
    pub fn validated_values(&self) -> Vec<(ProfileField, String)> {
        recorded(&self.values)
    }

    pub fn verify(&self) {
        self.script.verify();
    }
}

#[async_trait]
impl FieldValidator for MockValidator {
    async fn validate_field(&self, field: ProfileField, value: &str) -> Result<bool, ServiceError> {
        record(&self.values, (field, value.to_string()));
        self.script
            .next(field)
            .await
            .unwrap_or_else(|| Err(ServiceError::Transport(NO_RESPONSE.to_string())))
    }
}

/// Mock [`UserService`], scripted per user id.
#[derive(Clone, Default)]
pub struct MockUserService {
    script: Script<String, Result<Option<User>, SaveError>>,
    updates: Recorded<(String, ProfileDraft)>,
}

impl MockUserService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_update(
        &self,
        id: &str,
    ) -> ExpectationBuilder<String, Result<Option<User>, SaveError>> {
        self.script.expect(id.to_string())
    }

    pub fn update_count(&self, id: &str) -> usize {
        self.script.call_count(&id.to_string())
    }

    /// Every `(id, draft)` sent for update, in call order.
    pub fn updates(&self) -> Vec<(String, ProfileDraft)> {
        recorded(&self.updates)
    }

    pub fn verify(&self) {
        self.script.verify();
    }
}

#[async_trait]
impl UserService for MockUserService {
    async fn update_user(&self, id: &str, draft: &ProfileDraft) -> Result<Option<User>, SaveError> {
        record(&self.updates, (id.to_string(), draft.clone()));
        self.script
            .next(id.to_string())
            .await
            .unwrap_or_else(|| {
                Err(SaveError::Service(ServiceError::Transport(
                    NO_RESPONSE.to_string(),
                )))
            })
    }
}
