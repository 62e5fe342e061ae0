//! # In-Memory Collaborators
//!
//! Self-contained implementations of the external services, used by the demo
//! binary and by end-to-end tests. They behave like a tiny fake backend:
//! updates written through [`MemoryUserService`] are visible to the next fetch
//! from the [`MemoryDataSource`] they share.

use crate::clients::{DataSource, FieldValidator, ServiceError, UserService};
use crate::framework::FetchError;
use crate::model::{ProfileDraft, ProfileField, ResourceKind, User};
use crate::profile_form::SaveError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
struct Stored {
    payload: Result<serde_json::Value, FetchError>,
    latency: Duration,
}

/// A data source backed by a map of JSON payloads.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    records: RwLock<HashMap<(ResourceKind, String), Stored>>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, kind: ResourceKind, id: &str, update: impl FnOnce(&mut Stored)) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let stored = records.entry((kind, id.to_string())).or_insert_with(|| Stored {
            payload: Err(FetchError::NotFound(kind.key(id).to_string())),
            latency: Duration::ZERO,
        });
        update(stored);
    }

    /// Stores the payload served for `kind`/`id`.
    pub fn insert(&self, kind: ResourceKind, id: &str, payload: serde_json::Value) {
        self.write(kind, id, |stored| stored.payload = Ok(payload));
    }

    /// Makes every fetch of `kind`/`id` fail with `error`.
    pub fn fail(&self, kind: ResourceKind, id: &str, error: FetchError) {
        self.write(kind, id, |stored| stored.payload = Err(error));
    }

    /// Delays every fetch of `kind`/`id`.
    pub fn set_latency(&self, kind: ResourceKind, id: &str, latency: Duration) {
        self.write(kind, id, |stored| stored.latency = latency);
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    #[instrument(skip(self))]
    async fn fetch(&self, kind: ResourceKind, id: &str) -> Result<serde_json::Value, FetchError> {
        let stored = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(kind, id.to_string()))
            .cloned();

        let Some(stored) = stored else {
            return Err(FetchError::NotFound(kind.key(id).to_string()));
        };
        if !stored.latency.is_zero() {
            tokio::time::sleep(stored.latency).await;
        }
        debug!(ok = stored.payload.is_ok(), "Served");
        stored.payload
    }
}

/// Local validation rules standing in for the remote validator.
///
/// - `name`: not blank, at most 50 characters.
/// - `bio`: at most 280 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub const MAX_NAME_CHARS: usize = 50;
    pub const MAX_BIO_CHARS: usize = 280;
}

#[async_trait]
impl FieldValidator for RuleValidator {
    async fn validate_field(&self, field: ProfileField, value: &str) -> Result<bool, ServiceError> {
        let valid = match field {
            ProfileField::Name => {
                !value.trim().is_empty() && value.chars().count() <= Self::MAX_NAME_CHARS
            }
            ProfileField::Bio => value.chars().count() <= Self::MAX_BIO_CHARS,
        };
        Ok(valid)
    }
}

/// Writes profile updates into a shared [`MemoryDataSource`].
#[derive(Debug, Clone)]
pub struct MemoryUserService {
    source: Arc<MemoryDataSource>,
}

impl MemoryUserService {
    pub fn new(source: Arc<MemoryDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl UserService for MemoryUserService {
    #[instrument(skip(self))]
    async fn update_user(&self, id: &str, draft: &ProfileDraft) -> Result<Option<User>, SaveError> {
        let current = self
            .source
            .fetch(ResourceKind::User, id)
            .await
            .map_err(|e| SaveError::Rejected(e.to_string()))?;
        let current: User = serde_json::from_value(current)
            .map_err(|e| SaveError::Rejected(e.to_string()))?;

        let updated = current.with_draft(draft);
        let payload =
            serde_json::to_value(&updated).map_err(|e| SaveError::Rejected(e.to_string()))?;
        self.source.insert(ResourceKind::User, id, payload);
        info!(%id, "User updated");
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_source_serves_and_fails() {
        let source = MemoryDataSource::new();
        source.insert(ResourceKind::Analytics, "1", json!({ "views": 3, "likes": 1 }));
        source.fail(ResourceKind::Posts, "1", FetchError::Transport("offline".into()));

        let analytics = source.fetch(ResourceKind::Analytics, "1").await.unwrap();
        assert_eq!(analytics["views"], 3);
        assert!(matches!(
            source.fetch(ResourceKind::Posts, "1").await,
            Err(FetchError::Transport(_))
        ));
        assert!(matches!(
            source.fetch(ResourceKind::User, "1").await,
            Err(FetchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rule_validator() {
        let validator = RuleValidator;
        assert_eq!(validator.validate_field(ProfileField::Name, "Alice").await, Ok(true));
        assert_eq!(validator.validate_field(ProfileField::Name, "   ").await, Ok(false));
        let long_bio = "x".repeat(RuleValidator::MAX_BIO_CHARS + 1);
        assert_eq!(validator.validate_field(ProfileField::Bio, &long_bio).await, Ok(false));
    }

    #[tokio::test]
    async fn test_user_service_writes_back() {
        let source = Arc::new(MemoryDataSource::new());
        source.insert(
            ResourceKind::User,
            "42",
            json!({ "id": "42", "name": "Al", "bio": "old" }),
        );
        let service = MemoryUserService::new(source.clone());

        let draft = ProfileDraft {
            name: "Alice".into(),
            bio: "new".into(),
        };
        let saved = service.update_user("42", &draft).await.unwrap();
        assert_eq!(saved, Some(User::new("42", "Alice", "new")));

        let stored = source.fetch(ResourceKind::User, "42").await.unwrap();
        assert_eq!(stored["name"], "Alice");
    }
}
