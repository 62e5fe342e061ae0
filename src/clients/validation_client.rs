//! # Validation Service
//!
//! Per-field validation, invoked when a field loses focus.

use crate::clients::ServiceError;
use crate::model::ProfileField;
use async_trait::async_trait;

/// Checks a single field value. `Ok(true)` means the value is acceptable.
#[async_trait]
pub trait FieldValidator: Send + Sync {
    async fn validate_field(&self, field: ProfileField, value: &str) -> Result<bool, ServiceError>;
}
