//! # Data Source
//!
//! The read side of the external API. The dashboard only knows it as "give me
//! the JSON for this kind of resource and this entity".

use crate::framework::{loader, FetchError, Loader};
use crate::model::{Resource, ResourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Fetches raw resource payloads.
///
/// Implementations report transport problems as [`FetchError::Transport`] or
/// [`FetchError::NotFound`]. Decoding is not their job: the loader returned
/// by [`resource_loader`] does it, so shape errors become cache failures too.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, kind: ResourceKind, id: &str) -> Result<serde_json::Value, FetchError>;
}

/// Builds the cache loader for one resource: fetch, then decode.
pub fn resource_loader(
    source: Arc<dyn DataSource>,
    kind: ResourceKind,
    id: impl Into<String>,
) -> Loader<Resource> {
    let id = id.into();
    loader(move || async move {
        debug!(%kind, %id, "Fetching");
        let payload = source.fetch(kind, &id).await?;
        Resource::decode(kind, payload)
    })
}
