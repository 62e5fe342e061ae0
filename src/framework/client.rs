//! # Cache Client
//!
//! The handle callers use to talk to a [`CacheActor`](crate::framework::CacheActor).

use crate::framework::error::{FetchError, FrameworkError};
use crate::framework::key::{Loader, ResourceKey, ResourceState};
use crate::framework::message::CacheRequest;
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

/// A type-safe client for the resource cache.
///
/// It holds only a sender, so cloning is cheap. Every section boundary of a
/// dashboard shares clones of one client, and therefore one cache.
pub struct CacheClient<V> {
    sender: mpsc::Sender<CacheRequest<V>>,
}

impl<V> Clone for CacheClient<V> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<V> CacheClient<V> {
    pub fn new(sender: mpsc::Sender<CacheRequest<V>>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> CacheRequest<V>,
    ) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }

    /// Reads `key`, suspending until its load settles if it is pending.
    ///
    /// `loader` is only invoked when the key has never been seen (or was
    /// invalidated). A stored failure is returned as-is. It is up to the
    /// caller's boundary to turn it into a fallback.
    #[instrument(skip(self, loader))]
    pub async fn read(&self, key: ResourceKey, loader: Loader<V>) -> Result<V, FetchError> {
        self.request(|respond_to| CacheRequest::Read {
            key,
            loader,
            respond_to,
        })
        .await?
    }

    /// Non-suspending read: starts the load if needed and reports the state.
    pub async fn try_read(&self, key: ResourceKey, loader: Loader<V>) -> ResourceState<V> {
        self.request(|respond_to| CacheRequest::TryRead {
            key,
            loader,
            respond_to,
        })
        .await
        .unwrap_or_else(|e| ResourceState::Failed(e.into()))
    }

    /// Inspects an entry without loading. `None` means the key is unseen.
    pub async fn peek(&self, key: &ResourceKey) -> Option<ResourceState<V>> {
        self.request(|respond_to| CacheRequest::Peek {
            key: key.clone(),
            respond_to,
        })
        .await
        .unwrap_or_else(|e| Some(ResourceState::Failed(e.into())))
    }

    /// Removes the entry for `key`. Returns whether there was one.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, key: &ResourceKey) -> Result<bool, FrameworkError> {
        self.request(|respond_to| CacheRequest::Invalidate {
            key: key.clone(),
            respond_to,
        })
        .await
    }
}
