//! # Cache Messages
//!
//! The message types exchanged between [`CacheClient`](crate::framework::CacheClient)
//! and [`CacheActor`](crate::framework::CacheActor).

use crate::framework::error::FetchError;
use crate::framework::key::{Loader, ResourceKey, ResourceState};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<T>;

/// Requests a caller can send to the cache actor.
pub enum CacheRequest<V> {
    /// Return the value, parking the caller until the load settles if needed.
    Read {
        key: ResourceKey,
        loader: Loader<V>,
        respond_to: Response<Result<V, FetchError>>,
    },
    /// Like `Read`, but answers `Pending` immediately instead of parking.
    TryRead {
        key: ResourceKey,
        loader: Loader<V>,
        respond_to: Response<ResourceState<V>>,
    },
    /// Inspect an entry without starting a load.
    Peek {
        key: ResourceKey,
        respond_to: Response<Option<ResourceState<V>>>,
    },
    /// Drop the entry so the next read fetches again.
    Invalidate {
        key: ResourceKey,
        respond_to: Response<bool>,
    },
}

impl<V> std::fmt::Debug for CacheRequest<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheRequest::Read { key, .. } => f.debug_struct("Read").field("key", key).finish(),
            CacheRequest::TryRead { key, .. } => {
                f.debug_struct("TryRead").field("key", key).finish()
            }
            CacheRequest::Peek { key, .. } => f.debug_struct("Peek").field("key", key).finish(),
            CacheRequest::Invalidate { key, .. } => {
                f.debug_struct("Invalidate").field("key", key).finish()
            }
        }
    }
}

/// Completion of a spawned load, delivered back to the actor loop.
///
/// `generation` identifies the load that produced it. A result whose generation
/// no longer matches the entry (because the key was invalidated meanwhile) is
/// handed to that load's waiters but never stored.
#[derive(Debug)]
pub(crate) struct Settled<V> {
    pub key: ResourceKey,
    pub generation: u64,
    pub result: Result<V, FetchError>,
}
