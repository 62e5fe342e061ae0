//! # Resource Cache Actor
//!
//! This module defines the `CacheActor`, the server side of the resource cache.
//! It owns every cache entry and processes requests sequentially, so the
//! entry map needs no lock.
//!
//! Loads run in their own tasks. When one finishes, its result comes back to
//! this loop as a [`Settled`] message and is applied here, on the task that
//! owns the state. The per-key waiter lists are resumed from that same place.

use crate::framework::client::CacheClient;
use crate::framework::error::FetchError;
use crate::framework::key::{Loader, ResourceKey, ResourceState};
use crate::framework::message::{CacheRequest, Response, Settled};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type Waiter<V> = Response<Result<V, FetchError>>;

/// One slot of the cache.
enum Entry<V> {
    Pending {
        generation: u64,
        waiters: Vec<Waiter<V>>,
    },
    Resolved(V),
    Failed(FetchError),
}

impl<V: Clone> Entry<V> {
    fn state(&self) -> ResourceState<V> {
        match self {
            Entry::Pending { .. } => ResourceState::Pending,
            Entry::Resolved(value) => ResourceState::Ready(value.clone()),
            Entry::Failed(error) => ResourceState::Failed(error.clone()),
        }
    }
}

/// The actor that owns the cache state.
///
/// # Guarantees
///
/// * At most one load is in flight per key. A read of a pending key joins that
///   key's waiter list, and its own loader is dropped without being called.
/// * An entry goes from `Pending` to `Resolved` or `Failed` once. Only
///   [`CacheClient::invalidate`] removes it.
/// * A result is stored under the key and generation that produced it, and
///   never under any other key.
///
/// # Usage
///
/// ```rust
/// use section_dashboard::framework::{loader, CacheActor, ResourceKey};
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = CacheActor::<String>::new(32);
///     tokio::spawn(actor.run());
///
///     let key = ResourceKey::new(["user", "42"]);
///     let name = client
///         .read(key, loader(|| async { Ok("Alice".to_string()) }))
///         .await
///         .unwrap();
///     assert_eq!(name, "Alice");
/// }
/// ```
pub struct CacheActor<V> {
    receiver: mpsc::Receiver<CacheRequest<V>>,
    settled_tx: mpsc::UnboundedSender<Settled<V>>,
    settled_rx: mpsc::UnboundedReceiver<Settled<V>>,
    store: HashMap<ResourceKey, Entry<V>>,
    // Waiters of pending entries that were invalidated, keyed by load generation.
    detached: HashMap<u64, Vec<Waiter<V>>>,
    next_generation: u64,
}

impl<V> CacheActor<V>
where
    V: Clone + Send + 'static,
{
    /// Creates a new `CacheActor` and its associated `CacheClient`.
    ///
    /// `buffer_size` is the capacity of the request channel. When it is full,
    /// client calls wait for space.
    pub fn new(buffer_size: usize) -> (Self, CacheClient<V>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            settled_tx,
            settled_rx,
            store: HashMap::new(),
            detached: HashMap::new(),
            next_generation: 1,
        };
        (actor, CacheClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    ///
    /// Loads that are still in flight at shutdown are abandoned. Their
    /// results have nowhere to go.
    pub async fn run(mut self) {
        info!("Cache started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle(request),
                    None => break,
                },
                Some(settled) = self.settled_rx.recv() => self.settle(settled),
            }
        }

        info!(size = self.store.len(), "Cache shutdown");
    }

    fn handle(&mut self, request: CacheRequest<V>) {
        match request {
            CacheRequest::Read {
                key,
                loader,
                respond_to,
            } => match self.store.get_mut(&key) {
                Some(Entry::Resolved(value)) => {
                    debug!(%key, "Hit");
                    let _ = respond_to.send(Ok(value.clone()));
                }
                Some(Entry::Failed(error)) => {
                    debug!(%key, %error, "Hit failed entry");
                    let _ = respond_to.send(Err(error.clone()));
                }
                Some(Entry::Pending { waiters, .. }) => {
                    waiters.push(respond_to);
                    debug!(%key, waiters = waiters.len(), "Attached to in-flight load");
                }
                None => {
                    let generation = self.start_load(key.clone(), loader);
                    self.store.insert(
                        key,
                        Entry::Pending {
                            generation,
                            waiters: vec![respond_to],
                        },
                    );
                }
            },
            CacheRequest::TryRead {
                key,
                loader,
                respond_to,
            } => {
                let state = match self.store.get(&key) {
                    Some(entry) => entry.state(),
                    None => {
                        let generation = self.start_load(key.clone(), loader);
                        self.store.insert(
                            key,
                            Entry::Pending {
                                generation,
                                waiters: Vec::new(),
                            },
                        );
                        ResourceState::Pending
                    }
                };
                let _ = respond_to.send(state);
            }
            CacheRequest::Peek { key, respond_to } => {
                let _ = respond_to.send(self.store.get(&key).map(Entry::state));
            }
            CacheRequest::Invalidate { key, respond_to } => {
                let removed = match self.store.remove(&key) {
                    Some(Entry::Pending {
                        generation,
                        waiters,
                    }) => {
                        if !waiters.is_empty() {
                            self.detached.insert(generation, waiters);
                        }
                        true
                    }
                    Some(_) => true,
                    None => false,
                };
                info!(%key, removed, "Invalidated");
                let _ = respond_to.send(removed);
            }
        }
    }

    /// Spawns the load and a watcher that reports its outcome. Returns the
    /// load generation.
    ///
    /// The loader runs inside its own task, so a panic there settles the entry
    /// as [`FetchError::Panicked`] instead of leaving it pending.
    fn start_load(&mut self, key: ResourceKey, loader: Loader<V>) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        info!(%key, generation, "Loading");

        let load = tokio::spawn(async move { loader().await });
        let settled_tx = self.settled_tx.clone();
        tokio::spawn(async move {
            let result = match load.await {
                Ok(result) => result,
                Err(error) => Err(FetchError::Panicked(error.to_string())),
            };
            let _ = settled_tx.send(Settled {
                key,
                generation,
                result,
            });
        });
        generation
    }

    fn settle(&mut self, settled: Settled<V>) {
        let Settled {
            key,
            generation,
            result,
        } = settled;

        let current = matches!(
            self.store.get(&key),
            Some(Entry::Pending { generation: g, .. }) if *g == generation
        );

        let waiters = if current {
            let entry = match &result {
                Ok(value) => Entry::Resolved(value.clone()),
                Err(error) => Entry::Failed(error.clone()),
            };
            match self.store.insert(key.clone(), entry) {
                Some(Entry::Pending { waiters, .. }) => waiters,
                _ => Vec::new(),
            }
        } else {
            debug!(%key, generation, "Superseded load settled; result not stored");
            self.detached.remove(&generation).unwrap_or_default()
        };

        match &result {
            Ok(_) => info!(%key, generation, waiters = waiters.len(), "Resolved"),
            Err(error) => warn!(%key, generation, %error, "Load failed"),
        }

        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::key::loader;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn counting_loader(
        calls: &Arc<AtomicUsize>,
        gate: &Arc<Notify>,
        value: &'static str,
    ) -> Loader<String> {
        let calls = calls.clone();
        let gate = gate.clone();
        loader(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                gate.notified().await;
                Ok(value.to_string())
            }
        })
    }

    fn failing_loader(calls: &Arc<AtomicUsize>) -> Loader<String> {
        let calls = calls.clone();
        loader(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::Transport("connection reset".into())) }
        })
    }

    fn ready_loader(value: &'static str) -> Loader<String> {
        loader(move || async move { Ok(value.to_string()) })
    }

    fn spawn_cache() -> CacheClient<String> {
        let (actor, client) = CacheActor::new(16);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_load() {
        let client = spawn_cache();
        let key = ResourceKey::new(["user", "42"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let (first, second, state) = tokio::join!(
            client.read(key.clone(), counting_loader(&calls, &gate, "Alice")),
            client.read(key.clone(), counting_loader(&calls, &gate, "Mallory")),
            async {
                let state = client.peek(&key).await;
                gate.notify_one();
                state
            }
        );

        assert_eq!(state, Some(ResourceState::Pending));
        assert_eq!(first, Ok("Alice".to_string()));
        assert_eq!(second, Ok("Alice".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_key() {
        let client = spawn_cache();
        let broken = ResourceKey::new(["posts", "42"]);
        let healthy = ResourceKey::new(["notifications", "42"]);
        let calls = Arc::new(AtomicUsize::new(0));

        let (broken_result, healthy_result) = tokio::join!(
            client.read(broken.clone(), failing_loader(&calls)),
            client.read(healthy.clone(), ready_loader("ok")),
        );

        assert!(matches!(broken_result, Err(FetchError::Transport(_))));
        assert_eq!(healthy_result, Ok("ok".to_string()));
        assert!(matches!(
            client.peek(&broken).await,
            Some(ResourceState::Failed(_))
        ));
        assert_eq!(
            client.peek(&healthy).await,
            Some(ResourceState::Ready("ok".to_string()))
        );
    }

    #[tokio::test]
    async fn test_failed_entry_is_sticky_until_invalidated() {
        let client = spawn_cache();
        let key = ResourceKey::new(["analytics", "42"]);
        let calls = Arc::new(AtomicUsize::new(0));

        assert!(client.read(key.clone(), failing_loader(&calls)).await.is_err());
        assert!(client.read(key.clone(), failing_loader(&calls)).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(client.invalidate(&key).await, Ok(true));
        let value = client.read(key.clone(), ready_loader("recovered")).await;
        assert_eq!(value, Ok("recovered".to_string()));
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let client = spawn_cache();
        let key = ResourceKey::new(["user", "7"]);

        assert_eq!(
            client.read(key.clone(), ready_loader("before")).await,
            Ok("before".to_string())
        );
        // Cached: a second loader is never consulted.
        assert_eq!(
            client.read(key.clone(), ready_loader("ignored")).await,
            Ok("before".to_string())
        );

        assert_eq!(client.invalidate(&key).await, Ok(true));
        assert_eq!(client.peek(&key).await, None);
        assert_eq!(
            client.read(key.clone(), ready_loader("after")).await,
            Ok("after".to_string())
        );
        assert_eq!(client.invalidate(&ResourceKey::new(["user", "8"])).await, Ok(false));
    }

    #[tokio::test]
    async fn test_invalidate_while_pending_still_resumes_waiters() {
        let client = spawn_cache();
        let key = ResourceKey::new(["user", "42"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let (result, removed) = tokio::join!(
            client.read(key.clone(), counting_loader(&calls, &gate, "stale")),
            async {
                let removed = client.invalidate(&key).await;
                gate.notify_one();
                removed
            }
        );

        assert_eq!(removed, Ok(true));
        assert_eq!(result, Ok("stale".to_string()));
        // The superseded result was handed out but never stored.
        assert_eq!(client.peek(&key).await, None);
        assert_eq!(
            client.read(key.clone(), ready_loader("fresh")).await,
            Ok("fresh".to_string())
        );
    }

    #[tokio::test]
    async fn test_panicking_loader_settles_as_failed() {
        let client = spawn_cache();
        let key = ResourceKey::new(["user", "13"]);
        let broken: Loader<String> = loader(|| async { panic!("decoder bug") });

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            client.read(key.clone(), broken),
        )
        .await
        .expect("read should settle");

        assert!(matches!(result, Err(FetchError::Panicked(_))));
        assert!(matches!(
            client.peek(&key).await,
            Some(ResourceState::Failed(FetchError::Panicked(_)))
        ));

        assert_eq!(client.invalidate(&key).await, Ok(true));
        assert_eq!(
            client.read(key.clone(), ready_loader("healthy")).await,
            Ok("healthy".to_string())
        );
    }

    #[tokio::test]
    async fn test_try_read_reports_pending_then_ready() {
        let client = spawn_cache();
        let key = ResourceKey::new(["posts", "1"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let state = client
            .try_read(key.clone(), counting_loader(&calls, &gate, "posts"))
            .await;
        assert_eq!(state, ResourceState::Pending);

        gate.notify_one();
        let value = client.read(key.clone(), ready_loader("unused")).await;
        assert_eq!(value, Ok("posts".to_string()));
        assert_eq!(
            client.try_read(key, ready_loader("unused")).await,
            ResourceState::Ready("posts".to_string())
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
