//! # Keys, Loaders and Resource States
//!
//! The vocabulary shared by the cache actor and its callers.

use crate::framework::error::FetchError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Identifies one fetchable resource as an ordered tuple of strings.
///
/// Keys compare structurally, so two keys built from the same logical inputs
/// (`["user", "42"]`) always hit the same cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(Vec<String>);

impl ResourceKey {
    /// Builds a key from any sequence of parts.
    ///
    /// ```
    /// use section_dashboard::framework::ResourceKey;
    ///
    /// let key = ResourceKey::new(["user", "42"]);
    /// assert_eq!(key.parts(), ["user", "42"]);
    /// assert_eq!(key.to_string(), "user/42");
    /// ```
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// The future produced by a loader.
pub type LoadFuture<V> = Pin<Box<dyn Future<Output = Result<V, FetchError>> + Send>>;

/// A deferred fetch. The cache calls it at most once per load generation.
///
/// Wrapping the future in a closure lets the cache decide whether to start
/// a fetch at all: callers that attach to an in-flight load drop their
/// loader without ever invoking it.
pub type Loader<V> = Box<dyn FnOnce() -> LoadFuture<V> + Send>;

/// Boxes an async closure into a [`Loader`].
pub fn loader<V, F, Fut>(f: F) -> Loader<V>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<V, FetchError>> + Send + 'static,
{
    Box::new(move || Box::pin(f()) as LoadFuture<V>)
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState<V> {
    /// A load is in flight.
    Pending,
    /// The load succeeded.
    Ready(V),
    /// The load failed; stays failed until the key is invalidated.
    Failed(FetchError),
}

impl<V> ResourceState<V> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ResourceState::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}
