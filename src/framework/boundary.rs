//! # Section Boundaries
//!
//! A [`SectionBoundary`] wraps one section that depends on one cached resource.
//! It is both the loading boundary and the failure boundary for that section:
//!
//! - while the resource is pending it renders the section's placeholder,
//! - if the resource failed it renders the section's fallback and keeps the error,
//! - once resolved it renders the section's real content.
//!
//! Errors never leave a boundary. Every boundary returns a [`SectionView`], so
//! sibling sections are rendered no matter what happened to this one.

use crate::framework::client::CacheClient;
use crate::framework::error::{FetchError, FrameworkError};
use crate::framework::key::{Loader, ResourceKey, ResourceState};
use serde::Serialize;
use tracing::{debug, warn};

/// What a boundary produced for its section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SectionView<T> {
    /// The resource is still loading.
    Loading { title: &'static str },
    /// The resource failed; the section shows its fallback.
    Unavailable { title: &'static str, reason: String },
    /// The real content.
    Ready(T),
}

impl<T> SectionView<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, SectionView::Loading { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SectionView::Unavailable { .. })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            SectionView::Ready(content) => Some(content),
            _ => None,
        }
    }
}

/// A unit of the dashboard that renders exactly one resource.
///
/// Implementors decide *what* to load and *how* to render it. The boundary
/// decides *when* each of those happens.
pub trait Section: Clone + Send + Sync + 'static {
    /// The cached value type this section reads.
    type Value: Clone + Send + 'static;
    /// The rendered content.
    type Output: Send + 'static;

    fn title(&self) -> &'static str;

    /// The cache key. It must be stable for the same logical inputs.
    fn key(&self) -> ResourceKey;

    fn loader(&self) -> Loader<Self::Value>;

    /// Renders the resolved value.
    ///
    /// Fails only when the cached value has the wrong shape for this section.
    fn render(&self, value: &Self::Value) -> Result<Self::Output, FetchError>;

    fn placeholder(&self) -> SectionView<Self::Output> {
        SectionView::Loading {
            title: self.title(),
        }
    }

    fn fallback(&self, error: &FetchError) -> SectionView<Self::Output> {
        SectionView::Unavailable {
            title: self.title(),
            reason: error.to_string(),
        }
    }
}

/// Loading and failure boundary around one [`Section`].
pub struct SectionBoundary<S: Section> {
    section: S,
    cache: CacheClient<S::Value>,
}

impl<S: Section> Clone for SectionBoundary<S> {
    fn clone(&self) -> Self {
        Self {
            section: self.section.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<S: Section> SectionBoundary<S> {
    pub fn new(section: S, cache: CacheClient<S::Value>) -> Self {
        Self { section, cache }
    }

    pub fn section(&self) -> &S {
        &self.section
    }

    pub fn key(&self) -> ResourceKey {
        self.section.key()
    }

    /// Renders the current state without waiting, starting the load if needed.
    pub async fn render(&self) -> SectionView<S::Output> {
        let state = self
            .cache
            .try_read(self.section.key(), self.section.loader())
            .await;
        match state {
            ResourceState::Pending => {
                debug!(section = self.section.title(), "Suspended");
                self.section.placeholder()
            }
            ResourceState::Ready(value) => self.ready(&value),
            ResourceState::Failed(error) => self.fail(&error),
        }
    }

    /// Waits until the resource settles, then renders the final view.
    pub async fn resolve(&self) -> SectionView<S::Output> {
        match self
            .cache
            .read(self.section.key(), self.section.loader())
            .await
        {
            Ok(value) => self.ready(&value),
            Err(error) => self.fail(&error),
        }
    }

    /// Drops the cached entry so the next render fetches again.
    pub async fn retry(&self) -> Result<bool, FrameworkError> {
        self.cache.invalidate(&self.section.key()).await
    }

    fn ready(&self, value: &S::Value) -> SectionView<S::Output> {
        match self.section.render(value) {
            Ok(content) => SectionView::Ready(content),
            Err(error) => self.fail(&error),
        }
    }

    fn fail(&self, error: &FetchError) -> SectionView<S::Output> {
        warn!(section = self.section.title(), %error, "Section unavailable");
        self.section.fallback(error)
    }
}
