//! Generic resource-cache framework.
//!
//! This module provides the building blocks that every dashboard section is
//! assembled from: a keyed cache that loads each resource at most once at a
//! time, and a boundary that turns a cached resource into a section view.
//!
//! # Main Components
//!
//! - [`CacheActor`] - Owns the cache state and the per-key waiter lists
//! - [`CacheClient`] - Cloneable handle for reading and invalidating entries
//! - [`SectionBoundary`] - Loading and failure boundary around one [`Section`]
//! - [`FetchError`] / [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] for the scripted-response utilities the client mocks are built on.

pub mod actor;
pub mod boundary;
pub mod client;
pub mod error;
pub mod key;
pub mod message;
pub mod mock;

pub use actor::CacheActor;
pub use boundary::{Section, SectionBoundary, SectionView};
pub use client::CacheClient;
pub use error::{FetchError, FrameworkError};
pub use key::{loader, LoadFuture, Loader, ResourceKey, ResourceState};
pub use message::{CacheRequest, Response};
