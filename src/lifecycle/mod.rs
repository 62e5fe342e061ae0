//! # Dashboard Lifecycle
//!
//! Wiring and running a dashboard:
//!
//! 1. **Configuration** - [`DashboardConfig`] and the demo [`Fixture`]
//! 2. **Composition** - [`DashboardSystem::new`] spawns the cache actor and
//!    resolves the section layout from the config flags
//! 3. **Rendering** - [`render`](DashboardSystem::render),
//!    [`settle`](DashboardSystem::settle) and [`watch`](DashboardSystem::watch)
//! 4. **Shutdown** - dropping the cache clients ends the actor loop, and
//!    [`shutdown`](DashboardSystem::shutdown) waits for it
//!
//! [`setup_tracing`] installs the log subscriber. See the [`tracing`] module
//! for what gets logged.

pub mod config;
pub mod dashboard;
pub mod tracing;

pub use self::config::*;
pub use self::dashboard::*;
pub use self::tracing::*;
