#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Section Dashboard
//!
//! > **A user dashboard whose sections load, fail and render independently.**
//!
//! A dashboard shows four sections for one user: profile, posts, analytics and
//! notifications. Each section depends on exactly one remote resource. A slow
//! or failing resource only affects its own section: the others keep loading
//! and rendering.
//!
//! ## 🏗️ Design Philosophy
//!
//! - **One cache, many boundaries**: every resource goes through a single
//!   keyed cache that runs at most one load per key. Each section reads it
//!   through its own [`SectionBoundary`](framework::SectionBoundary), which is
//!   both its loading placeholder and its failure fallback.
//! - **Decide once**: `can_edit` and `show_analytics` are resolved when the
//!   layout is built. No section checks them again.
//! - **Explicit states**: resources are [`ResourceState`](framework::ResourceState)
//!   and sections are [`SectionView`](framework::SectionView). Nothing is
//!   nullable and every state is matched exhaustively.
//!
//! ## 🚀 Core Concepts
//!
//! ### Suspension without a runtime trick
//! A read of a pending key parks the caller on a per-key waiter list inside
//! the [`CacheActor`](framework::CacheActor). When the load settles, every
//! parked caller is resumed with the same result. Concurrent readers never
//! trigger a second fetch.
//!
//! ### Stale responses are discarded
//! Loads and validations carry a generation. An invalidated load still
//! answers the callers that were waiting on it, but its result is never
//! stored. A validation answer for a value the user has since changed is
//! dropped. See [`profile_form`].
//!
//! ### Mocking
//! The external collaborators are traits. [`clients::mock`] provides scripted
//! implementations with deferred responses, so tests decide the order in which
//! concurrent calls complete.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic cache actor, its client, and section boundaries.
//! - **Key items**: [`CacheActor`](framework::CacheActor), [`CacheClient`](framework::CacheClient),
//!   [`Section`](framework::Section).
//!
//! ### 2. The Sections ([`sections`])
//! One type per section and variant, each rendering exactly one resource.
//!
//! ### 3. The Form ([`profile_form`])
//! The `Viewing` / `Editing` / `Saving` state machine behind the editable profile.
//!
//! ### 4. The Interface ([`clients`])
//! The data source, validation and update service seams, with in-memory and
//! mock implementations.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! Configuration, composition and shutdown.
//! - **Key items**: [`DashboardSystem`](lifecycle::DashboardSystem), [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo against demos/dashboard.json
//! RUST_LOG=info cargo run
//!
//! # Run against another fixture
//! RUST_LOG=debug cargo run -- path/to/fixture.json
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod profile_form;
pub mod sections;
