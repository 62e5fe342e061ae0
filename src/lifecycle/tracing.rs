//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden (`with_target(false)`); every event
//! carries its context as structured fields instead (`key`, `field`,
//! `generation`, `waiters`).
//!
//! ```bash
//! RUST_LOG=info cargo run     # loads, settlements, saves
//! RUST_LOG=debug cargo run    # cache hits, attaches, discarded validations
//! ```
//!
//! With `RUST_LOG=debug` a dashboard with a slow posts section reads like:
//!
//! ```text
//! INFO Cache started
//! INFO Loading key=user/42 generation=1
//! INFO Loading key=posts/42 generation=2
//! DEBUG Suspended section="Posts"
//! INFO Resolved key=user/42 generation=1 waiters=1
//! DEBUG Attached to in-flight load key=posts/42 waiters=1
//! INFO Resolved key=posts/42 generation=2 waiters=1
//! ```

/// Installs the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
