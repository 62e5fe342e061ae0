//! # Mock Framework
//!
//! Scripted responses for testing code that talks to external collaborators
//! (data source, validator, update service) without any real I/O.
//!
//! A [`Script`] holds a queue of expected calls per request key. Each expectation
//! either answers immediately or is *deferred*: the test gets a [`Deferred`]
//! handle and decides when (and with what) the call completes. Deferred
//! responses make it possible to resolve independent calls in any order, which
//! is how the tests pin down stale-response and out-of-order behavior.
//!
//! ## Usage
//!
//! ```rust
//! use section_dashboard::framework::mock::Script;
//!
//! #[tokio::main]
//! async fn main() {
//!     let script: Script<&'static str, Result<u32, String>> = Script::new();
//!     script.expect("views").return_ok(120);
//!     let pending = script.expect("likes").defer();
//!
//!     assert_eq!(script.next("views").await, Some(Ok(120)));
//!
//!     let likes = tokio::spawn({
//!         let script = script.clone();
//!         async move { script.next("likes").await }
//!     });
//!     pending.resolve_ok(7);
//!     assert_eq!(likes.await.unwrap(), Some(Ok(7)));
//!
//!     script.verify();
//! }
//! ```
//!
//! The client mocks in [`crate::clients::mock`] wrap a `Script` per collaborator.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

enum Scripted<T> {
    Ready(T),
    Deferred(oneshot::Receiver<T>),
}

struct ScriptState<K, T> {
    expectations: HashMap<K, VecDeque<Scripted<T>>>,
    calls: Vec<K>,
    unexpected: Vec<K>,
}

/// Per-key queues of expected calls and their responses.
pub struct Script<K, T> {
    state: Arc<Mutex<ScriptState<K, T>>>,
}

impl<K, T> Clone for Script<K, T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<K, T> Default for Script<K, T>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> Script<K, T>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Creates a script with no expectations.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                expectations: HashMap::new(),
                calls: Vec::new(),
                unexpected: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState<K, T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Expects one more call for `key`.
    pub fn expect(&self, key: K) -> ExpectationBuilder<K, T> {
        ExpectationBuilder {
            key,
            state: self.state.clone(),
        }
    }

    /// Consumes the next expectation for `key` and waits for its response.
    ///
    /// Returns `None` when the call was not expected, or when a deferred
    /// response was dropped unresolved. Unexpected calls are recorded and make
    /// [`verify`](Self::verify) fail.
    pub async fn next(&self, key: K) -> Option<T> {
        let scripted = {
            let mut state = self.lock();
            state.calls.push(key.clone());
            let scripted = state
                .expectations
                .get_mut(&key)
                .and_then(VecDeque::pop_front);
            if scripted.is_none() {
                state.unexpected.push(key);
            }
            scripted
        };

        match scripted? {
            Scripted::Ready(value) => Some(value),
            Scripted::Deferred(receiver) => receiver.await.ok(),
        }
    }

    /// Every call made so far, in arrival order.
    pub fn calls(&self) -> Vec<K> {
        self.lock().calls.clone()
    }

    /// Number of calls made for `key`.
    pub fn call_count(&self, key: &K) -> usize {
        self.lock().calls.iter().filter(|k| *k == key).count()
    }

    /// Verifies that every expectation was consumed and nothing unexpected was called.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.unexpected.is_empty() {
            panic!("Unexpected calls: {:?}", state.unexpected);
        }
        let remaining: usize = state.expectations.values().map(VecDeque::len).sum();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Builder for one expectation.
pub struct ExpectationBuilder<K, T> {
    key: K,
    state: Arc<Mutex<ScriptState<K, T>>>,
}

impl<K, T> ExpectationBuilder<K, T>
where
    K: Eq + Hash,
{
    fn push(self, scripted: Scripted<T>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .expectations
            .entry(self.key)
            .or_default()
            .push_back(scripted);
    }

    /// Answers the call immediately with `value`.
    pub fn respond(self, value: T) {
        self.push(Scripted::Ready(value));
    }

    /// Holds the call open until the returned handle is resolved.
    pub fn defer(self) -> Deferred<T> {
        let (sender, receiver) = oneshot::channel();
        self.push(Scripted::Deferred(receiver));
        Deferred { sender }
    }
}

impl<K, T, E> ExpectationBuilder<K, Result<T, E>>
where
    K: Eq + Hash,
{
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.respond(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: E) {
        self.respond(Err(error));
    }
}

/// Completes a deferred expectation.
pub struct Deferred<T> {
    sender: oneshot::Sender<T>,
}

impl<T> Deferred<T> {
    pub fn resolve(self, value: T) {
        let _ = self.sender.send(value);
    }
}

impl<T, E> Deferred<Result<T, E>> {
    pub fn resolve_ok(self, value: T) {
        self.resolve(Ok(value));
    }

    pub fn resolve_err(self, error: E) {
        self.resolve(Err(error));
    }
}
