//! Integration tests for the Dlizza client core.
//!
//! This crate provides scripted collaborator fakes shared by the test
//! files under `tests/`: a query backend that replays queued outcomes per
//! table and an identity provider driven through a `watch` channel. Both
//! are cheaply cloneable handles to shared state, so a test can hand one
//! clone to the engine and keep another for scripting and assertions.
//!
//! # Test Categories
//!
//! - `session_flow` - Bootstrap, role resolution, and polling end to end
//! - `cart_flow` - Cart persistence and pricing across restarts

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::watch;

use dlizza_client::backend::{BackendError, Filter, QueryBackend, Row, tables};
use dlizza_client::identity::IdentityProvider;
use dlizza_core::Identity;

/// One scripted outcome for a `find_one` call.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Resolve with this row.
    Row(Row),
    /// Resolve with no row.
    Missing,
    /// Fail the query.
    Fail(BackendError),
    /// Never resolve; the caller's deadline must fire.
    Hang,
}

/// A backend replaying scripted outcomes per table.
///
/// An exhausted or absent script behaves as "record missing". Clones share
/// the same scripts and call counts.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    inner: Arc<BackendInner>,
}

#[derive(Debug, Default)]
struct BackendInner {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next outcome for `table`.
    pub fn script(&self, table: &str, outcome: Outcome) {
        lock(&self.inner.scripts)
            .entry(table.to_owned())
            .or_default()
            .push_back(outcome);
    }

    /// Queue `outcome` for `table` `count` times.
    pub fn script_repeat(&self, table: &str, outcome: &Outcome, count: usize) {
        for _ in 0..count {
            self.script(table, outcome.clone());
        }
    }

    /// How many times `table` has been queried.
    #[must_use]
    pub fn calls(&self, table: &str) -> usize {
        lock(&self.inner.calls).get(table).copied().unwrap_or(0)
    }
}

impl QueryBackend for FakeBackend {
    async fn find_one(&self, table: &str, _filter: Filter<'_>) -> Result<Option<Row>, BackendError> {
        *lock(&self.inner.calls).entry(table.to_owned()).or_default() += 1;

        let next = lock(&self.inner.scripts)
            .get_mut(table)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Outcome::Row(row)) => Ok(Some(row)),
            Some(Outcome::Missing) | None => Ok(None),
            Some(Outcome::Fail(error)) => Err(error),
            Some(Outcome::Hang) => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
        }
    }
}

/// An identity provider driven by the test through a `watch` channel.
///
/// Clones share the same channel, so a test can announce identity changes
/// through its own handle while the engine watches through another.
#[derive(Debug, Clone)]
pub struct FakeIdentityProvider {
    inner: Arc<ProviderInner>,
}

#[derive(Debug)]
struct ProviderInner {
    tx: watch::Sender<Option<Identity>>,
    sign_outs: AtomicUsize,
}

impl FakeIdentityProvider {
    #[must_use]
    pub fn new(initial: Option<Identity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            inner: Arc::new(ProviderInner {
                tx,
                sign_outs: AtomicUsize::new(0),
            }),
        }
    }

    /// Announce a new identity (or `None` for sign-out) to subscribers.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.inner.tx.send_replace(identity);
    }

    /// How many times the engine asked the provider to sign out.
    #[must_use]
    pub fn sign_out_count(&self) -> usize {
        self.inner.sign_outs.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for FakeIdentityProvider {
    async fn current_session(&self) -> Option<Identity> {
        self.inner.tx.borrow().clone()
    }

    fn identity_changes(&self) -> watch::Receiver<Option<Identity>> {
        self.inner.tx.subscribe()
    }

    async fn sign_out(&self) {
        self.inner.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.inner.tx.send_replace(None);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Install a test subscriber honoring `RUST_LOG`; safe to call from every
/// test, later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A profile row with the given record id and role column.
#[must_use]
pub fn profile_row(id: &str, user_role: &str) -> Row {
    let mut row = Row::new();
    row.insert(tables::profiles::ID.to_owned(), Value::String(id.to_owned()));
    row.insert(
        tables::profiles::USER_ROLE.to_owned(),
        Value::String(user_role.to_owned()),
    );
    row
}

/// A business row with the given name and active flag.
#[must_use]
pub fn business_row(name: &str, active: bool) -> Row {
    let mut row = Row::new();
    row.insert(
        tables::businesses::NAME.to_owned(),
        Value::String(name.to_owned()),
    );
    row.insert(tables::businesses::ACTIVE.to_owned(), Value::Bool(active));
    row
}
