//! Scripted collaborator fakes shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::watch;

use dlizza_core::Identity;

use crate::backend::{BackendError, Filter, QueryBackend, Row, tables};
use crate::identity::IdentityProvider;

/// One scripted outcome for a `find_one` call.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Resolve with this row.
    Row(Row),
    /// Resolve with no row.
    Missing,
    /// Fail the query.
    Fail(BackendError),
    /// Never resolve; the caller's deadline must fire.
    Hang,
}

/// A backend that replays scripted outcomes per table and counts calls.
///
/// An exhausted (or absent) script behaves as "record missing", which is
/// what a backend that simply has no row would return.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next outcome for `table`.
    pub fn script(&self, table: &str, outcome: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .entry(table.to_owned())
            .or_default()
            .push_back(outcome);
    }

    /// Queue `outcome` for `table` `count` times.
    pub fn script_repeat(&self, table: &str, outcome: Scripted, count: usize) {
        for _ in 0..count {
            self.script(table, outcome.clone());
        }
    }

    /// How many times `table` has been queried.
    pub fn calls(&self, table: &str) -> usize {
        self.calls.lock().unwrap().get(table).copied().unwrap_or(0)
    }

    /// A profile row with the given record id and role column.
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
    pub fn business_row(name: &str, active: bool) -> Row {
        let mut row = Row::new();
        row.insert(
            tables::businesses::NAME.to_owned(),
            Value::String(name.to_owned()),
        );
        row.insert(tables::businesses::ACTIVE.to_owned(), Value::Bool(active));
        row
    }
}

impl QueryBackend for ScriptedBackend {
    async fn find_one(&self, table: &str, _filter: Filter<'_>) -> Result<Option<Row>, BackendError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(table.to_owned())
            .or_default() += 1;

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(table)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Row(row)) => Ok(Some(row)),
            Some(Scripted::Missing) | None => Ok(None),
            Some(Scripted::Fail(error)) => Err(error),
            Some(Scripted::Hang) => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
        }
    }
}

/// An identity provider backed by a `watch` channel.
#[derive(Debug)]
pub struct ScriptedProvider {
    tx: watch::Sender<Option<Identity>>,
    sign_outs: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(initial: Option<Identity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            sign_outs: AtomicUsize::new(0),
        }
    }

    /// Announce a new identity (or `None` for sign-out) to subscribers.
    pub fn set_identity(&self, identity: Option<Identity>) {
        // send_replace stores the value even with no live receivers
        self.tx.send_replace(identity);
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for ScriptedProvider {
    async fn current_session(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    fn identity_changes(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }

    async fn sign_out(&self) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(None);
    }
}
