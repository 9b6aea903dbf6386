//! Session bootstrap and lifecycle.
//!
//! The [`SessionEngine`] owns the role resolver and the business-status
//! poller. It bootstraps once at startup and again on every identity
//! change announced by the provider; every bootstrap run ends in `Ready`
//! no matter what failed along the way, because each step degrades to a
//! default value rather than aborting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, warn};

use dlizza_core::{BusinessStatus, Identity, Role};

use crate::backend::QueryBackend;
use crate::config::EngineConfig;
use crate::identity::IdentityProvider;
use crate::store::{KeyValueStore, keys};

pub mod business;
pub mod role;

pub use business::BusinessStatusPoller;
pub use role::RoleResolver;

/// Where the engine is in its bootstrap cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Never bootstrapped.
    Idle,
    /// A bootstrap run is in flight.
    Bootstrapping,
    /// The last bootstrap run completed.
    Ready,
}

/// Internal session state guarded by the engine's mutex.
#[derive(Debug, Clone)]
struct SessionState {
    phase: Phase,
    user: Option<Identity>,
    role: Option<Role>,
    business_status: Option<BusinessStatus>,
}

impl SessionState {
    const fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            user: None,
            role: None,
            business_status: None,
        }
    }

    const fn signed_out() -> Self {
        Self {
            phase: Phase::Ready,
            user: None,
            role: None,
            business_status: None,
        }
    }
}

/// A point-in-time view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Current identity, if signed in.
    pub user: Option<Identity>,
    /// Resolved role, if signed in.
    pub role: Option<Role>,
    /// Business approval state; populated only for owners.
    pub business_status: Option<BusinessStatus>,
    /// True while a bootstrap run is in flight.
    pub loading: bool,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            user: state.user.clone(),
            role: state.role,
            business_status: state.business_status.clone(),
            loading: state.phase == Phase::Bootstrapping,
        }
    }
}

/// The session bootstrapper.
///
/// Constructed once at process start with its three collaborators; there
/// is no global instance, callers pass the engine where it is needed.
pub struct SessionEngine<P, B, S> {
    provider: P,
    backend: B,
    store: S,
    config: EngineConfig,
    state: Mutex<SessionState>,
    /// Monotonic bootstrap generation. A run only commits its result if no
    /// newer run has started since, so rapid identity changes cannot leave
    /// a stale run's state behind.
    generation: AtomicU64,
}

impl<P, B, S> SessionEngine<P, B, S>
where
    P: IdentityProvider,
    B: QueryBackend,
    S: KeyValueStore,
{
    /// Create an engine in the `Idle` phase.
    pub fn new(provider: P, backend: B, store: S, config: EngineConfig) -> Self {
        Self {
            provider,
            backend,
            store,
            config,
            state: Mutex::new(SessionState::idle()),
            generation: AtomicU64::new(0),
        }
    }

    /// The current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.state())
    }

    /// True while a bootstrap run is in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.state().phase == Phase::Bootstrapping
    }

    /// Run one bootstrap cycle and return the resulting snapshot.
    ///
    /// Fetches the current identity, resolves its role, and polls the
    /// business status for owners. Always terminates in `Ready`; failures
    /// inside the steps degrade values instead of blocking completion.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> SessionSnapshot {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state().phase = Phase::Bootstrapping;

        let identity = self.provider.current_session().await;
        let (role, business_status) = match &identity {
            None => {
                debug!("no current session");
                (None, None)
            }
            Some(identity) => {
                let resolver = RoleResolver::new(&self.backend, &self.store, &self.config);
                let role = resolver.resolve(&identity.user_id, &identity.claims).await;

                let business_status = if role == Role::Owner {
                    let poller = BusinessStatusPoller::new(&self.backend, &self.config);
                    Some(poller.poll(&identity.user_id).await)
                } else {
                    None
                };

                (Some(role), business_status)
            }
        };

        let mut state = self.state();
        if self.generation.load(Ordering::SeqCst) == generation {
            *state = SessionState {
                phase: Phase::Ready,
                user: identity,
                role,
                business_status,
            };
        } else {
            debug!(generation, "bootstrap superseded, discarding result");
        }
        SessionSnapshot::from(&*state)
    }

    /// React to identity changes until the provider drops its channel.
    ///
    /// Each change re-runs [`Self::bootstrap`]; the generation guard makes
    /// overlapping runs safe.
    pub async fn watch_identity(&self) {
        let mut changes = self.provider.identity_changes();
        while changes.changed().await.is_ok() {
            self.bootstrap().await;
        }
    }

    /// Sign out: invalidate the user's cached role, end the provider
    /// session, and reset to a signed-out `Ready` state.
    ///
    /// Supersedes any bootstrap still in flight, so a run started before
    /// the sign-out can never commit its result afterwards. With no
    /// current user there is no cache entry to invalidate; the state
    /// still resets.
    pub async fn sign_out(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let user = self.state().user.clone();
        if let Some(identity) = user {
            let key = keys::role_cache(identity.user_id.as_str());
            if let Err(error) = self.store.remove(&key) {
                warn!(user_id = %identity.user_id, %error, "failed to clear cached role");
            }
        }

        self.provider.sign_out().await;
        *self.state() = SessionState::signed_out();
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
