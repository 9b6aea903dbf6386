//! Role resolution with cache-first, claims-second, lookup-last tiers.

use serde_json::Value;
use tracing::{debug, warn};

use dlizza_core::{Claims, Role, UserId};

use crate::backend::{QueryBackend, tables};
use crate::config::EngineConfig;
use crate::store::{KeyValueStore, keys};
use crate::util::first_settled;

/// Resolves the role of a user through three short-circuiting tiers:
///
/// 1. the persistent per-user cache (no network);
/// 2. the inline role claim set at registration - the authoritative store
///    may not have the record yet right after sign-up (read-after-write
///    lag), so the claim is trusted and cached;
/// 3. the authoritative profile lookup, raced against a fixed deadline.
///
/// Every tier-2/3 exit writes the cache first, so a given identity hits
/// the network at most once per cache lifetime. All failures degrade to
/// [`Role::Client`]: a resolution failure at worst under-privileges a real
/// owner, it never grants ownership.
pub struct RoleResolver<'a, B, S> {
    backend: &'a B,
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, B: QueryBackend, S: KeyValueStore> RoleResolver<'a, B, S> {
    /// Create a resolver borrowing the engine's collaborators.
    #[must_use]
    pub const fn new(backend: &'a B, store: &'a S, config: &'a EngineConfig) -> Self {
        Self {
            backend,
            store,
            config,
        }
    }

    /// Resolve the role for `user_id`. Infallible by design: see the type
    /// docs for the degrade policy.
    pub async fn resolve(&self, user_id: &UserId, claims: &Claims) -> Role {
        if let Some(role) = self.cached(user_id) {
            debug!(%user_id, %role, "role cache hit");
            return role;
        }

        if let Some(role) = claims.role_hint() {
            debug!(%user_id, %role, "role taken from inline claim");
            self.cache(user_id, role);
            return role;
        }

        let role = self.authoritative_lookup(user_id).await;
        self.cache(user_id, role);
        role
    }

    fn cached(&self, user_id: &UserId) -> Option<Role> {
        let key = keys::role_cache(user_id.as_str());
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(%user_id, %error, "role cache read failed, treating as miss");
                return None;
            }
        };
        match raw.parse() {
            Ok(role) => Some(role),
            Err(error) => {
                warn!(%user_id, %error, "cached role is malformed, treating as miss");
                None
            }
        }
    }

    fn cache(&self, user_id: &UserId, role: Role) {
        let key = keys::role_cache(user_id.as_str());
        if let Err(error) = self.store.set(&key, &role.to_string()) {
            warn!(%user_id, %error, "failed to cache resolved role");
        }
    }

    /// Query the profile record, racing the configured deadline. Timeout,
    /// query failure, missing record, and malformed column all degrade to
    /// `Client`.
    async fn authoritative_lookup(&self, user_id: &UserId) -> Role {
        // The filter must outlive the future it is borrowed into.
        let filter = [(tables::profiles::USER_ID, user_id.as_str())];
        let lookup = self.backend.find_one(tables::PROFILES, &filter);

        match first_settled(lookup, self.config.role_lookup_timeout).await {
            None => {
                warn!(%user_id, "role lookup timed out, defaulting to client");
                Role::Client
            }
            Some(Err(error)) => {
                warn!(%user_id, %error, "role lookup failed, defaulting to client");
                Role::Client
            }
            Some(Ok(None)) => {
                debug!(%user_id, "no profile record, defaulting to client");
                Role::Client
            }
            Some(Ok(Some(row))) => row
                .get(tables::profiles::USER_ROLE)
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::InMemoryStore;
    use crate::test_support::{Scripted, ScriptedBackend};
    use dlizza_core::Identity;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn seeded_store(user_id: &str, role: &str) -> InMemoryStore {
        let store = InMemoryStore::new();
        store.set(&keys::role_cache(user_id), role).unwrap();
        store
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_backend() {
        let backend = ScriptedBackend::new();
        let store = seeded_store("u1", "owner");
        let config = config();
        let resolver = RoleResolver::new(&backend, &store, &config);

        let role = resolver.resolve(&UserId::new("u1"), &Claims::new()).await;

        assert_eq!(role, Role::Owner);
        assert_eq!(backend.calls(tables::PROFILES), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inline_claim_wins_over_lookup_and_is_cached() {
        let backend = ScriptedBackend::new();
        backend.script(
            tables::PROFILES,
            Scripted::Row(ScriptedBackend::profile_row("p1", "client")),
        );
        let store = InMemoryStore::new();
        let config = config();
        let resolver = RoleResolver::new(&backend, &store, &config);

        let identity = Identity::new("u1").with_role_claim(Role::Owner);
        let role = resolver.resolve(&identity.user_id, &identity.claims).await;

        assert_eq!(role, Role::Owner);
        assert_eq!(backend.calls(tables::PROFILES), 0);
        assert_eq!(
            store.get(&keys::role_cache("u1")).unwrap().as_deref(),
            Some("owner")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_success_caches_role() {
        let backend = ScriptedBackend::new();
        backend.script(
            tables::PROFILES,
            Scripted::Row(ScriptedBackend::profile_row("p1", "owner")),
        );
        let store = InMemoryStore::new();
        let config = config();
        let resolver = RoleResolver::new(&backend, &store, &config);

        let role = resolver.resolve(&UserId::new("u1"), &Claims::new()).await;

        assert_eq!(role, Role::Owner);
        assert_eq!(backend.calls(tables::PROFILES), 1);
        assert_eq!(
            store.get(&keys::role_cache("u1")).unwrap().as_deref(),
            Some("owner")
        );

        // Second resolution must come from cache
        let again = resolver.resolve(&UserId::new("u1"), &Claims::new()).await;
        assert_eq!(again, Role::Owner);
        assert_eq!(backend.calls(tables::PROFILES), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_client_within_deadline() {
        let backend = ScriptedBackend::new();
        backend.script(tables::PROFILES, Scripted::Hang);
        let store = InMemoryStore::new();
        let config = config();
        let resolver = RoleResolver::new(&backend, &store, &config);

        let started = tokio::time::Instant::now();
        let role = resolver.resolve(&UserId::new("u1"), &Claims::new()).await;

        assert_eq!(role, Role::Client);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
        // Even the timeout path writes the cache
        assert_eq!(
            store.get(&keys::role_cache("u1")).unwrap().as_deref(),
            Some("client")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_errors_degrade_to_client() {
        use crate::backend::BackendError;

        for error in [
            BackendError::RelationNotFound("profiles".to_owned()),
            BackendError::PermissionDenied("profiles".to_owned()),
            BackendError::Query("connection reset".to_owned()),
        ] {
            let backend = ScriptedBackend::new();
            backend.script(tables::PROFILES, Scripted::Fail(error));
            let store = InMemoryStore::new();
            let config = config();
            let resolver = RoleResolver::new(&backend, &store, &config);

            let role = resolver.resolve(&UserId::new("u1"), &Claims::new()).await;
            assert_eq!(role, Role::Client);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_record_defaults_to_client() {
        let backend = ScriptedBackend::new();
        backend.script(tables::PROFILES, Scripted::Missing);
        let store = InMemoryStore::new();
        let config = config();
        let resolver = RoleResolver::new(&backend, &store, &config);

        let role = resolver.resolve(&UserId::new("u1"), &Claims::new()).await;
        assert_eq!(role, Role::Client);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_cache_entry_falls_through() {
        let backend = ScriptedBackend::new();
        backend.script(
            tables::PROFILES,
            Scripted::Row(ScriptedBackend::profile_row("p1", "owner")),
        );
        let store = seeded_store("u1", "superuser");
        let config = config();
        let resolver = RoleResolver::new(&backend, &store, &config);

        let role = resolver.resolve(&UserId::new("u1"), &Claims::new()).await;
        assert_eq!(role, Role::Owner);
        assert_eq!(backend.calls(tables::PROFILES), 1);
    }
}
