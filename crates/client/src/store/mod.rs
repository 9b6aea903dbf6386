//! Persistent key-value storage for client state.
//!
//! A small set of named slots that survive process restarts: the cart, the
//! delivery preference, and per-user cached roles. Each slot is owned and
//! written by exactly one component, so there are no write conflicts to
//! arbitrate.
//!
//! Read and parse failures are not errors at the feature level: callers
//! degrade to an empty/default value and log, they never propagate.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

/// Storage slot keys.
///
/// Keys are namespaced by a fixed `dlizza` prefix; the role cache key is
/// additionally versioned so a format change invalidates stale entries.
pub mod keys {
    /// Slot for the serialized cart lines.
    pub const CART: &str = "dlizza-cart";

    /// Slot for the serialized delivery option.
    pub const DELIVERY_OPTION: &str = "dlizza-delivery-option";

    /// Versioned prefix for per-user cached roles.
    const ROLE_CACHE_PREFIX: &str = "dlizza-role-v1";

    /// Cached-role slot for one user.
    #[must_use]
    pub fn role_cache(user_id: &str) -> String {
        format!("{ROLE_CACHE_PREFIX}-{user_id}")
    }
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk snapshot could not be serialized.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A named key -> string slot store that survives restarts.
///
/// Mirrors the web storage contract: synchronous, string-valued, no key
/// enumeration. Implementations are cheaply cloneable handles to shared
/// state so multiple components can hold the same store.
pub trait KeyValueStore {
    /// Read a slot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a slot; absent keys are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and deserialize a JSON slot, degrading to `None` on any failure.
pub(crate) fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            warn!(key, %error, "failed to read persisted slot, treating as empty");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "persisted slot is corrupted, treating as empty");
            None
        }
    }
}

/// Serialize and write a JSON slot, logging instead of propagating failure.
pub(crate) fn write_json<T: Serialize>(store: &impl KeyValueStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(error) => {
            warn!(key, %error, "failed to serialize slot, skipping persist");
            return;
        }
    };
    if let Err(error) = store.set(key, &raw) {
        warn!(key, %error, "failed to persist slot");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_cache_key_is_versioned_and_per_user() {
        let key = keys::role_cache("user-1");
        assert_eq!(key, "dlizza-role-v1-user-1");
        assert_ne!(key, keys::role_cache("user-2"));
    }

    #[test]
    fn test_read_json_corrupted_slot_degrades_to_none() {
        let store = InMemoryStore::default();
        store.set(keys::CART, "{not json").unwrap();
        let parsed: Option<Vec<String>> = read_json(&store, keys::CART);
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_write_then_read_json() {
        let store = InMemoryStore::default();
        write_json(&store, "slot", &vec!["a".to_owned(), "b".to_owned()]);
        let parsed: Option<Vec<String>> = read_json(&store, "slot");
        assert_eq!(parsed, Some(vec!["a".to_owned(), "b".to_owned()]));
    }
}
