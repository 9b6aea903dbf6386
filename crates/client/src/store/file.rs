//! JSON-file-backed store for across-restart persistence.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use super::{KeyValueStore, StoreError};

/// A store persisting all slots to a single JSON file.
///
/// The whole map is rewritten on every mutation; the slot set is tiny
/// (cart, delivery option, a handful of cached roles), so this stays cheap.
/// Clones share the same in-memory state and file.
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

#[derive(Debug)]
struct FileStoreInner {
    path: PathBuf,
    slots: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store at `path`, loading any previously persisted slots.
    ///
    /// An absent file starts empty. A corrupted file is treated as "no
    /// saved state" with a warning, matching the policy for every other
    /// persistence read failure.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let slots = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(slots) => slots,
                Err(error) => {
                    warn!(path = %path.display(), %error, "store file is corrupted, starting empty");
                    HashMap::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => return Err(StoreError::Io(error)),
        };

        Ok(Self {
            inner: Arc::new(FileStoreInner {
                path,
                slots: Mutex::new(slots),
            }),
        })
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewrite the full map via temp file + rename; readers never observe
    /// a partial snapshot.
    fn flush(&self, slots: &HashMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string(slots)?;
        let tmp = self.inner.path.with_extension("tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.inner.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots();
        slots.insert(key.to_owned(), value.to_owned());
        self.flush(&slots)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut slots = self.slots();
        if slots.remove(key).is_some() {
            self.flush(&slots)?;
        }
        Ok(())
    }
}
