//! In-memory session store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{SessionStore, SessionStoreError};

/// Session store that lives only as long as the process.
///
/// Used by tests and by front-ends that should not remember the shopper.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        self.values
            .read()
            .map(|values| values.get(key).cloned())
            .map_err(|_| SessionStoreError::Poisoned)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        self.values
            .write()
            .map(|mut values| {
                values.insert(key.to_owned(), value.to_owned());
            })
            .map_err(|_| SessionStoreError::Poisoned)
    }

    fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        self.values
            .write()
            .map(|mut values| {
                values.remove(key);
            })
            .map_err(|_| SessionStoreError::Poisoned)
    }
}
