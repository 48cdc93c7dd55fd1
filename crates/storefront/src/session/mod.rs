//! Persisted shopper session.
//!
//! The session (bearer token plus user profile) is persisted through a
//! [`SessionStore`] under two fixed keys, and published to interested state
//! holders through a [`SessionHandle`].
//!
//! # Ownership
//!
//! - [`crate::services::AuthSession`] establishes and tears down sessions on
//!   login, register and logout.
//! - [`crate::api::ApiClient`] reads the token for every request and tears the
//!   session down on a 401.
//! - Everything else only reads or subscribes.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::types::User;

/// Storage keys for session data.
pub mod keys {
    /// Key for the bearer token.
    pub const TOKEN: &str = "vastraverse_token";

    /// Key for the JSON-encoded user profile.
    pub const USER: &str = "vastraverse_user";
}

/// Errors raised by a [`SessionStore`].
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Reading or writing the backing file failed.
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("session storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("session storage lock poisoned")]
    Poisoned,
}

/// Key-value persistence for session data.
///
/// Mirrors browser local storage: string keys to string values, synchronous,
/// surviving restarts when backed by disk.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), SessionStoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), SessionStoreError>;
}

/// An authenticated shopper session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token issued by the backend.
    pub token: SecretString,
    /// Profile of the signed-in shopper.
    pub user: User,
}

impl Session {
    /// Create a session from a backend-issued token and profile.
    #[must_use]
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user,
        }
    }
}

/// Shared handle to the current session.
///
/// Cheaply cloneable. Publishes every session change on a `watch` channel so
/// state holders can react to login and logout without polling.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionHandleInner>,
}

struct SessionHandleInner {
    store: Arc<dyn SessionStore>,
    tx: watch::Sender<Option<Session>>,
}

impl SessionHandle {
    /// Create a handle over `store`, restoring any session persisted earlier.
    ///
    /// A partially written or corrupt session is discarded rather than
    /// half-restored.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let restored = restore(store.as_ref());
        if restored.is_some() {
            debug!("Restored persisted session");
        }
        let (tx, _rx) = watch::channel(restored);

        Self {
            inner: Arc::new(SessionHandleInner { store, tx }),
        }
    }

    /// Snapshot of the current session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.inner.tx.borrow().clone()
    }

    /// Whether a shopper is signed in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.tx.borrow().is_some()
    }

    /// Profile of the signed-in shopper.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.tx.borrow().as_ref().map(|s| s.user.clone())
    }

    /// Bearer token as currently persisted.
    ///
    /// Read from the store on every call so the value sent on the wire is
    /// always what is persisted.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        match self.inner.store.read(keys::TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(SecretString::from),
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    /// Subscribe to session changes.
    ///
    /// The receiver sees the current value immediately and is notified on
    /// every login and logout.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.tx.subscribe()
    }

    /// Persist `session` and publish it.
    pub(crate) fn establish(&self, session: Session) -> Result<(), SessionStoreError> {
        let user_json = serde_json::to_string(&session.user)?;
        self.inner
            .store
            .write(keys::TOKEN, session.token.expose_secret())?;
        self.inner.store.write(keys::USER, &user_json)?;
        self.inner.tx.send_replace(Some(session));
        Ok(())
    }

    /// Replace the stored profile, keeping the token.
    pub(crate) fn update_user(&self, user: User) -> Result<(), SessionStoreError> {
        let user_json = serde_json::to_string(&user)?;
        self.inner.store.write(keys::USER, &user_json)?;
        self.inner.tx.send_if_modified(|current| match current {
            Some(session) => {
                session.user = user;
                true
            }
            None => false,
        });
        Ok(())
    }

    /// Purge persisted session data and publish the signed-out state.
    ///
    /// Storage failures are logged; the in-memory session is cleared
    /// regardless so no further request carries the old identity.
    pub(crate) fn teardown(&self) {
        for key in [keys::TOKEN, keys::USER] {
            if let Err(e) = self.inner.store.remove(key) {
                warn!(key, error = %e, "Failed to remove persisted session data");
            }
        }
        self.inner.tx.send_if_modified(|current| current.take().is_some());
    }
}

/// Load a persisted session, discarding incomplete or corrupt data.
fn restore(store: &dyn SessionStore) -> Option<Session> {
    let (token, user_json) = match (store.read(keys::TOKEN), store.read(keys::USER)) {
        (Ok(token), Ok(user_json)) => (token.filter(|t| !t.is_empty()), user_json),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Discarding unreadable persisted session");
            discard(store);
            return None;
        }
    };

    match (token, user_json) {
        (Some(token), Some(user_json)) => match serde_json::from_str::<User>(&user_json) {
            Ok(user) => Some(Session::new(token, user)),
            Err(e) => {
                warn!(error = %e, "Discarding corrupt persisted user profile");
                discard(store);
                None
            }
        },
        (None, None) => None,
        _ => {
            warn!("Discarding incomplete persisted session");
            discard(store);
            None
        }
    }
}

fn discard(store: &dyn SessionStore) {
    for key in [keys::TOKEN, keys::USER] {
        let _ = store.remove(key);
    }
}
