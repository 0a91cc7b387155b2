//! Session store: the single source of truth for "who is logged in".
//!
//! The store is an explicit handle rather than a global. Construct it once
//! at startup with the storage backend of your choice and pass clones to
//! whatever needs to read or change the session.
//!
//! # Example
//!
//! ```
//! use pipo_console_core::session::SessionStore;
//! use pipo_console_core::storage::MemoryStorage;
//!
//! let store = SessionStore::new(MemoryStorage::new());
//! assert!(store.access_token().is_none());
//! assert!(!store.is_authenticated());
//! ```

use crate::error::SessionError;
use crate::model::UserProfile;
use crate::storage::{ACCESS_KEY, REFRESH_KEY, SessionStorage, SlotWrite, USER_KEY};
use std::fmt;
use std::sync::Arc;

/// Full session triple.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token attached to API calls.
    pub access_token: String,
    /// Credential used to mint the next token pair.
    pub refresh_token: String,
    /// Profile captured at login.
    pub user: UserProfile,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Handle to the process-wide session state.
///
/// Cheap to clone; all clones observe the same backend.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("storage", &self.storage)
            .finish()
    }
}

impl SessionStore {
    /// Create a store over `storage`.
    #[must_use]
    pub fn new<S: SessionStorage + 'static>(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Create a store over an already shared backend.
    #[must_use]
    pub fn from_shared(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Current access token, or `None` when logged out.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read_slot(ACCESS_KEY)
    }

    /// Current refresh token, or `None` when logged out.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read_slot(REFRESH_KEY)
    }

    /// Profile stored at login, or `None` when logged out.
    ///
    /// A stored profile that no longer deserializes reads as absent.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        let raw = self.read_slot(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user profile is unreadable");
                None
            }
        }
    }

    /// The full session, when all three slots are present.
    #[must_use]
    pub fn snapshot(&self) -> Option<Session> {
        Some(Session {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
            user: self.user()?,
        })
    }

    /// Returns `true` if a user profile is stored.
    ///
    /// This mirrors how screens decide whether to redirect to login.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// Persist a new session after login.
    ///
    /// # Errors
    ///
    /// Returns error if the profile cannot be serialized or the backend
    /// write fails. Nothing is written in either case.
    pub fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        user: &UserProfile,
    ) -> Result<(), SessionError> {
        let user_json = serde_json::to_string(user)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;

        self.storage.apply(&[
            SlotWrite::set(ACCESS_KEY, access_token),
            SlotWrite::set(REFRESH_KEY, refresh_token),
            SlotWrite::set(USER_KEY, user_json),
        ])?;

        tracing::debug!(user_id = %user.id, role = %user.role, "Session stored");
        Ok(())
    }

    /// Replace the token pair after a refresh, keeping the stored profile.
    ///
    /// # Errors
    ///
    /// Returns error if the backend write fails.
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), SessionError> {
        self.storage.apply(&[
            SlotWrite::set(ACCESS_KEY, access_token),
            SlotWrite::set(REFRESH_KEY, refresh_token),
        ])
    }

    /// Remove the whole session.
    ///
    /// # Errors
    ///
    /// Returns error if the backend write fails.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.storage.apply(&[
            SlotWrite::remove(ACCESS_KEY),
            SlotWrite::remove(REFRESH_KEY),
            SlotWrite::remove(USER_KEY),
        ])
    }

    fn read_slot(&self, key: &str) -> Option<String> {
        match self.storage.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(slot = key, error = %e, "Session slot is unreadable");
                None
            }
        }
    }
}
