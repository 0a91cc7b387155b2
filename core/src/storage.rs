//! Durable key/value backends for session state.
//!
//! Session state is three string slots. A backend only has to read a slot
//! and apply a batch of writes atomically; absence of a key is the normal
//! "logged out" state, never an error.
//!
//! # Backends
//!
//! - [`MemoryStorage`]: process-local map, for tests and throwaway sessions
//! - [`FileStorage`]: one JSON document on disk, replaced atomically

use crate::error::SessionError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Slot holding the access token.
pub const ACCESS_KEY: &str = "pipo_access";
/// Slot holding the refresh token.
pub const REFRESH_KEY: &str = "pipo_refresh";
/// Slot holding the JSON-serialized user profile.
pub const USER_KEY: &str = "pipo_user";

/// One change within an atomic batch.
#[derive(Clone, PartialEq, Eq)]
pub enum SlotWrite {
    /// Store `value` under `key`.
    Set {
        /// Slot name
        key: &'static str,
        /// New value
        value: String,
    },
    /// Delete `key` if present.
    Remove {
        /// Slot name
        key: &'static str,
    },
}

impl SlotWrite {
    /// Build a `Set` write.
    #[must_use]
    pub fn set(key: &'static str, value: impl Into<String>) -> Self {
        Self::Set {
            key,
            value: value.into(),
        }
    }

    /// Build a `Remove` write.
    #[must_use]
    pub const fn remove(key: &'static str) -> Self {
        Self::Remove { key }
    }

    fn apply_to<M: SlotMap>(&self, map: &mut M) {
        match self {
            Self::Set { key, value } => map.put(key, value.clone()),
            Self::Remove { key } => map.delete(key),
        }
    }
}

// Slot values are credentials; keep them out of debug output.
impl fmt::Debug for SlotWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set { key, .. } => write!(f, "Set({key})"),
            Self::Remove { key } => write!(f, "Remove({key})"),
        }
    }
}

trait SlotMap {
    fn put(&mut self, key: &str, value: String);
    fn delete(&mut self, key: &str);
}

impl SlotMap for HashMap<String, String> {
    fn put(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn delete(&mut self, key: &str) {
        self.remove(key);
    }
}

impl SlotMap for BTreeMap<String, String> {
    fn put(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn delete(&mut self, key: &str) {
        self.remove(key);
    }
}

/// Storage backend for session slots.
///
/// # Implementation Notes
///
/// - `apply` must make the whole batch visible at once: a concurrent `read`
///   sees either none or all of its writes.
/// - A missing key is `Ok(None)`.
pub trait SessionStorage: Send + Sync + fmt::Debug {
    /// Read one slot.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Apply a batch of writes atomically.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be written; in that case none of
    /// the writes are visible.
    fn apply(&self, writes: &[SlotWrite]) -> Result<(), SessionError>;
}

// ═══════════════════════════════════════════════════════════════════════
// In-memory backend
// ═══════════════════════════════════════════════════════════════════════

/// In-memory storage.
///
/// Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn len(&self) -> Result<usize, SessionError> {
        Ok(self
            .slots
            .lock()
            .map_err(|_| SessionError::LockPoisoned)?
            .len())
    }

    /// Returns `true` if no slot is occupied.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.len()? == 0)
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self
            .slots
            .lock()
            .map_err(|_| SessionError::LockPoisoned)?
            .get(key)
            .cloned())
    }

    fn apply(&self, writes: &[SlotWrite]) -> Result<(), SessionError> {
        let mut slots = self.slots.lock().map_err(|_| SessionError::LockPoisoned)?;
        for write in writes {
            write.apply_to(&mut *slots);
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// File backend
// ═══════════════════════════════════════════════════════════════════════

/// Session slots persisted as a JSON object in a single file.
///
/// Every batch rewrites the document to a uniquely named sibling temp file
/// and renames it over the old one, so a crash mid-write leaves the previous
/// session intact. On unix the document is readable by its owner only. A
/// missing file is an empty session.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Use the document at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the session document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| SessionError::Serialization(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(SessionError::Io(e.to_string())),
        }
    }

    fn store(&self, slots: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| SessionError::Io(e.to_string()))?;
                parent
            }
            None => Path::new("."),
        };

        let raw = serde_json::to_string(slots)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;

        // Uniquely named, owner-only (0600 on unix) until renamed into place.
        let mut tmp =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| SessionError::Io(e.to_string()))?;
        tmp.write_all(raw.as_bytes())
            .map_err(|e| SessionError::Io(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| SessionError::Io(e.error.to_string()))?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(key))
    }

    fn apply(&self, writes: &[SlotWrite]) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().map_err(|_| SessionError::LockPoisoned)?;

        let mut slots = match self.load() {
            Ok(slots) => slots,
            Err(SessionError::Serialization(reason)) => {
                tracing::warn!(path = %self.path.display(), %reason, "Discarding unreadable session file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        for write in writes {
            write.apply_to(&mut slots);
        }
        self.store(&slots)
    }
}
