//! Instrumented session storage backends.
//!
//! - [`RecordingStorage`]: in-memory storage that keeps a log of every batch
//! - [`FailingStorage`]: storage whose writes can be switched to fail

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned test lock

use pipo_console_core::storage::SlotWrite;
use pipo_console_core::{MemoryStorage, SessionError, SessionStorage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory storage that records every applied batch.
///
/// # Example
///
/// ```
/// use pipo_console_core::SessionStore;
/// use pipo_console_testing::RecordingStorage;
///
/// let storage = RecordingStorage::new();
/// let store = SessionStore::new(storage.clone());
/// store.set_tokens("a", "r").unwrap();
///
/// assert_eq!(storage.batch_count(), 1);
/// assert_eq!(storage.batches()[0].len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingStorage {
    inner: MemoryStorage,
    batches: Arc<Mutex<Vec<Vec<SlotWrite>>>>,
}

impl RecordingStorage {
    /// Create an empty recording storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch applied so far, oldest first
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<SlotWrite>> {
        self.batches.lock().unwrap().clone()
    }

    /// Number of batches applied so far
    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    /// Number of slots currently holding a value
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.inner.len().unwrap()
    }
}

impl SessionStorage for RecordingStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.inner.read(key)
    }

    fn apply(&self, writes: &[SlotWrite]) -> Result<(), SessionError> {
        self.inner.apply(writes)?;
        self.batches.lock().unwrap().push(writes.to_vec());
        Ok(())
    }
}

/// Storage whose writes fail while [`set_failing`](Self::set_failing) is on.
///
/// Reads always go to the underlying memory, so a failed write can be
/// checked to have left the slots untouched.
#[derive(Clone, Debug, Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    failing: Arc<AtomicBool>,
}

impl FailingStorage {
    /// Storage that fails every write until switched off
    #[must_use]
    pub fn failing() -> Self {
        let storage = Self::default();
        storage.set_failing(true);
        storage
    }

    /// Switch write failures on or off
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl SessionStorage for FailingStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.inner.read(key)
    }

    fn apply(&self, writes: &[SlotWrite]) -> Result<(), SessionError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SessionError::Io("disk full".to_string()));
        }
        self.inner.apply(writes)
    }
}
