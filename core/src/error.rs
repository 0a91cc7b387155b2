//! Error types for session storage and form validation.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Failure writing session state to its storage backend.
///
/// Reads never fail: an unreadable slot is reported as absent, which is the
/// canonical "logged out" state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Backend I/O failed.
    #[error("Session storage I/O failed: {0}")]
    Io(String),

    /// Profile could not be serialized for storage.
    #[error("Session serialization failed: {0}")]
    Serialization(String),

    /// Storage lock was poisoned by a panicking writer.
    #[error("Session storage lock poisoned")]
    LockPoisoned,
}

/// Field-level validation failures collected from one form submission.
///
/// Keys are the wire field names (`plate_number`, `valid_to`, ...) so a UI can
/// attach each message to the matching input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Record an error for `field`. The first error per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Returns `true` if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Iterate over `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation failed")?;
        let mut separator = ": ";
        for (field, message) in self.iter() {
            write!(f, "{separator}{field}: {message}")?;
            separator = "; ";
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
