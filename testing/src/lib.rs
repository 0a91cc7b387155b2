//! # PIPO Console Testing
//!
//! Testing utilities for the PIPO console crates.
//!
//! This crate provides:
//! - Entity fixtures with deterministic timestamps
//! - Instrumented session storage backends
//! - Property-based testing strategies for plates
//! - Opt-in log output for tests
//!
//! ## Example
//!
//! ```
//! use pipo_console_core::SessionStore;
//! use pipo_console_testing::{RecordingStorage, fixtures};
//!
//! let storage = RecordingStorage::new();
//! let store = SessionStore::new(storage.clone());
//! store.set_session("access", "refresh", &fixtures::guard("Ivan")).unwrap();
//!
//! // One login, one atomic batch
//! assert_eq!(storage.batch_count(), 1);
//! ```

pub mod fixtures;
pub mod storage_mocks;

/// Property-based testing utilities
///
/// Strategies producing plate numbers the console accepts, in the canonical
/// upper-case form the server stores.
pub mod properties {
    use proptest::prelude::*;

    /// Latin plate letters.
    pub const LATIN_LETTERS: &str = "ABEKMHOPCTYX";
    /// Cyrillic plate letters.
    pub const CYRILLIC_LETTERS: &str = "АВЕКМНОРСТУХ";

    fn letter() -> impl Strategy<Value = char> {
        let letters: Vec<char> = LATIN_LETTERS.chars().chain(CYRILLIC_LETTERS.chars()).collect();
        proptest::sample::select(letters)
    }

    /// Valid, normalized plate numbers
    pub fn valid_plate() -> impl Strategy<Value = String> {
        (letter(), "[0-9]{3}", letter(), letter(), "[0-9]{2,3}").prop_map(
            |(first, digits, second, third, region)| format!("{first}{digits}{second}{third}{region}"),
        )
    }

    /// Strings that are never valid plates: too short to hold one
    pub fn short_plate() -> impl Strategy<Value = String> {
        "[A-Z0-9]{0,7}"
    }
}

/// Install a `tracing` subscriber writing to the test output.
///
/// Filter with `RUST_LOG`; defaults to `debug`. Safe to call from every
/// test, only the first call installs.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use fixtures::test_time;
pub use storage_mocks::{FailingStorage, RecordingStorage};
