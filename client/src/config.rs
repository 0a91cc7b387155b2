//! Client configuration.
//!
//! Values come from the application or from the environment:
//!
//! | Variable                 | Meaning                              | Default                 |
//! |--------------------------|--------------------------------------|-------------------------|
//! | `PIPO_API_URL`           | Base URL of the API                  | `http://localhost:8080` |
//! | `PIPO_SESSION_FILE`      | Path of the persisted session        | in-memory session       |
//! | `PIPO_HTTP_TIMEOUT_SECS` | Whole-request timeout in seconds     | none                    |

use pipo_console_core::{FileStorage, MemoryStorage, SessionStore};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "PIPO_API_URL";
/// Environment variable holding the session file path.
pub const SESSION_FILE_VAR: &str = "PIPO_SESSION_FILE";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_VAR: &str = "PIPO_HTTP_TIMEOUT_SECS";

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A setting has an unusable value
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue {
        /// Setting or environment variable name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Settings for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,

    /// Where to persist the session; `None` keeps it in memory.
    pub session_file: Option<PathBuf>,

    /// Whole-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create configuration for the API at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            session_file: None,
            timeout: None,
        }
    }

    /// Persist the session in `path`.
    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unusable value
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unusable value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()));

        if let Some(path) = lookup(SESSION_FILE_VAR).filter(|p| !p.trim().is_empty()) {
            config = config.with_session_file(path);
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: TIMEOUT_VAR,
                reason: format!("expected whole seconds, got {raw:?}"),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    name: TIMEOUT_VAR,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an `http(s)` URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_scheme = self.base_url.starts_with("http://") || self.base_url.starts_with("https://");
        let has_host = self
            .base_url
            .split_once("://")
            .is_some_and(|(_, rest)| !rest.is_empty());
        if !has_scheme || !has_host {
            return Err(ConfigError::InvalidValue {
                name: API_URL_VAR,
                reason: format!("expected an http(s) URL, got {:?}", self.base_url),
            });
        }
        Ok(())
    }

    /// Open the session store described by this configuration.
    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        match &self.session_file {
            Some(path) => SessionStore::new(FileStorage::new(path.clone())),
            None => SessionStore::new(MemoryStorage::new()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn trim_base_url(url: String) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.len() == url.len() {
        url
    } else {
        trimmed.to_string()
    }
}
