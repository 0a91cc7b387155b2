//! Error types for the PIPO API client

use pipo_console_core::{SessionError, ValidationErrors};
use thiserror::Error;

/// Errors that can occur when talking to the PIPO API
///
/// Every variant is cheap to clone so a single refresh outcome can be handed
/// to all callers that were waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server rejected the credentials and no recovery applies
    #[error("Unauthorized")]
    Unauthorized,

    /// A refresh was needed but no refresh token is stored
    #[error("No refresh token stored")]
    MissingCredential,

    /// The refresh endpoint rejected the refresh token or failed
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    Network(String),

    /// API returned an error status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Request body could not be encoded
    #[error("Request encoding failed: {0}")]
    Encode(String),

    /// Response body was not the expected JSON
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Session state could not be written
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Input was rejected before sending
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the error ended the session.
    ///
    /// The stored session has been cleared and the user must log in again.
    #[must_use]
    pub const fn is_forced_logout(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::RefreshFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
        let api = ApiError::Api {
            status: 409,
            message: "plate already exists".to_string(),
        };
        assert_eq!(api.status(), Some(409));
        assert_eq!(api.to_string(), "API error (status 409): plate already exists");
        assert_eq!(ApiError::Network("timed out".into()).status(), None);
    }

    #[test]
    fn test_forced_logout() {
        assert!(ApiError::MissingCredential.is_forced_logout());
        assert!(ApiError::RefreshFailed("expired".into()).is_forced_logout());
        assert!(!ApiError::Unauthorized.is_forced_logout());
    }

    #[test]
    fn test_validation_converts() {
        let mut errors = ValidationErrors::new();
        errors.add("plate_number", "Неверный формат номера");
        let error = ApiError::from(errors);
        assert!(matches!(error, ApiError::Validation(ref e) if e.get("plate_number").is_some()));
    }
}
