//! # PIPO API Client
//!
//! Authenticated HTTP client for the PIPO residential access-control API.
//! Requests carry the stored bearer token; an expired token is refreshed
//! once, shared between every request that noticed the expiry, and the
//! failed requests are resent with the new token.
//!
//! ## Example
//!
//! ```no_run
//! use pipo_console_client::{ApiClient, ListQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Configure from PIPO_API_URL / PIPO_SESSION_FILE / PIPO_HTTP_TIMEOUT_SECS
//!     let client = ApiClient::from_env()?;
//!
//!     let user = client.login("guard@pipo.local", "secret1").await?;
//!     println!("Logged in as {} ({})", user.full_name, user.role.label());
//!
//!     for pass in client.search_passes("a123bc77").await? {
//!         println!("{} {}", pass.plate_number, pass.status);
//!     }
//!
//!     let passes = client.list_passes(ListQuery::console()).await?;
//!     println!("{} passes", passes.len());
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod refresh;
pub mod request;

// Re-export main types for convenience
pub use api::ListQuery;
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use refresh::RefreshCoordinator;
pub use request::ApiRequest;
