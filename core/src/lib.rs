//! # PIPO Console Core
//!
//! Client-side building blocks of the PIPO residential access-control
//! console: entity records, the session store, form validation, list views
//! and role-gated screen resolution.
//!
//! Everything authoritative (who may do what, pass lifecycle, entry rules)
//! lives in the remote API. This crate holds the state a console keeps
//! between calls and the checks it runs before making them.
//!
//! ## Example
//!
//! ```
//! use pipo_console_core::routing::{resolve_path, Navigation, Screen};
//! use pipo_console_core::session::SessionStore;
//! use pipo_console_core::storage::MemoryStorage;
//!
//! let session = SessionStore::new(MemoryStorage::new());
//!
//! // Nobody is logged in, so protected screens bounce to login.
//! assert_eq!(
//!     resolve_path("/admin/passes", &session),
//!     Navigation::Redirect(Screen::Login)
//! );
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod error;
pub mod forms;
pub mod model;
pub mod routing;
pub mod session;
pub mod storage;
pub mod validation;
pub mod views;

// Re-export main types for convenience
pub use error::{SessionError, ValidationErrors};
pub use model::{
    EntryAction, EntryLog, GuestRequest, GuestStatus, LoginResponse, Pass, PassStatus, Role,
    TokenPair, UserProfile,
};
pub use routing::{Navigation, Screen};
pub use session::{Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
