//! Deterministic entity fixtures.
//!
//! Every fixture is stamped with [`test_time`] and gets a fresh id, so tests
//! only spell out the fields they care about:
//!
//! ```
//! use pipo_console_testing::fixtures;
//!
//! let owner = fixtures::resident("Anna Smirnova", "12");
//! let pass = fixtures::pass(&owner, "A123BC77");
//! assert_eq!(pass.owner_user_id, owner.id);
//! ```

use chrono::{DateTime, Duration, Utc};
use pipo_console_core::{
    EntryAction, EntryLog, GuestRequest, GuestStatus, LoginResponse, Pass, PassStatus, Role,
    TokenPair, UserProfile,
};
use uuid::Uuid;

/// Fixed timestamp for fixtures (2025-01-01 00:00:00 UTC)
#[must_use]
pub fn test_time() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
}

/// User with `role`, derived email and no plot.
#[must_use]
pub fn user(full_name: &str, role: Role) -> UserProfile {
    let at = test_time();
    UserProfile {
        id: Uuid::new_v4(),
        email: format!("{}@pipo.local", full_name.to_lowercase().replace(' ', ".")),
        role,
        full_name: full_name.to_string(),
        plot_number: None,
        blocked_at: None,
        created_at: at,
        updated_at: at,
        created_by: None,
        updated_by: None,
        deleted_at: None,
    }
}

/// Administrator.
#[must_use]
pub fn admin(full_name: &str) -> UserProfile {
    user(full_name, Role::Admin)
}

/// Gate guard.
#[must_use]
pub fn guard(full_name: &str) -> UserProfile {
    user(full_name, Role::Guard)
}

/// Resident living on `plot`.
#[must_use]
pub fn resident(full_name: &str, plot: &str) -> UserProfile {
    UserProfile {
        plot_number: Some(plot.to_string()),
        ..user(full_name, Role::Resident)
    }
}

/// `user` marked as soft-deleted.
#[must_use]
pub fn deleted(mut user: UserProfile) -> UserProfile {
    user.deleted_at = Some(test_time() + Duration::hours(1));
    user
}

/// `user` marked as blocked.
#[must_use]
pub fn blocked(mut user: UserProfile) -> UserProfile {
    user.blocked_at = Some(test_time() + Duration::hours(1));
    user
}

/// Active pass for `owner`.
#[must_use]
pub fn pass(owner: &UserProfile, plate: &str) -> Pass {
    let at = test_time();
    Pass {
        id: Uuid::new_v4(),
        owner_user_id: owner.id,
        owner_full_name: Some(owner.full_name.clone()),
        owner_plot_number: owner.plot_number.clone(),
        plate_number: plate.to_string(),
        vehicle_brand: None,
        vehicle_color: None,
        status: PassStatus::Active,
        created_at: at,
        updated_at: at,
        created_by: None,
        updated_by: None,
        deleted_at: None,
    }
}

/// Pending guest request from `resident`, valid for one day starting
/// `starts_in_days` after [`test_time`].
#[must_use]
pub fn guest_request(resident: &UserProfile, guest: &str, plate: &str, starts_in_days: i64) -> GuestRequest {
    let at = test_time();
    let valid_from = at + Duration::days(starts_in_days);
    GuestRequest {
        id: Uuid::new_v4(),
        resident_user_id: resident.id,
        guest_full_name: guest.to_string(),
        plate_number: plate.to_string(),
        valid_from,
        valid_to: valid_from + Duration::days(1),
        status: GuestStatus::Pending,
        created_at: at,
        updated_at: at,
        created_by: None,
        updated_by: None,
        deleted_at: None,
    }
}

/// Gate log entry for `pass` recorded by `guard`.
#[must_use]
pub fn entry_log(pass: &Pass, guard: &UserProfile, action: EntryAction) -> EntryLog {
    EntryLog {
        id: Uuid::new_v4(),
        pass_id: pass.id,
        guard_user_id: guard.id,
        action,
        action_at: test_time(),
        comment: None,
    }
}

/// Body of a successful login.
#[must_use]
pub fn login_response(access_token: &str, refresh_token: &str, user: &UserProfile) -> LoginResponse {
    LoginResponse {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        user: user.clone(),
    }
}

/// Body of a successful refresh.
#[must_use]
pub fn token_pair(access_token: &str, refresh_token: &str) -> TokenPair {
    TokenPair {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
    }
}

/// The server's error body: `{"error": message}`.
#[must_use]
pub fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}
