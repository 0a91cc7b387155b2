//! Records exchanged with the PIPO API.
//!
//! Field names follow the server's JSON exactly. All types are `Clone` so
//! list views and forms can keep their own copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════
// Roles
// ═══════════════════════════════════════════════════════════════════════

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages users, passes and guest requests.
    Admin,
    /// Looks up passes and records vehicle entry/exit.
    Guard,
    /// Owns passes and files guest requests.
    Resident,
}

impl Role {
    /// All roles, in the order the console lists them.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Guard, Self::Resident];

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Guard => "guard",
            Self::Resident => "resident",
        }
    }

    /// Human-readable label shown in the console.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Администратор",
            Self::Guard => "Охрана",
            Self::Resident => "Житель",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Users
// ═══════════════════════════════════════════════════════════════════════

/// A user as returned by the API.
///
/// The same shape is cached in the session as the logged-in profile; that
/// copy is a snapshot taken at login and is not re-synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Role granted by the server.
    pub role: Role,
    /// Display name.
    pub full_name: String,
    /// Plot (house) number; set for residents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_number: Option<String>,
    /// Set while the account is blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Who created the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    /// Who last modified the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Uuid>,
    /// Soft-delete marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Returns `true` if the user is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns `true` if the user is blocked.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked_at.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Statuses
// ═══════════════════════════════════════════════════════════════════════

/// Status of a vehicle pass.
///
/// Statuses the console does not know are kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PassStatus {
    /// Pass admits the vehicle.
    #[default]
    Active,
    /// Pass is temporarily disabled.
    Inactive,
    /// Pass was withdrawn.
    Revoked,
    /// Any other status reported by the server.
    Other(String),
}

impl PassStatus {
    /// Statuses offered by the pass forms.
    pub const SELECTABLE: [Self; 3] = [Self::Active, Self::Inactive, Self::Revoked];

    /// Wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Revoked => "revoked",
            Self::Other(other) => other,
        }
    }

    /// Status to preselect when editing: known statuses as-is, anything
    /// else falls back to `Active`.
    #[must_use]
    pub fn or_active(&self) -> Self {
        match self {
            Self::Other(_) => Self::Active,
            known => known.clone(),
        }
    }
}

impl From<String> for PassStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            "revoked" => Self::Revoked,
            _ => Self::Other(value),
        }
    }
}

impl From<PassStatus> for String {
    fn from(value: PassStatus) -> Self {
        match value {
            PassStatus::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a guest request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GuestStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Guest may enter within the validity window.
    Approved,
    /// Request declined.
    Rejected,
    /// Any other status reported by the server.
    Other(String),
}

impl GuestStatus {
    /// Statuses offered by the guest request forms.
    pub const SELECTABLE: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Other(other) => other,
        }
    }

    /// Status to preselect when editing: known statuses as-is, anything
    /// else falls back to `Pending`.
    #[must_use]
    pub fn or_pending(&self) -> Self {
        match self {
            Self::Other(_) => Self::Pending,
            known => known.clone(),
        }
    }
}

impl From<String> for GuestStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Other(value),
        }
    }
}

impl From<GuestStatus> for String {
    fn from(value: GuestStatus) -> Self {
        match value {
            GuestStatus::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Passes, guest requests, entry logs
// ═══════════════════════════════════════════════════════════════════════

/// A resident's permanent vehicle pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pass {
    /// Pass identifier.
    pub id: Uuid,
    /// Resident owning the pass.
    pub owner_user_id: Uuid,
    /// Owner's name, when the server joins it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_full_name: Option<String>,
    /// Owner's plot number, when the server joins it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_plot_number: Option<String>,
    /// Normalized plate number.
    pub plate_number: String,
    /// Vehicle make.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_brand: Option<String>,
    /// Vehicle color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_color: Option<String>,
    /// Current status.
    pub status: PassStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Who created the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    /// Who last modified the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Uuid>,
    /// Soft-delete marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Pass {
    /// Returns `true` if the pass is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A time-bounded guest pass requested by a resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRequest {
    /// Request identifier.
    pub id: Uuid,
    /// Resident who invited the guest.
    pub resident_user_id: Uuid,
    /// Guest's name.
    pub guest_full_name: String,
    /// Guest vehicle plate.
    pub plate_number: String,
    /// Start of the validity window.
    pub valid_from: DateTime<Utc>,
    /// End of the validity window.
    pub valid_to: DateTime<Utc>,
    /// Current status.
    pub status: GuestStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Who created the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    /// Who last modified the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Uuid>,
    /// Soft-delete marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl GuestRequest {
    /// Returns `true` if the request is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Gate action recorded by a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryAction {
    /// Vehicle entered.
    Entry,
    /// Vehicle left.
    Exit,
}

impl EntryAction {
    /// Path segment of the endpoint recording this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
        }
    }
}

/// A recorded gate action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLog {
    /// Log entry identifier.
    pub id: Uuid,
    /// Pass presented at the gate.
    pub pass_id: Uuid,
    /// Guard who recorded the action.
    pub guard_user_id: Uuid,
    /// What happened.
    pub action: EntryAction,
    /// When it happened.
    pub action_at: DateTime<Utc>,
    /// Free-form guard note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Auth payloads
// ═══════════════════════════════════════════════════════════════════════

/// Access/refresh credential pair returned by `/auth/refresh`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Credential used to mint the next pair.
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Body returned by `/auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Credential used to mint the next pair.
    pub refresh_token: String,
    /// Profile of the authenticated user.
    pub user: UserProfile,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Guard).ok(), Some("\"guard\"".to_string()));
        let role: Role = serde_json::from_str("\"resident\"").unwrap_or(Role::Admin);
        assert_eq!(role, Role::Resident);
        assert!(serde_json::from_str::<Role>("\"janitor\"").is_err());
    }

    #[test]
    fn test_unknown_pass_status_is_preserved() {
        let status: PassStatus = serde_json::from_str("\"suspended\"").unwrap_or_default();
        assert_eq!(status, PassStatus::Other("suspended".to_string()));
        assert_eq!(serde_json::to_string(&status).ok(), Some("\"suspended\"".to_string()));
    }

    #[test]
    fn test_pass_status_edit_fallback() {
        assert_eq!(PassStatus::Revoked.or_active(), PassStatus::Revoked);
        assert_eq!(PassStatus::Other("suspended".into()).or_active(), PassStatus::Active);
    }

    #[test]
    fn test_guest_status_edit_fallback() {
        assert_eq!(GuestStatus::Approved.or_pending(), GuestStatus::Approved);
        assert_eq!(GuestStatus::Other("expired".into()).or_pending(), GuestStatus::Pending);
    }

    #[test]
    fn test_user_profile_optional_fields() {
        let json = r#"{
            "id": "4f1c1b7e-2d4a-4b8e-9a55-0c9e2f6f7a10",
            "email": "guard@pipo.local",
            "role": "guard",
            "full_name": "Ivan Petrov",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        }"#;
        let user: UserProfile = serde_json::from_str(json).expect("profile should parse");
        assert_eq!(user.role, Role::Guard);
        assert!(user.plot_number.is_none());
        assert!(!user.is_deleted());
        assert!(!user.is_blocked());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let pair = TokenPair {
            access_token: "secret-access".into(),
            refresh_token: "secret-refresh".into(),
        };
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret"));
    }
}
