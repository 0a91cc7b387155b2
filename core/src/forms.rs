//! Create/edit payloads for users, passes and guest requests.
//!
//! Each form is built from raw input and turned into a submission with
//! `validate()`, which checks every field, collects all failures, and
//! returns a normalized copy (trimmed text, upper-cased plates) ready to be
//! serialized as the request body.
//!
//! # Example
//!
//! ```
//! use pipo_console_core::forms::NewPass;
//!
//! let pass = NewPass::own(" a123bc77 ").validate().unwrap();
//! assert_eq!(pass.plate_number, "A123BC77");
//!
//! let errors = NewPass::own("garbage").validate().unwrap_err();
//! assert!(errors.get("plate_number").is_some());
//! ```

use crate::error::ValidationErrors;
use crate::model::{GuestStatus, PassStatus, Role};
use crate::validation::{
    MSG_PLOT_REQUIRED, MSG_WINDOW_REVERSED, check_email, check_name, check_password, check_plate,
    normalize_plate,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

// Residents must name their plot; everyone else submits an empty plot.
fn plot_for_role(errors: &mut ValidationErrors, role: Role, plot: Option<&str>) -> String {
    let plot = non_blank(plot);
    match (role, plot) {
        (Role::Resident, Some(plot)) => plot,
        (Role::Resident, None) => {
            errors.add("plot_number", MSG_PLOT_REQUIRED);
            String::new()
        }
        _ => String::new(),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Users
// ═══════════════════════════════════════════════════════════════════════

/// Body of `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Role to grant.
    pub role: Role,
    /// Display name.
    pub full_name: String,
    /// Plot number; empty for non-residents once validated.
    pub plot_number: String,
}

impl NewUser {
    /// Start a user form.
    #[must_use]
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role,
            full_name: full_name.into(),
            plot_number: String::new(),
        }
    }

    /// Set the plot number.
    #[must_use]
    pub fn with_plot_number(mut self, plot_number: impl Into<String>) -> Self {
        self.plot_number = plot_number.into();
        self
    }

    /// Check and normalize the form.
    ///
    /// # Errors
    ///
    /// Returns every failing field: `full_name` (under 2 characters),
    /// `email`, `password` (under 6 characters), `plot_number` (missing for
    /// a resident).
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let full_name = trimmed(&self.full_name);
        let email = trimmed(&self.email);

        check_name(&mut errors, "full_name", &full_name);
        check_email(&mut errors, &email);
        check_password(&mut errors, &self.password);
        let plot_number = plot_for_role(&mut errors, self.role, Some(&self.plot_number));

        errors.into_result()?;
        Ok(Self {
            email,
            password: self.password,
            role: self.role,
            full_name,
            plot_number,
        })
    }
}

/// Body of `PATCH /users/{id}`.
///
/// The password is only sent when a new one was typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEdit {
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Role.
    pub role: Role,
    /// Plot number; empty for non-residents once validated.
    pub plot_number: String,
    /// Replacement password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserEdit {
    /// Start an edit form prefilled from an existing user.
    #[must_use]
    pub fn from_user(user: &crate::model::UserProfile) -> Self {
        Self {
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            plot_number: user.plot_number.clone().unwrap_or_default(),
            password: None,
        }
    }

    /// Set a new password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Check and normalize the form.
    ///
    /// # Errors
    ///
    /// Same rules as [`NewUser::validate`], except the password is optional;
    /// a blank password is dropped rather than rejected.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let full_name = trimmed(&self.full_name);
        let email = trimmed(&self.email);

        check_name(&mut errors, "full_name", &full_name);
        check_email(&mut errors, &email);
        let password = non_blank(self.password.as_deref());
        if let Some(password) = &password {
            check_password(&mut errors, password);
        }
        let plot_number = plot_for_role(&mut errors, self.role, Some(&self.plot_number));

        errors.into_result()?;
        Ok(Self {
            full_name,
            email,
            role: self.role,
            plot_number,
            password,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Passes
// ═══════════════════════════════════════════════════════════════════════

/// Body of `POST /passes`.
///
/// Residents create passes for themselves ([`NewPass::own`]); admins pick
/// the owner ([`NewPass::for_owner`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPass {
    /// Owner chosen by an admin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<Uuid>,
    /// Plate number.
    pub plate_number: String,
    /// Vehicle make.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_brand: Option<String>,
    /// Vehicle color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_color: Option<String>,
    /// Initial status; the server defaults to `active`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PassStatus>,
}

impl NewPass {
    /// Pass for the logged-in resident.
    #[must_use]
    pub fn own(plate_number: impl Into<String>) -> Self {
        Self {
            owner_user_id: None,
            plate_number: plate_number.into(),
            vehicle_brand: None,
            vehicle_color: None,
            status: None,
        }
    }

    /// Pass for `owner`, issued by an admin.
    #[must_use]
    pub fn for_owner(owner: Uuid, plate_number: impl Into<String>, status: PassStatus) -> Self {
        Self {
            owner_user_id: Some(owner),
            status: Some(status),
            ..Self::own(plate_number)
        }
    }

    /// Describe the vehicle.
    #[must_use]
    pub fn with_vehicle(mut self, brand: impl Into<String>, color: impl Into<String>) -> Self {
        self.vehicle_brand = Some(brand.into());
        self.vehicle_color = Some(color.into());
        self
    }

    /// Check and normalize the form.
    ///
    /// # Errors
    ///
    /// Returns `plate_number` if the plate is malformed.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_plate(&mut errors, &self.plate_number);
        errors.into_result()?;

        Ok(Self {
            owner_user_id: self.owner_user_id,
            plate_number: normalize_plate(&self.plate_number),
            vehicle_brand: non_blank(self.vehicle_brand.as_deref()),
            vehicle_color: non_blank(self.vehicle_color.as_deref()),
            status: self.status,
        })
    }
}

/// Body of `PATCH /passes/{id}`.
///
/// Blank vehicle fields are sent as `null`, which clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassEdit {
    /// Plate number.
    pub plate_number: String,
    /// Vehicle make.
    pub vehicle_brand: Option<String>,
    /// Vehicle color.
    pub vehicle_color: Option<String>,
    /// Status.
    pub status: PassStatus,
}

impl PassEdit {
    /// Start an edit form prefilled from an existing pass.
    #[must_use]
    pub fn from_pass(pass: &crate::model::Pass) -> Self {
        Self {
            plate_number: pass.plate_number.clone(),
            vehicle_brand: pass.vehicle_brand.clone(),
            vehicle_color: pass.vehicle_color.clone(),
            status: pass.status.or_active(),
        }
    }

    /// Check and normalize the form.
    ///
    /// # Errors
    ///
    /// Returns `plate_number` if the plate is malformed.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_plate(&mut errors, &self.plate_number);
        errors.into_result()?;

        Ok(Self {
            plate_number: normalize_plate(&self.plate_number),
            vehicle_brand: non_blank(self.vehicle_brand.as_deref()),
            vehicle_color: non_blank(self.vehicle_color.as_deref()),
            status: self.status,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Guest requests
// ═══════════════════════════════════════════════════════════════════════

fn check_window(errors: &mut ValidationErrors, from: DateTime<Utc>, to: DateTime<Utc>) {
    if to < from {
        errors.add("valid_to", MSG_WINDOW_REVERSED);
    }
}

/// Body of `POST /guest-requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGuestRequest {
    /// Inviting resident, chosen by an admin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resident_user_id: Option<Uuid>,
    /// Guest's name.
    pub guest_full_name: String,
    /// Guest vehicle plate.
    pub plate_number: String,
    /// Start of the validity window.
    pub valid_from: DateTime<Utc>,
    /// End of the validity window.
    pub valid_to: DateTime<Utc>,
    /// Initial status; the server defaults to `pending`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GuestStatus>,
}

impl NewGuestRequest {
    /// Request filed by the logged-in resident.
    #[must_use]
    pub fn own(
        guest_full_name: impl Into<String>,
        plate_number: impl Into<String>,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
    ) -> Self {
        Self {
            resident_user_id: None,
            guest_full_name: guest_full_name.into(),
            plate_number: plate_number.into(),
            valid_from,
            valid_to,
            status: None,
        }
    }

    /// Request filed by an admin on behalf of `resident`.
    #[must_use]
    pub fn for_resident(
        resident: Uuid,
        guest_full_name: impl Into<String>,
        plate_number: impl Into<String>,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
        status: GuestStatus,
    ) -> Self {
        Self {
            resident_user_id: Some(resident),
            status: Some(status),
            ..Self::own(guest_full_name, plate_number, valid_from, valid_to)
        }
    }

    /// Check and normalize the form.
    ///
    /// # Errors
    ///
    /// Returns every failing field: `guest_full_name` (under 2 characters),
    /// `plate_number`, `valid_to` (before `valid_from`).
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let guest_full_name = trimmed(&self.guest_full_name);

        check_name(&mut errors, "guest_full_name", &guest_full_name);
        check_plate(&mut errors, &self.plate_number);
        check_window(&mut errors, self.valid_from, self.valid_to);

        errors.into_result()?;
        Ok(Self {
            guest_full_name,
            plate_number: normalize_plate(&self.plate_number),
            ..self
        })
    }
}

/// Body of `PATCH /guest-requests/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestRequestEdit {
    /// Guest's name.
    pub guest_full_name: String,
    /// Guest vehicle plate.
    pub plate_number: String,
    /// Start of the validity window.
    pub valid_from: DateTime<Utc>,
    /// End of the validity window.
    pub valid_to: DateTime<Utc>,
    /// Status.
    pub status: GuestStatus,
}

impl GuestRequestEdit {
    /// Start an edit form prefilled from an existing request.
    ///
    /// Unknown statuses are preselected as `pending`.
    #[must_use]
    pub fn from_request(request: &crate::model::GuestRequest) -> Self {
        Self {
            guest_full_name: request.guest_full_name.clone(),
            plate_number: request.plate_number.clone(),
            valid_from: request.valid_from,
            valid_to: request.valid_to,
            status: request.status.or_pending(),
        }
    }

    /// Check and normalize the form.
    ///
    /// # Errors
    ///
    /// Same rules as [`NewGuestRequest::validate`].
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let guest_full_name = trimmed(&self.guest_full_name);

        check_name(&mut errors, "guest_full_name", &guest_full_name);
        check_plate(&mut errors, &self.plate_number);
        check_window(&mut errors, self.valid_from, self.valid_to);

        errors.into_result()?;
        Ok(Self {
            guest_full_name,
            plate_number: normalize_plate(&self.plate_number),
            ..self
        })
    }
}
