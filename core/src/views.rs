//! Display-time filtering and ordering of entity lists.
//!
//! The console fetches whole lists (including deleted records) and narrows
//! them locally as the user types or flips a toggle. Nothing here changes
//! data; it only decides what to show and in which order.

use crate::model::{GuestRequest, Pass, Role, UserProfile};
use std::collections::HashMap;
use uuid::Uuid;

/// Toggles and search text shared by the list screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Free-text query, matched case-insensitively as a substring.
    pub search: String,
    /// Include soft-deleted records.
    pub show_deleted: bool,
    /// Include blocked users (user list only).
    pub show_blocked: bool,
}

impl ListFilter {
    /// Filter with the console defaults: deleted hidden, blocked shown.
    #[must_use]
    pub fn new() -> Self {
        Self {
            search: String::new(),
            show_deleted: false,
            show_blocked: true,
        }
    }

    /// Set the search text.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Show or hide soft-deleted records.
    #[must_use]
    pub const fn with_deleted(mut self, show_deleted: bool) -> Self {
        self.show_deleted = show_deleted;
        self
    }

    /// Show or hide blocked users.
    #[must_use]
    pub const fn with_blocked(mut self, show_blocked: bool) -> Self {
        self.show_blocked = show_blocked;
        self
    }

    fn query(&self) -> Option<String> {
        let query = self.search.trim().to_lowercase();
        (!query.is_empty()).then_some(query)
    }
}

fn matches(query: Option<&str>, haystack: impl FnOnce() -> String) -> bool {
    query.is_none_or(|q| haystack().to_lowercase().contains(q))
}

/// Users shown on the user management screen, sorted by full name.
///
/// The search covers name, email, plot number and the role label.
#[must_use]
pub fn filter_users<'a>(users: &'a [UserProfile], filter: &ListFilter) -> Vec<&'a UserProfile> {
    let query = filter.query();
    let mut shown: Vec<&UserProfile> = users
        .iter()
        .filter(|user| filter.show_deleted || !user.is_deleted())
        .filter(|user| filter.show_blocked || !user.is_blocked())
        .filter(|user| {
            matches(query.as_deref(), || {
                format!(
                    "{} {} {} {}",
                    user.full_name,
                    user.email,
                    user.plot_number.as_deref().unwrap_or_default(),
                    user.role.label()
                )
            })
        })
        .collect();
    shown.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    shown
}

/// Residents that may be picked as pass owners or guest hosts: not deleted,
/// not blocked, sorted by full name.
#[must_use]
pub fn active_residents(users: &[UserProfile]) -> Vec<&UserProfile> {
    let mut residents: Vec<&UserProfile> = users
        .iter()
        .filter(|user| user.role == Role::Resident && !user.is_deleted() && !user.is_blocked())
        .collect();
    residents.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    residents
}

/// Lookup of users by id, used to show owners next to passes and requests.
#[derive(Debug, Clone, Default)]
pub struct UserIndex<'a> {
    by_id: HashMap<Uuid, &'a UserProfile>,
}

impl<'a> UserIndex<'a> {
    /// Index `users` by id.
    #[must_use]
    pub fn new(users: &'a [UserProfile]) -> Self {
        Self {
            by_id: users.iter().map(|user| (user.id, user)).collect(),
        }
    }

    /// User with `id`, if known.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&'a UserProfile> {
        self.by_id.get(&id).copied()
    }

    /// "Name plot" for a known user, the raw id otherwise.
    #[must_use]
    pub fn describe(&self, id: Uuid) -> String {
        match self.get(id) {
            Some(user) => format!(
                "{} {}",
                user.full_name,
                user.plot_number.as_deref().unwrap_or_default()
            ),
            None => id.to_string(),
        }
    }
}

/// Passes shown on the pass management screen, sorted by plate.
///
/// The search covers plate, status, and owner name and plot.
#[must_use]
pub fn filter_passes<'a>(
    passes: &'a [Pass],
    users: &UserIndex<'_>,
    filter: &ListFilter,
) -> Vec<&'a Pass> {
    let query = filter.query();
    let mut shown: Vec<&Pass> = passes
        .iter()
        .filter(|pass| filter.show_deleted || !pass.is_deleted())
        .filter(|pass| {
            matches(query.as_deref(), || {
                format!(
                    "{} {} {}",
                    pass.plate_number,
                    pass.status,
                    users.describe(pass.owner_user_id)
                )
            })
        })
        .collect();
    shown.sort_by(|a, b| a.plate_number.cmp(&b.plate_number));
    shown
}

/// Guest requests shown on the guest screen, newest window first.
///
/// The search covers guest name, plate, status, and resident name and plot.
#[must_use]
pub fn filter_guest_requests<'a>(
    requests: &'a [GuestRequest],
    users: &UserIndex<'_>,
    filter: &ListFilter,
) -> Vec<&'a GuestRequest> {
    let query = filter.query();
    let mut shown: Vec<&GuestRequest> = requests
        .iter()
        .filter(|request| filter.show_deleted || !request.is_deleted())
        .filter(|request| {
            matches(query.as_deref(), || {
                format!(
                    "{} {} {} {}",
                    request.guest_full_name,
                    request.plate_number,
                    request.status,
                    users.describe(request.resident_user_id)
                )
            })
        })
        .collect();
    shown.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));
    shown
}
