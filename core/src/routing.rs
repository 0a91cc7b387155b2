//! Role-gated screen resolution.
//!
//! Every console screen belongs to one role. Resolving a screen against the
//! session's user either allows it or names the screen to redirect to:
//!
//! | Situation                         | Result                      |
//! |-----------------------------------|-----------------------------|
//! | Path naming no screen             | redirect to Login           |
//! | Login screen                      | allowed                     |
//! | No stored user (logged out)       | redirect to Login           |
//! | Screen belongs to another role    | redirect to the user's home |
//! | Otherwise                         | allowed                     |

use crate::model::{Role, UserProfile};
use crate::session::SessionStore;

/// Screens of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Credential entry.
    Login,
    /// Admin landing page.
    AdminDashboard,
    /// User management.
    AdminUsers,
    /// Pass management.
    AdminPasses,
    /// Guest request management.
    AdminGuests,
    /// Plate lookup and entry/exit recording.
    GuardDashboard,
    /// Resident's own passes and guest requests.
    ResidentDashboard,
}

impl Screen {
    /// Every screen.
    pub const ALL: [Self; 7] = [
        Self::Login,
        Self::AdminDashboard,
        Self::AdminUsers,
        Self::AdminPasses,
        Self::AdminGuests,
        Self::GuardDashboard,
        Self::ResidentDashboard,
    ];

    /// URL path of the screen.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::AdminDashboard => "/admin",
            Self::AdminUsers => "/admin/users",
            Self::AdminPasses => "/admin/passes",
            Self::AdminGuests => "/admin/guests",
            Self::GuardDashboard => "/guard",
            Self::ResidentDashboard => "/resident",
        }
    }

    /// Screen at `path`, if any. A trailing slash is ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        Self::ALL.into_iter().find(|screen| screen.path() == path)
    }

    /// Role the screen is reserved for; `None` for Login.
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::Login => None,
            Self::AdminDashboard | Self::AdminUsers | Self::AdminPasses | Self::AdminGuests => {
                Some(Role::Admin)
            }
            Self::GuardDashboard => Some(Role::Guard),
            Self::ResidentDashboard => Some(Role::Resident),
        }
    }

    /// Landing screen for `role`, used after login and on role mismatch.
    #[must_use]
    pub const fn home(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminDashboard,
            Role::Guard => Self::GuardDashboard,
            Role::Resident => Self::ResidentDashboard,
        }
    }
}

/// Outcome of resolving a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Show the requested screen.
    Allow(Screen),
    /// Replace the location with another screen.
    Redirect(Screen),
}

impl Navigation {
    /// Screen that ends up displayed.
    #[must_use]
    pub const fn screen(self) -> Screen {
        match self {
            Self::Allow(screen) | Self::Redirect(screen) => screen,
        }
    }
}

/// Decide whether `user` may see `screen`.
#[must_use]
pub fn resolve(screen: Screen, user: Option<&UserProfile>) -> Navigation {
    let Some(required) = screen.required_role() else {
        return Navigation::Allow(screen);
    };

    match user {
        None => Navigation::Redirect(Screen::Login),
        Some(user) if user.role != required => Navigation::Redirect(Screen::home(user.role)),
        Some(_) => Navigation::Allow(screen),
    }
}

/// Resolve `path` against the user currently stored in `session`.
///
/// After a forced logout the session holds no user, so every protected path
/// resolves to a redirect to Login. Paths that name no screen (including `/`)
/// redirect to Login as well.
#[must_use]
pub fn resolve_path(path: &str, session: &SessionStore) -> Navigation {
    let navigation = match Screen::from_path(path) {
        Some(screen) => resolve(screen, session.user().as_ref()),
        None => Navigation::Redirect(Screen::Login),
    };
    if let Navigation::Redirect(target) = navigation {
        tracing::debug!(path, target = target.path(), "Redirecting");
    }
    navigation
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::Utc;
    use uuid::Uuid;

    fn profile(role: Role) -> UserProfile {
        let now = Utc::now();
        UserProfile {
            id: Uuid::new_v4(),
            email: "someone@pipo.local".into(),
            role,
            full_name: "Someone".into(),
            plot_number: None,
            blocked_at: None,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_paths_round_trip() {
        for screen in Screen::ALL {
            assert_eq!(Screen::from_path(screen.path()), Some(screen));
        }
        assert_eq!(Screen::from_path("/admin/users/"), Some(Screen::AdminUsers));
        assert_eq!(Screen::from_path("/"), None);
        assert_eq!(Screen::from_path("/nowhere"), None);
    }

    #[test]
    fn test_unknown_path_redirects_to_login() {
        let session = SessionStore::new(MemoryStorage::new());
        assert_eq!(resolve_path("/xyz", &session), Navigation::Redirect(Screen::Login));

        session.set_session("a", "r", &profile(Role::Admin)).unwrap();
        assert_eq!(resolve_path("/xyz", &session), Navigation::Redirect(Screen::Login));
        assert_eq!(resolve_path("/", &session), Navigation::Redirect(Screen::Login));
        assert_eq!(resolve_path("/login", &session), Navigation::Allow(Screen::Login));
    }

    #[test]
    fn test_login_always_allowed() {
        assert_eq!(resolve(Screen::Login, None), Navigation::Allow(Screen::Login));
        let admin = profile(Role::Admin);
        assert_eq!(resolve(Screen::Login, Some(&admin)), Navigation::Allow(Screen::Login));
    }

    #[test]
    fn test_anonymous_redirected_to_login() {
        for screen in Screen::ALL.into_iter().filter(|s| *s != Screen::Login) {
            assert_eq!(resolve(screen, None), Navigation::Redirect(Screen::Login));
        }
    }

    #[test]
    fn test_role_mismatch_goes_home() {
        let guard = profile(Role::Guard);
        assert_eq!(
            resolve(Screen::AdminUsers, Some(&guard)),
            Navigation::Redirect(Screen::GuardDashboard)
        );

        let resident = profile(Role::Resident);
        assert_eq!(
            resolve(Screen::GuardDashboard, Some(&resident)),
            Navigation::Redirect(Screen::ResidentDashboard)
        );

        let admin = profile(Role::Admin);
        assert_eq!(
            resolve(Screen::ResidentDashboard, Some(&admin)),
            Navigation::Redirect(Screen::AdminDashboard)
        );
        assert_eq!(resolve(Screen::AdminGuests, Some(&admin)), Navigation::Allow(Screen::AdminGuests));
    }

    #[test]
    fn test_cleared_session_redirects_to_login() {
        let session = SessionStore::new(MemoryStorage::new());
        session.set_session("a", "r", &profile(Role::Guard)).unwrap();
        assert_eq!(resolve_path("/guard", &session), Navigation::Allow(Screen::GuardDashboard));

        session.clear().unwrap();
        assert_eq!(resolve_path("/guard", &session).screen(), Screen::Login);
    }
}
