//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login redirects
//! and role-dependent rendering. Values are produced from the session's
//! published snapshots; components only read them.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use codepad::{AuthenticatedUser, Role, SessionSnapshot};

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<AuthenticatedUser>,
    pub loading: bool,
}

impl AuthState {
    /// State before the first auth event arrives.
    pub fn initial() -> Self {
        SessionSnapshot::initial().into()
    }

    pub fn signed_in(user: AuthenticatedUser) -> Self {
        Self { user: Some(user), loading: false }
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}

impl From<SessionSnapshot> for AuthState {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self { user: snapshot.user, loading: snapshot.loading }
    }
}
