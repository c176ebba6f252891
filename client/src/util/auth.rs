//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components should apply identical unauthenticated-redirect and
//! role-access behavior.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use codepad::Role;
use codepad::sync::default_destination;
use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;

pub const LOGIN_ROUTE: &str = "/login";

/// `true` once auth has settled with nobody signed in.
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && state.user.is_none()
}

/// Redirect to `/login` whenever auth has loaded and no user is present.
pub fn install_unauth_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    let navigate = navigate.clone();
    Effect::new(move || {
        let state = auth.get();
        if should_redirect_unauth(&state) {
            navigate(LOGIN_ROUTE, NavigateOptions::default());
        }
    });
}

/// Whether `role` may open `path`. Role areas nest: admins reach every area,
/// managers reach the manager and editor areas, developers reach the editor.
pub fn role_can_access(role: Role, path: &str) -> bool {
    let required = if in_area(path, "/admin") {
        &[Role::Admin][..]
    } else if in_area(path, "/manager") {
        &[Role::Admin, Role::Manager][..]
    } else if in_area(path, "/editor") {
        &[Role::Admin, Role::Manager, Role::Developer][..]
    } else {
        return true;
    };
    required.contains(&role)
}

fn in_area(path: &str, area: &str) -> bool {
    path.strip_prefix(area)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}

/// Where the current auth state should land: `None` while loading, the login
/// route when signed out, otherwise the role's default destination.
pub fn destination_for(state: &AuthState) -> Option<&'static str> {
    if state.loading {
        return None;
    }
    Some(state.role().map_or(LOGIN_ROUTE, default_destination))
}
