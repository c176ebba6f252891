//! One-shot post-login synchronization.
//!
//! SYSTEM CONTEXT
//! ==============
//! Called by the host once an interactive sign-in completes (for example when
//! a redirect flow returns). It resolves the role, hands the user to the
//! host's state, and picks a landing route. It never owns session state.
//!
//! TRADE-OFFS
//! ==========
//! Calls are single-flight: a second call while one is resolving returns
//! [`SyncOutcome::AlreadyRunning`] with no side effects. If the identity changes
//! while the role is being resolved, the result is dropped
//! ([`SyncOutcome::Superseded`]) and the live session's own events win.

use std::cell::Cell;
use std::rc::Rc;

use crate::auth::AuthProvider;
use crate::http::Transport;
use crate::identity::{AuthenticatedUser, Role};
use crate::role::RoleResolver;

/// Host callbacks invoked after a successful synchronization.
pub trait SyncEffects {
    /// Store the freshly resolved user in host state.
    fn store_user(&self, user: AuthenticatedUser);
    /// Navigate to the landing route for `role`.
    fn navigate(&self, role: Role);
}

/// [`SyncEffects`] built from two closures.
pub struct CallbackEffects<S, N> {
    pub store_user: S,
    pub navigate: N,
}

impl<S, N> SyncEffects for CallbackEffects<S, N>
where
    S: Fn(AuthenticatedUser),
    N: Fn(Role),
{
    fn store_user(&self, user: AuthenticatedUser) {
        (self.store_user)(user);
    }

    fn navigate(&self, role: Role) {
        (self.navigate)(role);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nobody is signed in; nothing was done.
    NoSession,
    /// Another synchronization is still resolving; nothing was done.
    AlreadyRunning,
    /// The identity changed mid-resolution; nothing was stored.
    Superseded,
    /// The user was stored and navigation was requested.
    Completed(AuthenticatedUser),
}

/// Default landing route per role.
#[must_use]
pub fn default_destination(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Manager => "/manager",
        Role::Developer => "/editor",
        Role::Guest => "/",
    }
}

struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct SessionSynchronizer<P, T> {
    provider: Rc<P>,
    resolver: Rc<RoleResolver<T>>,
    in_flight: Cell<bool>,
}

impl<P, T> SessionSynchronizer<P, T>
where
    P: AuthProvider,
    T: Transport,
{
    pub fn new(provider: Rc<P>, resolver: Rc<RoleResolver<T>>) -> Self {
        Self { provider, resolver, in_flight: Cell::new(false) }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.in_flight.get()
    }

    /// Resolve the current identity's role, then store it and navigate.
    pub async fn synchronize<E: SyncEffects + ?Sized>(&self, effects: &E) -> SyncOutcome {
        if self.in_flight.replace(true) {
            tracing::debug!("post-login sync already running; ignoring duplicate call");
            return SyncOutcome::AlreadyRunning;
        }
        let _flight = InFlight(&self.in_flight);

        let Some(identity) = self.provider.current_identity() else {
            tracing::debug!("post-login sync skipped: no identity");
            return SyncOutcome::NoSession;
        };

        let role = self
            .resolver
            .resolve_identity_or_default(self.provider.as_ref(), &identity)
            .await;

        let still_current = self
            .provider
            .current_identity()
            .is_some_and(|current| current.uid == identity.uid);
        if !still_current {
            tracing::info!(uid = %identity.uid, "identity changed during post-login sync; dropping result");
            return SyncOutcome::Superseded;
        }

        let user = AuthenticatedUser::new(identity, role);
        tracing::info!(uid = %user.identity.uid, %role, "post-login sync complete");
        effects.store_user(user.clone());
        effects.navigate(role);
        SyncOutcome::Completed(user)
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
