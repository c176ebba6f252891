//! Leptos glue for the identity session and post-login sync.
//!
//! SYSTEM CONTEXT
//! ==============
//! `bind_auth_state` runs an [`IdentitySession`] on the Leptos task queue and
//! mirrors every snapshot into an `RwSignal<AuthState>`. `complete_sign_in` is
//! called by the login page when a redirect sign-in returns.

use codepad::sync::{CallbackEffects, default_destination};
use codepad::{
    AuthProvider, AuthenticatedUser, IdentitySession, Role, SessionSynchronizer, Subscription, SyncOutcome, Transport,
};
use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;

/// Activate `session` and keep `auth` in step with it.
///
/// The binding runs until the returned subscription is stopped or dropped, so
/// the caller keeps it alive for as long as the signal should update.
pub fn bind_auth_state<P, T>(session: IdentitySession<P, T>, auth: RwSignal<AuthState>) -> Subscription
where
    P: AuthProvider + 'static,
    T: Transport + 'static,
{
    let mut snapshots = session.watch();
    let (subscription, driver) = session.activate();
    leptos::task::spawn_local(driver);
    leptos::task::spawn_local(async move {
        auth.set(snapshots.borrow_and_update().clone().into());
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            auth.set(snapshot.into());
        }
        log::debug!("auth state binding ended");
    });
    subscription
}

/// Run post-login sync, storing the user in `auth` and navigating to the
/// role's landing route.
pub async fn complete_sign_in<P, T, F>(
    sync: &SessionSynchronizer<P, T>,
    auth: RwSignal<AuthState>,
    navigate: F,
) -> SyncOutcome
where
    P: AuthProvider,
    T: Transport,
    F: Fn(&str, NavigateOptions),
{
    let effects = CallbackEffects {
        store_user: move |user: AuthenticatedUser| auth.set(AuthState::signed_in(user)),
        navigate: |role: Role| navigate(default_destination(role), NavigateOptions::default()),
    };
    let outcome = sync.synchronize(&effects).await;
    if !matches!(outcome, SyncOutcome::Completed(_)) {
        log::debug!("post-login sync finished without effects: {outcome:?}");
    }
    outcome
}
