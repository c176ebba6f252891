//! Reactive session state: the signed-in identity plus its resolved role.
//!
//! ARCHITECTURE
//! ============
//! `activate` registers a listener with the auth provider and returns two
//! things: a [`Subscription`] handle and a driver future. The host runs the
//! driver on its single-threaded executor; the driver turns auth events into
//! published [`SessionSnapshot`]s on a `watch` channel.
//!
//! ORDERING
//! ========
//! Role lookups are asynchronous and may finish out of order. Every event
//! takes the next generation number and a result is applied only while its
//! generation is still the latest and the subscription is active. Stale
//! results are dropped, never applied late.

use std::cell::Cell;
use std::rc::Rc;

use futures::channel::{mpsc, oneshot};
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::watch;

use crate::auth::{AuthEvent, AuthProvider, ListenerHandle};
use crate::http::Transport;
use crate::identity::{AuthenticatedUser, Identity};
use crate::role::RoleResolver;

/// Published session state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Signed-in user with role, or `None` when signed out.
    pub user: Option<AuthenticatedUser>,
    /// `true` until the first auth event has been applied.
    pub loading: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn initial() -> Self {
        Self { user: None, loading: true }
    }
}

struct GenerationGuard {
    latest: Cell<u64>,
    active: Cell<bool>,
}

impl GenerationGuard {
    fn new() -> Self {
        Self { latest: Cell::new(0), active: Cell::new(true) }
    }

    fn advance(&self) -> u64 {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        next
    }

    fn is_current(&self, generation: u64) -> bool {
        self.active.get() && self.latest.get() == generation
    }

    fn deactivate(&self) {
        self.active.set(false);
        self.advance();
    }
}

/// Observes the auth provider and publishes [`SessionSnapshot`]s.
pub struct IdentitySession<P, T> {
    provider: Rc<P>,
    resolver: Rc<RoleResolver<T>>,
    state: Rc<watch::Sender<SessionSnapshot>>,
}

impl<P, T> IdentitySession<P, T>
where
    P: AuthProvider + 'static,
    T: Transport + 'static,
{
    pub fn new(provider: Rc<P>, resolver: Rc<RoleResolver<T>>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        Self { provider, resolver, state: Rc::new(state) }
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<AuthenticatedUser> {
        self.state.borrow().user.clone()
    }

    /// Subscribe to the provider. The returned future must be driven for
    /// snapshots to be published; it completes once the subscription stops.
    pub fn activate(&self) -> (Subscription, LocalBoxFuture<'static, ()>) {
        let (event_tx, events) = mpsc::unbounded();
        let listener = self.provider.subscribe(Box::new(move |event| {
            // Send fails only once the driver has stopped.
            let _ = event_tx.unbounded_send(event);
        }));
        let (stop_tx, stop_rx) = oneshot::channel();
        let guard = Rc::new(GenerationGuard::new());

        let driver = drive(
            events,
            stop_rx,
            Rc::clone(&guard),
            Rc::clone(&self.provider),
            Rc::clone(&self.resolver),
            Rc::clone(&self.state),
        )
        .boxed_local();

        (Subscription { listener: Some(listener), stop: Some(stop_tx), guard }, driver)
    }
}

/// Handle for an active session. Stopping (or dropping) it unsubscribes from
/// the provider and guarantees no further snapshot is published.
#[must_use = "dropping the subscription stops the session"]
pub struct Subscription {
    listener: Option<ListenerHandle>,
    stop: Option<oneshot::Sender<()>>,
    guard: Rc<GenerationGuard>,
}

impl Subscription {
    pub fn stop(mut self) {
        self.shutdown();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.active.get()
    }

    fn shutdown(&mut self) {
        if !self.guard.active.get() {
            return;
        }
        self.guard.deactivate();
        if let Some(listener) = self.listener.take() {
            listener.unsubscribe();
        }
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tracing::debug!("identity session deactivated");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn drive<P, T>(
    mut events: mpsc::UnboundedReceiver<AuthEvent>,
    stop: oneshot::Receiver<()>,
    guard: Rc<GenerationGuard>,
    provider: Rc<P>,
    resolver: Rc<RoleResolver<T>>,
    state: Rc<watch::Sender<SessionSnapshot>>,
) where
    P: AuthProvider + 'static,
    T: Transport + 'static,
{
    let mut stop = stop.fuse();
    let mut pending = FuturesUnordered::new();

    loop {
        futures::select_biased! {
            _ = stop => break,
            event = events.next() => match event {
                Some(AuthEvent::SignedIn(identity)) => {
                    let generation = guard.advance();
                    tracing::debug!(uid = %identity.uid, generation, "sign-in observed; resolving role");
                    pending.push(resolve_user(Rc::clone(&provider), Rc::clone(&resolver), identity, generation));
                }
                Some(AuthEvent::SignedOut) => {
                    let generation = guard.advance();
                    tracing::debug!(generation, "sign-out observed");
                    publish(&state, &guard, generation, None);
                }
                None => break,
            },
            (generation, user) = pending.select_next_some() => {
                publish(&state, &guard, generation, Some(user));
            }
            complete => break,
        }
    }
    tracing::debug!(in_flight = pending.len(), "identity session driver stopped");
}

async fn resolve_user<P, T>(
    provider: Rc<P>,
    resolver: Rc<RoleResolver<T>>,
    identity: Identity,
    generation: u64,
) -> (u64, AuthenticatedUser)
where
    P: AuthProvider + 'static,
    T: Transport + 'static,
{
    let role = resolver.resolve_identity_or_default(provider.as_ref(), &identity).await;
    (generation, AuthenticatedUser::new(identity, role))
}

fn publish(
    state: &watch::Sender<SessionSnapshot>,
    guard: &GenerationGuard,
    generation: u64,
    user: Option<AuthenticatedUser>,
) {
    if !guard.is_current(generation) {
        tracing::debug!(generation, latest = guard.latest.get(), "discarding stale auth result");
        return;
    }
    if let Some(user) = &user {
        tracing::info!(uid = %user.identity.uid, role = %user.role, "session user published");
    }
    state.send_replace(SessionSnapshot { user, loading: false });
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
