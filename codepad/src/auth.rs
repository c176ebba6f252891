//! Auth-provider seam: identity lookup, fresh tokens, and the event stream.
//!
//! SYSTEM CONTEXT
//! ==============
//! The hosted identity provider owns sign-in. This crate only observes it:
//! `IdentitySession` listens for [`AuthEvent`]s and the gateway asks for a
//! fresh [`Token`] before each authenticated request.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::identity::{Identity, Token};

/// A change in the provider's signed-in state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Identity),
    SignedOut,
}

/// Callback registered with [`AuthProvider::subscribe`].
pub type AuthListener = Box<dyn Fn(AuthEvent)>;

/// Keeps a listener registered until dropped or explicitly unsubscribed.
#[must_use = "dropping the handle unsubscribes the listener"]
pub struct ListenerHandle {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl ListenerHandle {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self { unsubscribe: Some(Box::new(unsubscribe)) }
    }

    /// Handle for providers that never deliver events after subscription.
    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }

    pub fn unsubscribe(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.run();
    }
}

/// The external authentication provider.
#[async_trait(?Send)]
pub trait AuthProvider {
    /// The currently signed-in identity, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Mint a fresh bearer token for `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if `identity` is no longer signed in or the
    /// provider cannot produce a token.
    async fn id_token(&self, identity: &Identity) -> Result<Token, AuthError>;

    /// Register `listener` for auth state changes. Implementations deliver the
    /// current state to the new listener before returning.
    fn subscribe(&self, listener: AuthListener) -> ListenerHandle;
}

/// Fresh token for whoever is signed in right now.
///
/// # Errors
///
/// Returns [`AuthError::SignedOut`] when no identity is present, or the
/// provider's error when the token cannot be minted.
pub async fn current_token<P: AuthProvider + ?Sized>(provider: &P) -> Result<Token, AuthError> {
    let identity = provider.current_identity().ok_or(AuthError::SignedOut)?;
    provider.id_token(&identity).await
}

// =============================================================================
// LOCAL PROVIDER
// =============================================================================

#[derive(Default)]
struct LocalAuthInner {
    current: Option<(Identity, Token)>,
    listeners: Vec<(u64, Rc<dyn Fn(AuthEvent)>)>,
    next_listener_id: u64,
}

/// Host-driven provider: the embedding page (or CLI) pushes sign-in state in.
///
/// Cloning shares the same underlying state.
#[derive(Clone, Default)]
pub struct LocalAuthProvider {
    inner: Rc<RefCell<LocalAuthInner>>,
}

impl LocalAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sign-in and notify listeners.
    pub fn sign_in(&self, identity: Identity, token: Token) {
        self.inner.borrow_mut().current = Some((identity.clone(), token));
        self.emit(&AuthEvent::SignedIn(identity));
    }

    /// Clear the session and notify listeners.
    pub fn sign_out(&self) {
        self.inner.borrow_mut().current = None;
        self.emit(&AuthEvent::SignedOut);
    }

    /// Replace the token of the current session without emitting an event.
    /// Returns `false` when nobody is signed in.
    pub fn refresh_token(&self, token: Token) -> bool {
        match self.inner.borrow_mut().current.as_mut() {
            Some((_, current)) => {
                *current = token;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn current_event(&self) -> AuthEvent {
        match &self.inner.borrow().current {
            Some((identity, _)) => AuthEvent::SignedIn(identity.clone()),
            None => AuthEvent::SignedOut,
        }
    }

    fn emit(&self, event: &AuthEvent) {
        // Listeners may call back into the provider.
        let listeners: Vec<_> = self.inner.borrow().listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(event.clone());
        }
    }
}

#[async_trait(?Send)]
impl AuthProvider for LocalAuthProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.inner.borrow().current.as_ref().map(|(identity, _)| identity.clone())
    }

    async fn id_token(&self, identity: &Identity) -> Result<Token, AuthError> {
        match &self.inner.borrow().current {
            Some((current, token)) if current.uid == identity.uid => Ok(token.clone()),
            Some(_) => Err(AuthError::IdentityChanged { uid: identity.uid.clone() }),
            None => Err(AuthError::SignedOut),
        }
    }

    fn subscribe(&self, listener: AuthListener) -> ListenerHandle {
        let listener: Rc<dyn Fn(AuthEvent)> = Rc::from(listener);
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, Rc::clone(&listener)));
            id
        };
        listener(self.current_event());

        let weak = Rc::downgrade(&self.inner);
        ListenerHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
