use super::*;
use crate::auth::LocalAuthProvider;
use crate::error::TransportError;
use crate::identity::Token;
use crate::test_helpers::{GatedTransport, RecordingTransport, identity, role_body, settle};
use std::cell::RefCell;
use tokio::task::{LocalSet, spawn_local};

const ENDPOINT: &str = "https://api.example.test/api/users/me";

// =========================================================================
// RecordingEffects
// =========================================================================

#[derive(Default)]
struct RecordingEffects {
    stored: RefCell<Vec<AuthenticatedUser>>,
    navigations: RefCell<Vec<&'static str>>,
}

impl SyncEffects for RecordingEffects {
    fn store_user(&self, user: AuthenticatedUser) {
        self.stored.borrow_mut().push(user);
    }

    fn navigate(&self, role: Role) {
        self.navigations.borrow_mut().push(default_destination(role));
    }
}

fn synchronizer<T: Transport>(transport: &Rc<T>) -> (SessionSynchronizer<LocalAuthProvider, T>, Rc<LocalAuthProvider>) {
    let provider = Rc::new(LocalAuthProvider::new());
    let resolver = Rc::new(RoleResolver::new(ENDPOINT, Rc::clone(transport)));
    (SessionSynchronizer::new(Rc::clone(&provider), resolver), provider)
}

// =========================================================================
// synchronize
// =========================================================================

#[tokio::test]
async fn no_identity_means_no_effects_and_no_requests() {
    let transport = Rc::new(RecordingTransport::new());
    let (sync, _provider) = synchronizer(&transport);
    let effects = RecordingEffects::default();

    assert_eq!(sync.synchronize(&effects).await, SyncOutcome::NoSession);
    assert!(effects.stored.borrow().is_empty());
    assert!(effects.navigations.borrow().is_empty());
    assert_eq!(transport.request_count(), 0);
    assert!(!sync.is_running());
}

#[tokio::test]
async fn stores_user_and_navigates_by_role() {
    let transport = Rc::new(RecordingTransport::with_responses(vec![Ok(role_body("DEVELOPER"))]));
    let (sync, provider) = synchronizer(&transport);
    provider.sign_in(identity("u1"), Token::new("tok-T"));
    let effects = RecordingEffects::default();

    let expected = AuthenticatedUser::new(identity("u1"), Role::Developer);
    assert_eq!(sync.synchronize(&effects).await, SyncOutcome::Completed(expected.clone()));
    assert_eq!(*effects.stored.borrow(), vec![expected]);
    assert_eq!(*effects.navigations.borrow(), vec!["/editor"]);
}

#[tokio::test]
async fn failed_lookup_stores_guest() {
    let transport = Rc::new(RecordingTransport::with_responses(vec![Err(TransportError::Timeout)]));
    let (sync, provider) = synchronizer(&transport);
    provider.sign_in(identity("u1"), Token::new("tok-T"));
    let effects = RecordingEffects::default();

    sync.synchronize(&effects).await;
    assert_eq!(effects.stored.borrow()[0].role, Role::Guest);
    assert_eq!(*effects.navigations.borrow(), vec!["/"]);
}

#[tokio::test]
async fn sequential_calls_each_run() {
    let transport = Rc::new(RecordingTransport::with_responses(vec![Ok(role_body("ADMIN")), Ok(role_body("ADMIN"))]));
    let (sync, provider) = synchronizer(&transport);
    provider.sign_in(identity("u1"), Token::new("tok-T"));
    let effects = RecordingEffects::default();

    sync.synchronize(&effects).await;
    sync.synchronize(&effects).await;
    assert_eq!(effects.stored.borrow().len(), 2);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn concurrent_duplicate_call_is_rejected() {
    let transport = Rc::new(GatedTransport::new());
    let (sync, provider) = synchronizer(&transport);
    let sync = Rc::new(sync);
    provider.sign_in(identity("u1"), Token::new("tok-T"));
    let effects = Rc::new(RecordingEffects::default());

    LocalSet::new()
        .run_until(async {
            let gate = transport.gate("tok-T");
            let first = spawn_local({
                let sync = Rc::clone(&sync);
                let effects = Rc::clone(&effects);
                async move { sync.synchronize(effects.as_ref()).await }
            });
            settle().await;
            assert!(sync.is_running());

            assert_eq!(sync.synchronize(effects.as_ref()).await, SyncOutcome::AlreadyRunning);
            assert_eq!(transport.request_count(), 1);

            gate.send(role_body("MANAGER")).unwrap();
            let outcome = first.await.unwrap();
            assert_eq!(outcome, SyncOutcome::Completed(AuthenticatedUser::new(identity("u1"), Role::Manager)));
            assert_eq!(*effects.navigations.borrow(), vec!["/manager"]);
            assert!(!sync.is_running());
        })
        .await;
}

#[tokio::test]
async fn identity_change_mid_flight_supersedes_result() {
    let transport = Rc::new(GatedTransport::new());
    let (sync, provider) = synchronizer(&transport);
    let sync = Rc::new(sync);
    provider.sign_in(identity("u1"), Token::new("tok-1"));
    let effects = Rc::new(RecordingEffects::default());

    LocalSet::new()
        .run_until(async {
            let gate = transport.gate("tok-1");
            let first = spawn_local({
                let sync = Rc::clone(&sync);
                let effects = Rc::clone(&effects);
                async move { sync.synchronize(effects.as_ref()).await }
            });
            settle().await;

            provider.sign_in(identity("u2"), Token::new("tok-2"));
            gate.send(role_body("ADMIN")).unwrap();

            assert_eq!(first.await.unwrap(), SyncOutcome::Superseded);
            assert!(effects.stored.borrow().is_empty());
            assert!(effects.navigations.borrow().is_empty());
        })
        .await;
}

#[test]
fn callback_effects_forward_to_closures() {
    let stored = RefCell::new(None);
    let routed = RefCell::new(None);
    let effects = CallbackEffects {
        store_user: |user: AuthenticatedUser| *stored.borrow_mut() = Some(user),
        navigate: |role: Role| *routed.borrow_mut() = Some(default_destination(role)),
    };
    effects.store_user(AuthenticatedUser::new(identity("u1"), Role::Admin));
    effects.navigate(Role::Admin);
    assert_eq!(stored.borrow().as_ref().map(AuthenticatedUser::uid), Some("u1"));
    assert_eq!(*routed.borrow(), Some("/admin"));
}

#[test]
fn default_destination_covers_every_role() {
    let routes: Vec<_> = Role::ALL.into_iter().map(default_destination).collect();
    assert_eq!(routes, vec!["/admin", "/manager", "/editor", "/"]);
}
