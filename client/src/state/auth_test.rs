use super::*;
use codepad::Identity;

fn user(role: Role) -> AuthenticatedUser {
    AuthenticatedUser::new(Identity::new("u1", Some("u1@example.com".to_owned()), "password"), role)
}

#[test]
fn initial_state_is_loading_without_user() {
    let state = AuthState::initial();
    assert!(state.loading);
    assert!(state.user.is_none());
}

#[test]
fn from_snapshot_copies_user_and_loading() {
    let snapshot = SessionSnapshot { user: Some(user(Role::Manager)), loading: false };
    let state = AuthState::from(snapshot);
    assert!(!state.loading);
    assert_eq!(state.role(), Some(Role::Manager));
}

#[test]
fn role_is_none_when_signed_out() {
    let state = AuthState { user: None, loading: false };
    assert_eq!(state.role(), None);
}

#[test]
fn signed_in_is_settled() {
    let state = AuthState::signed_in(user(Role::Guest));
    assert!(!state.loading);
    assert_eq!(state.user.as_ref().map(AuthenticatedUser::uid), Some("u1"));
}
