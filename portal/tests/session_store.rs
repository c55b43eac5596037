//! Integration tests for the session store running on the Store runtime.
//!
//! These drive the full initialize → login → logout lifecycle with zero
//! delays and an in-memory storage, asserting both on store state and on
//! what actually landed in durable storage.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can unwrap

use marquee_core::environment::{KeyValueStorage, USER_KEY};
use marquee_portal::session::{
    Identity, SessionAction, SessionEnvironment, SessionError, SessionReducer, SessionState,
};
use marquee_runtime::Store;
use marquee_testing::{MemoryStorage, test_clock, test_ids, test_storage};
use std::sync::Arc;
use std::time::Duration;

type SessionStore = Store<SessionState, SessionAction, SessionEnvironment, SessionReducer>;

fn store_over(storage: MemoryStorage) -> SessionStore {
    let env = SessionEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(test_ids(1)),
        Arc::new(storage),
    )
    .with_delays(Duration::ZERO, Duration::ZERO);
    Store::new(SessionState::new(), SessionReducer::new(), env)
}

async fn drive(store: &SessionStore, action: SessionAction) {
    let mut handle = store.send(action).await.expect("store accepts actions");
    handle.wait().await;
}

#[tokio::test]
async fn initialize_becomes_ready_without_an_identity() {
    let store = store_over(test_storage());
    drive(&store, SessionAction::Initialize).await;

    assert!(store.state(SessionState::is_ready).await);
    assert!(!store.state(SessionState::is_authenticated).await);
}

#[tokio::test]
async fn initialize_restores_a_persisted_identity() {
    use marquee_core::environment::Clock;

    let storage = test_storage();
    let identity = Identity::new(9, "jane@site.com", test_clock().now());
    let json = serde_json::to_string(&identity).unwrap();
    storage.set(USER_KEY, &json).unwrap();

    let store = store_over(storage);
    drive(&store, SessionAction::Initialize).await;

    assert!(store.state(SessionState::is_authenticated).await);
    let email = store
        .state(|s| s.identity.as_ref().map(|i| i.email.clone()))
        .await;
    assert_eq!(email.as_deref(), Some("jane@site.com"));
}

#[tokio::test]
async fn initialize_with_malformed_identity_degrades_to_logged_out() {
    let storage = test_storage();
    storage.set(USER_KEY, "{definitely not json").unwrap();

    let store = store_over(storage);
    drive(&store, SessionAction::Initialize).await;

    assert!(store.state(SessionState::is_ready).await);
    assert!(!store.state(SessionState::is_authenticated).await);
}

#[tokio::test]
async fn initialize_twice_keeps_the_first_restore() {
    let store = store_over(test_storage());
    drive(&store, SessionAction::Initialize).await;
    drive(
        &store,
        SessionAction::Login {
            email: "jane@site.com".to_string(),
            password: "secret".to_string(),
        },
    )
    .await;

    // A second initialize must not reset the session
    drive(&store, SessionAction::Initialize).await;

    assert!(store.state(SessionState::is_authenticated).await);
}

#[tokio::test]
async fn login_persists_a_camel_case_identity() {
    let storage = test_storage();
    let store = store_over(storage.clone());
    drive(&store, SessionAction::Initialize).await;

    let result = store
        .send_and_wait_for(
            SessionAction::Login {
                email: "A@Admin.io".to_string(),
                password: "x".to_string(),
            },
            |a| matches!(a, SessionAction::LoggedIn { .. }),
            Duration::from_secs(1),
        )
        .await;
    assert!(result.is_ok());

    assert!(store.state(SessionState::is_admin).await);

    let stored = storage.value(USER_KEY).expect("identity was persisted");
    assert!(stored.contains("\"isAdmin\":true"));
    assert!(stored.contains("\"email\":\"A@Admin.io\""));
}

#[tokio::test]
async fn admin_flag_follows_the_email_rule() {
    let store = store_over(test_storage());
    drive(&store, SessionAction::Initialize).await;

    drive(
        &store,
        SessionAction::Login {
            email: "A@Admin.io".to_string(),
            password: "x".to_string(),
        },
    )
    .await;
    assert!(store.state(SessionState::is_admin).await);

    drive(
        &store,
        SessionAction::Login {
            email: "guest@site.com".to_string(),
            password: "x".to_string(),
        },
    )
    .await;
    assert!(store.state(SessionState::is_authenticated).await);
    assert!(!store.state(SessionState::is_admin).await);
}

#[tokio::test]
async fn logout_removes_the_persisted_identity_and_is_idempotent() {
    let storage = test_storage();
    let store = store_over(storage.clone());
    drive(&store, SessionAction::Initialize).await;
    drive(
        &store,
        SessionAction::Login {
            email: "jane@site.com".to_string(),
            password: "x".to_string(),
        },
    )
    .await;
    assert!(storage.value(USER_KEY).is_some());

    drive(&store, SessionAction::Logout).await;
    assert!(!store.state(SessionState::is_authenticated).await);
    assert!(storage.value(USER_KEY).is_none());

    // Logging out again is a no-op, not an error
    drive(&store, SessionAction::Logout).await;
    assert!(!store.state(SessionState::is_authenticated).await);
    assert!(store.state(|s| s.last_error.is_none()).await);
}

#[tokio::test]
async fn login_before_initialize_fails_not_ready() {
    let store = store_over(test_storage());
    drive(
        &store,
        SessionAction::Login {
            email: "jane@site.com".to_string(),
            password: "x".to_string(),
        },
    )
    .await;

    let error = store.state(|s| s.last_error.clone()).await;
    assert_eq!(error, Some(SessionError::NotReady));
    assert!(!store.state(SessionState::is_authenticated).await);
}

#[tokio::test]
async fn observers_see_the_restore_notification() {
    let store = store_over(test_storage());
    let mut rx = store.subscribe_actions();

    drive(&store, SessionAction::Initialize).await;

    let observed = rx.recv().await;
    assert!(matches!(
        observed,
        Ok(SessionAction::RestoreCompleted { identity: None })
    ));
}

#[tokio::test]
async fn a_second_store_over_the_same_storage_sees_the_login() {
    let storage = test_storage();
    let store = store_over(storage.clone());
    drive(&store, SessionAction::Initialize).await;
    drive(
        &store,
        SessionAction::Login {
            email: "jane@site.com".to_string(),
            password: "x".to_string(),
        },
    )
    .await;

    // A fresh store over the same storage models the next visit
    let next_visit = store_over(storage);
    drive(&next_visit, SessionAction::Initialize).await;

    assert!(next_visit.state(SessionState::is_authenticated).await);
    let name = next_visit
        .state(|s| s.identity.as_ref().map(|i| i.name.clone()))
        .await;
    assert_eq!(name.as_deref(), Some("jane"));
}
