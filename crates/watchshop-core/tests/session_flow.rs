use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use watchshop_core::api::{ApiError, ClientSettings, RequestBody};
use watchshop_core::auth::{CredentialStore, MemoryCredentialStore, StoreError};
use watchshop_core::{Session, SessionError, SessionState, Token};

fn open(server: &ServerGuard, store: &Arc<MemoryCredentialStore>) -> Session {
    let settings = ClientSettings::new(server.url());
    Session::new(Arc::clone(store) as Arc<dyn CredentialStore>, &settings)
        .expect("Failed to build session")
}

/// Store whose writes always fail.
struct FailingStore;

impl CredentialStore for FailingStore {
    fn read(&self) -> Option<String> {
        None
    }

    fn write(&self, _token: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn token(raw: &str) -> Token {
    Token::new(raw).expect("non-empty token")
}

/// Token absent, login succeeds: session and store both hold the new token.
#[tokio::test]
async fn test_login_success_persists_token() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/api/auth/token/")
        .match_header("content-type", "application/json")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"username": "alice", "password": "secret"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "abc123", "refresh": "r-1"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let session = open(&server, &store);
    assert_eq!(session.state(), SessionState::Anonymous);

    session.login("alice", "secret").await.expect("login should succeed");

    m.assert_async().await;
    assert_eq!(session.state(), SessionState::Authenticated(token("abc123")));
    assert_eq!(store.read().as_deref(), Some("abc123"));
}

/// Authenticated, logout: store empty and session anonymous, twice over.
#[tokio::test]
async fn test_logout_clears_store_and_state() {
    let server = Server::new_async().await;
    let store = Arc::new(MemoryCredentialStore::with_token("abc123"));
    let session = open(&server, &store);
    assert!(session.is_authenticated());

    session.logout();
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(store.read(), None);

    session.logout();
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(store.read(), None);
}

#[tokio::test]
async fn test_authenticated_call_carries_bearer_token() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/api/cart/carts/my-cart/")
        .match_header("authorization", "Bearer abc123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::with_token("abc123"));
    let session = open(&server, &store);

    let response = session
        .client()
        .call(reqwest::Method::GET, "/api/cart/carts/my-cart/", RequestBody::Empty)
        .await
        .expect("call should succeed");

    m.assert_async().await;
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_anonymous_call_omits_authorization() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/api/watches/")
        .match_header("authorization", Matcher::Missing)
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(r#"{"count": 0, "next": null, "previous": null, "results": []}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let session = open(&server, &store);

    session
        .client()
        .call(reqwest::Method::GET, "/api/watches/", RequestBody::Empty)
        .await
        .expect("public call should succeed");

    m.assert_async().await;
}

/// The header always follows the current token, across login and logout.
#[tokio::test]
async fn test_header_tracks_session_transitions() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/api/auth/token/")
        .with_status(200)
        .with_body(r#"{"access": "fresh"}"#)
        .create_async()
        .await;
    let signed = server
        .mock("GET", "/api/brands/")
        .match_header("authorization", "Bearer fresh")
        .with_status(200)
        .with_body(r#"{"count": 0, "results": []}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let session = open(&server, &store);

    session.login("bob", "pw").await.expect("login");
    session.client().list_brands().await.expect("signed call");
    login.assert_async().await;
    signed.assert_async().await;

    let anonymous = server
        .mock("GET", "/api/brands/")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"count": 0, "results": []}"#)
        .create_async()
        .await;

    session.logout();
    session.client().list_brands().await.expect("anonymous call");
    anonymous.assert_async().await;
}

#[tokio::test]
async fn test_failed_login_keeps_anonymous_state() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/api/auth/token/")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "No active account found with the given credentials"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let session = open(&server, &store);

    let err = session.login("alice", "wrong").await.expect_err("login must fail");
    m.assert_async().await;

    match err {
        SessionError::Authentication(source) => assert!(source.is_unauthorized()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(store.read(), None);
}

#[tokio::test]
async fn test_failed_login_keeps_previous_token() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/api/auth/token/")
        .with_status(401)
        .with_body(r#"{"detail": "bad credentials"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::with_token("old"));
    let session = open(&server, &store);

    assert!(session.login("alice", "wrong").await.is_err());
    m.assert_async().await;

    assert_eq!(session.state(), SessionState::Authenticated(token("old")));
    assert_eq!(store.read().as_deref(), Some("old"));
}

#[tokio::test]
async fn test_login_publishes_authenticated_state() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/token/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "abc123"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let session = open(&server, &store);
    let mut subscription = session.subscribe();
    assert_eq!(subscription.current(), SessionState::Anonymous);

    session.login("alice", "secret").await.expect("login should succeed");

    assert_eq!(
        subscription.changed().await,
        Some(SessionState::Authenticated(token("abc123")))
    );
}

/// Store write fails: login reports it and nothing else changes.
#[tokio::test]
async fn test_login_store_failure_leaves_session_untouched() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/api/auth/token/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "abc123"}"#)
        .create_async()
        .await;

    let settings = ClientSettings::new(server.url());
    let session = Session::new(Arc::new(FailingStore), &settings).expect("Failed to build session");
    let subscription = session.subscribe();

    let err = session.login("alice", "secret").await.expect_err("store write fails");
    m.assert_async().await;

    assert!(matches!(err, SessionError::Storage(StoreError::Io(_))));
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!subscription.has_changed());
}

#[tokio::test]
async fn test_login_with_malformed_payload_fails() {
    let mut server = Server::new_async().await;
    let _missing = server
        .mock("POST", "/api/auth/token/")
        .with_status(200)
        .with_body(r#"{"token": "wrong-field"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let session = open(&server, &store);

    let err = session.login("alice", "secret").await.expect_err("missing access");
    assert!(matches!(
        err,
        SessionError::Authentication(ApiError::InvalidResponse(_))
    ));
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(store.read(), None);
}

#[tokio::test]
async fn test_login_with_empty_access_fails() {
    let mut server = Server::new_async().await;
    let _empty = server
        .mock("POST", "/api/auth/token/")
        .with_status(200)
        .with_body(r#"{"access": ""}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let session = open(&server, &store);

    assert!(session.login("alice", "secret").await.is_err());
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_login_network_failure() {
    // Nothing listens on the discard port
    let settings = ClientSettings::new("http://127.0.0.1:9");
    let store = Arc::new(MemoryCredentialStore::new());
    let session = Session::new(Arc::clone(&store) as Arc<dyn CredentialStore>, &settings)
        .expect("session");

    let err = session.login("alice", "secret").await.expect_err("no server");
    assert!(matches!(err, SessionError::Authentication(ApiError::Network(_))));
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_register_never_changes_session() {
    let mut server = Server::new_async().await;
    let ok = server
        .mock("POST", "/api/auth/register/")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "pw"
        })))
        .with_status(201)
        .with_body(r#"{"id": 5, "username": "carol"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let session = open(&server, &store);

    session
        .register("carol", "carol@example.com", "pw")
        .await
        .expect("register should succeed");
    ok.assert_async().await;
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(store.read(), None);
}

#[tokio::test]
async fn test_register_failure_keeps_token() {
    let mut server = Server::new_async().await;
    let _taken = server
        .mock("POST", "/api/auth/register/")
        .with_status(400)
        .with_body(r#"{"username": ["A user with that username already exists."]}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::with_token("abc123"));
    let session = open(&server, &store);

    let err = session
        .register("carol", "carol@example.com", "pw")
        .await
        .expect_err("duplicate user");
    assert!(matches!(err, SessionError::Registration(_)));
    assert_eq!(session.state(), SessionState::Authenticated(token("abc123")));
    assert_eq!(store.read().as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_unauthorized_response_signs_out() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/api/cart/carts/my-cart/")
        .match_header("authorization", "Bearer expired")
        .with_status(401)
        .with_body(r#"{"detail": "Given token not valid for any token type"}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::with_token("expired"));
    let session = open(&server, &store);
    let mut subscription = session.subscribe();

    let err = session.client().my_cart().await.expect_err("token rejected");
    m.assert_async().await;

    assert!(err.is_unauthorized());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(store.read(), None);
    assert_eq!(subscription.changed().await, Some(SessionState::Anonymous));
}

#[tokio::test]
async fn test_unauthorized_kept_when_policy_disabled() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/api/cart/carts/my-cart/")
        .with_status(401)
        .create_async()
        .await;

    let mut settings = ClientSettings::new(server.url());
    settings.logout_on_unauthorized = false;
    let store = Arc::new(MemoryCredentialStore::with_token("abc123"));
    let session = Session::new(Arc::clone(&store) as Arc<dyn CredentialStore>, &settings)
        .expect("session");

    let err = session.client().my_cart().await.expect_err("rejected");
    assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    assert!(session.is_authenticated());
    assert_eq!(store.read().as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_forbidden_does_not_sign_out() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("DELETE", "/api/watches/3/")
        .with_status(403)
        .with_body(r#"{"detail": "You do not have permission to perform this action."}"#)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::with_token("abc123"));
    let session = open(&server, &store);

    let err = session.client().delete_watch(3).await.expect_err("forbidden");
    assert_eq!(err.status(), Some(reqwest::StatusCode::FORBIDDEN));
    assert!(err.to_string().contains("permission"));
    assert!(session.is_authenticated());
}
