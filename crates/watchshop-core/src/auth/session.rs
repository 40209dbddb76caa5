//! Process-wide authentication state.
//!
//! `Session` is the single source of truth for the bearer token. It is
//! seeded from the credential store at startup, mutated only by `login`
//! and `logout`, and broadcasts every transition over a `watch` channel.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, ApiRequest, ClientSettings};

use super::credentials::{CredentialStore, StoreError};

const AUTH_TOKEN_PATH: &str = "/api/auth/token/";
const AUTH_REGISTER_PATH: &str = "/api/auth/register/";

// ============================================================================
// Token and state
// ============================================================================

/// Opaque bearer credential. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token string. Returns `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Token),
}

impl SessionState {
    fn from_stored(raw: Option<String>) -> Self {
        match raw.and_then(Token::new) {
            Some(token) => SessionState::Authenticated(token),
            None => SessionState::Anonymous,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            SessionState::Authenticated(token) => Some(token),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Authentication failed")]
    Authentication(#[source] ApiError),

    #[error("Registration failed")]
    Registration(#[source] ApiError),

    #[error("Failed to save credentials")]
    Storage(#[source] StoreError),
}

// ============================================================================
// Shared state
// ============================================================================

/// State shared between the session facade and the API gateway.
pub(crate) struct SessionShared {
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionState>,
    /// Serializes store writes with state publication.
    write_lock: Mutex<()>,
}

impl SessionShared {
    pub(crate) fn new(store: Arc<dyn CredentialStore>) -> Self {
        let initial = SessionState::from_stored(store.read());
        let (state, _) = watch::channel(initial);
        Self {
            store,
            state,
            write_lock: Mutex::new(()),
        }
    }

    pub(crate) fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub(crate) fn token(&self) -> Option<Token> {
        self.state.borrow().token().cloned()
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Persist a new token and publish it. On a store failure nothing changes.
    fn replace(&self, token: Token) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.store.write(token.as_str())?;
        self.publish(SessionState::Authenticated(token));
        Ok(())
    }

    /// Drop the token unconditionally.
    fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.clear_locked();
    }

    /// Drop the token only if it is still `rejected`. Returns whether the
    /// session was signed out.
    pub(crate) fn expire(&self, rejected: &Token) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.state.borrow().token() != Some(rejected) {
            return false;
        }
        self.clear_locked();
        true
    }

    fn clear_locked(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to remove stored token");
        }
        self.publish(SessionState::Anonymous);
    }

    fn publish(&self, next: SessionState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}

// ============================================================================
// Session facade
// ============================================================================

/// Receives every session transition.
pub struct SessionSubscription {
    rx: watch::Receiver<SessionState>,
}

impl SessionSubscription {
    /// State as of the last observed change.
    pub fn current(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Whether a transition happened that `changed` has not returned yet.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next transition. Returns `None` once the session is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: String,
}

/// Authentication state plus the gateway bound to it.
/// Clone is cheap; all clones share one state.
#[derive(Clone)]
pub struct Session {
    shared: Arc<SessionShared>,
    client: ApiClient,
}

impl Session {
    /// Restore the session from `store` and build a gateway bound to it.
    pub fn new(store: Arc<dyn CredentialStore>, settings: &ClientSettings) -> Result<Self, ApiError> {
        let shared = Arc::new(SessionShared::new(store));
        let client = ApiClient::new(settings, Arc::clone(&shared))?;
        Ok(Self { shared, client })
    }

    /// Gateway that signs requests with this session's token.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn state(&self) -> SessionState {
        self.shared.current()
    }

    pub fn token(&self) -> Option<Token> {
        self.shared.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.shared.current().is_authenticated()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.shared.subscribe(),
        }
    }

    /// Exchange credentials for a token and persist it.
    /// On failure the previous state is kept as-is.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let request = ApiRequest::post(AUTH_TOKEN_PATH)
            .json(&LoginRequest { username, password })
            .map_err(SessionError::Authentication)?
            .anonymous();

        let response: TokenResponse = self
            .client
            .fetch_json(request)
            .await
            .map_err(SessionError::Authentication)?;

        let token = Token::new(response.access).ok_or_else(|| {
            SessionError::Authentication(ApiError::InvalidResponse(
                "empty access token".to_string(),
            ))
        })?;

        self.shared.replace(token).map_err(SessionError::Storage)?;
        info!(username = username, "Signed in");
        Ok(())
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), SessionError> {
        let request = ApiRequest::post(AUTH_REGISTER_PATH)
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .map_err(SessionError::Registration)?
            .anonymous();

        self.client
            .send(request)
            .await
            .map_err(SessionError::Registration)?;
        info!(username = username, "Registered account");
        Ok(())
    }

    /// Forget the token. Always succeeds.
    pub fn logout(&self) {
        self.shared.clear();
        info!("Signed out");
    }
}
