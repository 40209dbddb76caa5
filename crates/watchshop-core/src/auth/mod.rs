//! Authentication module for managing the session and its stored token.
//!
//! This module provides:
//! - `Session`: process-wide token holder with login, register and logout
//! - `CredentialStore`: durable single-slot token storage (file, keychain, memory)
//!
//! Every transition of the session is published to subscribers.

pub mod credentials;
pub mod session;

pub use credentials::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore,
    StoreError, TOKEN_SLOT,
};
pub use session::{Session, SessionError, SessionState, SessionSubscription, Token};
