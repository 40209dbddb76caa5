//! Core library for the WatchShop storefront client.
//!
//! - `auth`: credential store and the process-wide `Session`
//! - `api`: request gateway plus catalog, cart and admin endpoints
//! - `models`: storefront entities and forms
//! - `config`: configuration file and environment
//! - `view`: fetches scoped to a view's lifetime

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;
pub mod view;

pub use api::{ApiClient, ApiError, CatalogQuery};
pub use auth::{CredentialStore, Session, SessionError, SessionState, Token};
pub use config::Config;
