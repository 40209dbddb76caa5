//! REST API gateway for the WatchShop backend.
//!
//! This module provides the `ApiClient` that signs requests with the
//! session's bearer token, plus the catalog, cart and admin endpoints
//! built on top of it.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod client;
pub mod error;

pub use catalog::{CatalogQuery, HomeShelves};
pub use client::{ApiClient, ApiRequest, ClientSettings, RequestBody, DEFAULT_TIMEOUT_SECS};
pub use error::ApiError;
