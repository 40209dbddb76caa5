//! Data models for storefront entities.
//!
//! - `Watch`, `Brand`, `Page`: catalog listings
//! - `Cart`, `CartItem`: the signed in user's cart
//! - `WatchForm`: admin edit form with multipart encoding
//! - `CheckoutDetails`: delivery details collected at checkout

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod watch;

pub use admin::{ImageUpload, WatchForm, MAX_IMAGE_BYTES};
pub use cart::{Cart, CartItem, CartWatch};
pub use checkout::CheckoutDetails;
pub use watch::{total_pages, Brand, Page, Watch, WatchType, PAGE_SIZE};
