//! Utility functions for price parsing and text formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_price, format_rubles, is_valid_price, parse_price_cents, truncate_string};
