//! Delivery details collected at checkout.

use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Maximum digits in a phone number.
const MAX_PHONE_DIGITS: usize = 15;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckoutDetails {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl CheckoutDetails {
    pub fn validate(&self) -> Result<(), ApiError> {
        let fields = [
            ("full name", &self.full_name),
            ("phone", &self.phone),
            ("email", &self.email),
            ("delivery address", &self.address),
        ];
        if let Some((label, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ApiError::Validation(format!("The {} is required", label)));
        }
        if !is_valid_phone(&self.phone) {
            return Err(ApiError::Validation(
                "Phone must be digits with an optional leading +".to_string(),
            ));
        }
        if !is_plausible_email(&self.email) {
            return Err(ApiError::Validation("Email address is invalid".to_string()));
        }
        Ok(())
    }
}

/// Optional leading `+`, then at most 15 digits.
fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    digits.len() <= MAX_PHONE_DIGITS && digits.chars().all(|c| c.is_ascii_digit())
}

/// `local@domain` with both parts non-empty. Dotless domains are allowed.
fn is_plausible_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}
