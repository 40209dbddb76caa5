use serde::{Deserialize, Serialize};

use crate::utils::parse_price_cents;

/// Watch summary embedded in a cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartWatch {
    pub id: i64,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: i64,
    pub watch: CartWatch,
    pub quantity: u32,
    pub total_price: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of line totals in cents. Unparseable totals count as zero.
    pub fn total_cents(&self) -> i64 {
        self.items
            .iter()
            .filter_map(|item| parse_price_cents(&item.total_price))
            .sum()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddItemRequest {
    pub watch_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateItemRequest {
    pub item_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveItemRequest {
    pub item_id: i64,
}
