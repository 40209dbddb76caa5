//! Cart endpoints. All of them need a signed in session.
//!
//! Mutations don't return the updated cart; callers refetch with
//! `my_cart` after the mutation completes.

use crate::models::cart::{AddItemRequest, RemoveItemRequest, UpdateItemRequest};
use crate::models::Cart;

use super::{ApiClient, ApiError, ApiRequest};

const MY_CART_PATH: &str = "/api/cart/carts/my-cart/";
const ADD_ITEM_PATH: &str = "/api/cart/carts/add-item/";
const UPDATE_ITEM_PATH: &str = "/api/cart/carts/update-item/";
const REMOVE_ITEM_PATH: &str = "/api/cart/carts/remove-item/";

impl ApiClient {
    pub async fn my_cart(&self) -> Result<Cart, ApiError> {
        self.require_auth()?;
        self.get_json(MY_CART_PATH).await
    }

    pub async fn add_to_cart(&self, watch_id: i64, quantity: u32) -> Result<(), ApiError> {
        self.require_auth()?;
        if quantity == 0 {
            return Err(ApiError::Validation("Quantity must be at least 1".to_string()));
        }
        let request = ApiRequest::post(ADD_ITEM_PATH).json(&AddItemRequest { watch_id, quantity })?;
        self.send(request).await
    }

    pub async fn update_cart_item(&self, item_id: i64, quantity: u32) -> Result<(), ApiError> {
        self.require_auth()?;
        if quantity == 0 {
            return Err(ApiError::Validation(
                "Quantity must be at least 1, remove the item instead".to_string(),
            ));
        }
        let request = ApiRequest::post(UPDATE_ITEM_PATH).json(&UpdateItemRequest { item_id, quantity })?;
        self.send(request).await
    }

    pub async fn remove_cart_item(&self, item_id: i64) -> Result<(), ApiError> {
        self.require_auth()?;
        let request = ApiRequest::delete(REMOVE_ITEM_PATH).json(&RemoveItemRequest { item_id })?;
        self.send(request).await
    }
}
