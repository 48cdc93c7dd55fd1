//! `/cart` endpoints.
//!
//! Mutations answer with an acknowledgement only; callers re-read the cart
//! with [`ApiClient::cart`] to learn the new state.

use tracing::instrument;

use vastraverse_core::{CartItemId, ProductId};

use super::{Ack, AddToCart, ApiClient, ApiError, ApiResponse, CartSummary, UpdateQuantity};

impl ApiClient {
    /// `GET /cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<ApiResponse<CartSummary>, ApiError> {
        self.get(self.url(&["cart"])?).await
    }

    /// `POST /cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<Ack, ApiError> {
        let body = AddToCart {
            product_id,
            quantity,
        };
        self.post(self.url(&["cart"])?, &body).await
    }

    /// `PUT /cart/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_cart_item(
        &self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Ack, ApiError> {
        let url = self.url(&["cart", &item_id.to_string()])?;
        self.put(url, &UpdateQuantity { quantity }).await
    }

    /// `DELETE /cart/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_cart_item(&self, item_id: CartItemId) -> Result<Ack, ApiError> {
        self.delete(self.url(&["cart", &item_id.to_string()])?).await
    }

    /// `DELETE /cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Ack, ApiError> {
        self.delete(self.url(&["cart"])?).await
    }
}
