//! `/wishlist` endpoints.

use tracing::instrument;

use vastraverse_core::{ProductId, WishlistItemId};

use super::{Ack, AddToWishlist, ApiClient, ApiError, ApiResponse, WishlistItem};

impl ApiClient {
    /// `GET /wishlist`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn wishlist(&self) -> Result<ApiResponse<Vec<WishlistItem>>, ApiError> {
        self.get(self.url(&["wishlist"])?).await
    }

    /// `POST /wishlist`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(&self, product_id: ProductId) -> Result<Ack, ApiError> {
        self.post(self.url(&["wishlist"])?, &AddToWishlist { product_id })
            .await
    }

    /// `DELETE /wishlist/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_from_wishlist(&self, item_id: WishlistItemId) -> Result<Ack, ApiError> {
        self.delete(self.url(&["wishlist", &item_id.to_string()])?)
            .await
    }

    /// `DELETE /wishlist/product/:product_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product_from_wishlist(
        &self,
        product_id: ProductId,
    ) -> Result<Ack, ApiError> {
        self.delete(self.url(&["wishlist", "product", &product_id.to_string()])?)
            .await
    }
}
