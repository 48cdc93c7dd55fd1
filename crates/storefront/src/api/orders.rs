//! `/orders` endpoints.

use tracing::instrument;

use vastraverse_core::OrderId;

use super::{ApiClient, ApiError, ApiResponse, NewOrder, Order};

impl ApiClient {
    /// `GET /orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<ApiResponse<Vec<Order>>, ApiError> {
        self.get(self.url(&["orders"])?).await
    }

    /// `GET /orders/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId) -> Result<ApiResponse<Order>, ApiError> {
        self.get(self.url(&["orders", &id.to_string()])?).await
    }

    /// `POST /orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, order), fields(lines = order.items.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<ApiResponse<Order>, ApiError> {
        self.post(self.url(&["orders"])?, order).await
    }
}
