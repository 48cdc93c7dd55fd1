//! Order placement and history.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use vastraverse_core::OrderId;

use super::CartStore;
use super::failure_message;
use crate::api::{ApiClient, ApiError, NewOrder, NewOrderItem, Order};
use crate::error::add_breadcrumb;
use crate::ui::{Notification, Notifier};

/// Errors surfaced by [`Checkout`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No active session. Nothing was sent.
    #[error("Please login to place an order")]
    LoginRequired,

    /// The cart snapshot has no lines.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The shipping address was blank.
    #[error("Please enter a shipping address")]
    MissingAddress,

    /// The backend call failed or was refused.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Places orders from the current cart.
pub struct Checkout {
    api: ApiClient,
    cart: Arc<CartStore>,
    notifier: Arc<dyn Notifier>,
}

impl Checkout {
    #[must_use]
    pub fn new(api: ApiClient, cart: Arc<CartStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            cart,
            notifier,
        }
    }

    /// Order everything in the cart.
    ///
    /// Lines are taken from the cart holder's current snapshot. On success
    /// the cart is re-read, since the backend empties it.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired`, `EmptyCart` or `MissingAddress` without any
    /// network call, or `CheckoutError::Api` if the backend refuses.
    #[instrument(skip(self, shipping_address))]
    pub async fn place_order(&self, shipping_address: &str) -> Result<Order, CheckoutError> {
        let order = match self.prepare(shipping_address) {
            Ok(order) => order,
            Err(e) => {
                self.notifier.notify(Notification::error(e.to_string()));
                return Err(e);
            }
        };

        add_breadcrumb("checkout", "Place order", None);
        let placed = match self
            .api
            .create_order(&order)
            .await
            .and_then(crate::api::ApiResponse::into_data)
        {
            Ok(placed) => placed,
            Err(e) => {
                warn!(error = %e, "Order placement failed");
                self.notifier.notify(Notification::error(failure_message(
                    &e,
                    "Failed to place order",
                )));
                return Err(e.into());
            }
        };

        info!(order_id = %placed.id, total = %placed.total_amount, "Order placed");
        if let Err(e) = self.cart.refresh().await {
            debug!(error = %e, "Cart re-read after order failed");
        }
        self.notifier
            .notify(Notification::success("Order placed successfully!"));
        Ok(placed)
    }

    fn prepare(&self, shipping_address: &str) -> Result<NewOrder, CheckoutError> {
        if !self.api.session().is_active() {
            return Err(CheckoutError::LoginRequired);
        }

        let items: Vec<NewOrderItem> = self.cart.items().iter().map(NewOrderItem::from).collect();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(CheckoutError::MissingAddress);
        }

        Ok(NewOrder {
            shipping_address: shipping_address.to_owned(),
            items,
        })
    }

    /// The shopper's past orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, CheckoutError> {
        if !self.api.session().is_active() {
            return Err(CheckoutError::LoginRequired);
        }
        Ok(self.api.orders().await?.into_data()?)
    }

    /// One past order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId) -> Result<Order, CheckoutError> {
        if !self.api.session().is_active() {
            return Err(CheckoutError::LoginRequired);
        }
        Ok(self.api.order(id).await?.into_data()?)
    }
}
