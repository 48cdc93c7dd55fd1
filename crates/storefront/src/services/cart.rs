//! Cart state holder.
//!
//! Holds the one materialized view of the server's cart. Mutations are
//! submitted, then the whole cart is re-read; nothing is patched locally.
//! A failed mutation leaves the previous snapshot in place and surfaces the
//! backend's message.
//!
//! ```text
//! Unauthenticated ──login──▶ Loading ──▶ Ready ──mutation──▶ Loading ──▶ Ready
//!        ▲                                                             │
//!        └──────────────────────────── logout / 401 ──────────────────┘
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use vastraverse_core::{CartItemId, Price, ProductId};

use super::{BusyGuard, failure_message};
use crate::api::{Ack, ApiClient, ApiError, ApiResponse, CartItem, CartSummary};
use crate::error::add_breadcrumb;
use crate::ui::{Notification, Notifier};

const LOGIN_REQUIRED: &str = "Please login to add items to cart";

/// Errors surfaced by [`CartStore`] operations.
///
/// Every error has already been shown to the shopper through the notifier
/// by the time it is returned.
#[derive(Debug, Error)]
pub enum CartError {
    /// No active session. Nothing was sent.
    #[error("Please login to add items to cart")]
    LoginRequired,

    /// Quantities must be positive.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The backend call failed or was refused.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The cart snapshot lock was poisoned.
    #[error("cart state lock poisoned")]
    Poisoned,
}

/// Lifecycle of the cart snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CartPhase {
    /// No session; the snapshot is empty.
    #[default]
    Unauthenticated,
    /// A read or write is in flight.
    Loading,
    /// The snapshot reflects the last successful read.
    Ready,
}

#[derive(Debug, Default)]
struct CartState {
    phase: CartPhase,
    summary: CartSummary,
}

/// Cart state holder.
pub struct CartStore {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    state: RwLock<CartState>,
    in_flight: AtomicUsize,
}

impl CartStore {
    /// Create an empty, unauthenticated cart.
    #[must_use]
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: RwLock::new(CartState::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Follow the session: refresh on login, reset on logout.
    ///
    /// Handles the current session state immediately, so a restored session
    /// is fetched right away. The task runs until aborted.
    pub fn bind_session(self: &Arc<Self>) -> JoinHandle<()> {
        let cart = Arc::clone(self);
        let mut sessions = self.api.session().subscribe();

        tokio::spawn(async move {
            loop {
                let active = sessions.borrow_and_update().is_some();
                if active {
                    if let Err(e) = cart.refresh().await {
                        debug!(error = %e, "Cart refresh after session change failed");
                    }
                } else {
                    cart.reset();
                }

                if sessions.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Current cart lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.snapshot(|s| s.summary.items.clone())
    }

    /// Server-computed cart total.
    #[must_use]
    pub fn total(&self) -> Price {
        self.snapshot(|s| s.summary.total)
    }

    /// Server-computed number of units.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.snapshot(|s| s.summary.count)
    }

    /// Full snapshot of the cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.snapshot(|s| s.summary.clone())
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> CartPhase {
        self.snapshot(|s| s.phase)
    }

    /// Read the snapshot. Without an active session the cart is empty and
    /// unauthenticated, whatever was held before the session ended.
    fn snapshot<T: Default>(&self, f: impl FnOnce(&CartState) -> T) -> T {
        if !self.api.session().is_active() {
            return T::default();
        }
        self.state.read().map(|s| f(&s)).unwrap_or_default()
    }

    /// Whether any operation is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Discard the snapshot and return to the unauthenticated phase.
    pub fn reset(&self) {
        if let Ok(mut state) = self.state.write() {
            *state = CartState::default();
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Re-read the cart from the backend and replace the snapshot.
    ///
    /// Without an active session the snapshot is discarded and nothing is
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the read fails. The previous snapshot is
    /// kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), CartError> {
        if !self.api.session().is_active() {
            self.reset();
            return Ok(());
        }
        let _busy = BusyGuard::enter(&self.in_flight);
        self.reload().await
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LoginRequired` without any network call if nobody
    /// is signed in, or `CartError::Api` if the backend refuses.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if !self.api.session().is_active() {
            self.notifier.notify(Notification::error(LOGIN_REQUIRED));
            return Err(CartError::LoginRequired);
        }
        if quantity == 0 {
            return Err(self.invalid_quantity());
        }

        add_breadcrumb(
            "cart",
            "Add to cart",
            Some(&[
                ("product_id", product_id.to_string().as_str()),
                ("quantity", quantity.to_string().as_str()),
            ]),
        );
        self.submit(
            self.api.add_to_cart(product_id, quantity),
            "Item added to cart!",
            "Failed to add item to cart",
        )
        .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the backend refuses (for example
    /// "Insufficient stock"). The previous snapshot is kept.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_quantity(
        &self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(self.invalid_quantity());
        }

        self.submit(
            self.api.update_cart_item(item_id, quantity),
            "Cart updated",
            "Failed to update quantity",
        )
        .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the backend refuses.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove(&self, item_id: CartItemId) -> Result<(), CartError> {
        self.submit(
            self.api.remove_cart_item(item_id),
            "Item removed from cart",
            "Failed to remove item",
        )
        .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the backend refuses.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        self.submit(self.api.clear_cart(), "Cart cleared", "Failed to clear cart")
            .await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Await a mutation, then re-read the cart if it succeeded.
    async fn submit(
        &self,
        request: impl Future<Output = Result<Ack, ApiError>>,
        success: &str,
        failure: &str,
    ) -> Result<(), CartError> {
        let _busy = BusyGuard::enter(&self.in_flight);
        let previous = self.enter_loading()?;

        if let Err(e) = request.await.and_then(ApiResponse::into_ack) {
            if e.is_unauthorized() {
                self.reset();
            } else {
                self.restore_phase(previous);
            }
            warn!(error = %e, "Cart mutation failed");
            self.notifier.notify(Notification::error(failure_message(&e, failure)));
            return Err(e.into());
        }

        // The mutation is committed server-side; a failed re-read is
        // reported on its own and does not undo it.
        if let Err(e) = self.reload().await {
            debug!(error = %e, "Cart re-read after mutation failed");
        }
        self.notifier.notify(Notification::success(success));
        Ok(())
    }

    /// Fetch the cart and swap the snapshot in one step.
    async fn reload(&self) -> Result<(), CartError> {
        let previous = self.enter_loading()?;

        match self.api.cart().await.and_then(ApiResponse::into_data) {
            Ok(summary) => {
                let mut state = self.state.write().map_err(|_| CartError::Poisoned)?;
                if self.api.session().is_active() {
                    info!(count = summary.count, total = %summary.total, "Cart refreshed");
                    state.summary = summary;
                    state.phase = CartPhase::Ready;
                } else {
                    *state = CartState::default();
                }
                Ok(())
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.reset();
                } else {
                    self.restore_phase(previous);
                }
                warn!(error = %e, "Failed to load cart");
                self.notifier.notify(Notification::error("Failed to load cart"));
                Err(e.into())
            }
        }
    }

    fn enter_loading(&self) -> Result<CartPhase, CartError> {
        let mut state = self.state.write().map_err(|_| CartError::Poisoned)?;
        Ok(std::mem::replace(&mut state.phase, CartPhase::Loading))
    }

    fn restore_phase(&self, previous: CartPhase) {
        if let Ok(mut state) = self.state.write()
            && state.phase == CartPhase::Loading
        {
            state.phase = match previous {
                // Another operation was already loading; it settles the phase.
                CartPhase::Loading => CartPhase::Ready,
                other => other,
            };
        }
    }

    fn invalid_quantity(&self) -> CartError {
        self.notifier
            .notify(Notification::error("Quantity must be at least 1"));
        CartError::InvalidQuantity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vastraverse_core::{Email, UserId};

    use crate::api::User;
    use crate::config::ApiConfig;
    use crate::session::{MemorySessionStore, Session, SessionHandle};
    use crate::ui::{RecordingNavigator, RecordingNotifier};

    use super::*;

    fn cart() -> (CartStore, Arc<RecordingNotifier>) {
        let config = ApiConfig::with_base_url("http://127.0.0.1:9/api").unwrap();
        let session = SessionHandle::new(Arc::new(MemorySessionStore::new()));
        let api =
            ApiClient::new(&config, session, Arc::new(RecordingNavigator::default())).unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        (CartStore::new(api, notifier.clone()), notifier)
    }

    #[tokio::test]
    async fn test_add_without_session_fails_fast() {
        let (cart, notifier) = cart();

        let err = cart.add(ProductId::new(1), 1).await.unwrap_err();

        assert!(matches!(err, CartError::LoginRequired));
        assert_eq!(notifier.messages(), vec![LOGIN_REQUIRED]);
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.phase(), CartPhase::Unauthenticated);
        assert!(!cart.is_busy());
    }

    #[tokio::test]
    async fn test_refresh_without_session_is_noop() {
        let (cart, notifier) = cart();
        cart.refresh().await.unwrap();
        assert!(notifier.messages().is_empty());
        assert_eq!(cart.phase(), CartPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_snapshot_is_empty_once_session_ends() {
        let (cart, _) = cart();
        let user = User {
            id: UserId::new(7),
            name: "Priya".into(),
            email: Email::parse("priya@vastraverse.in").unwrap(),
            phone: None,
            address: None,
            created_at: None,
        };
        cart.api.session().establish(Session::new("tok", user)).unwrap();
        {
            let mut state = cart.state.write().unwrap();
            state.phase = CartPhase::Ready;
            state.summary.count = 2;
            state.summary.total = Price::from_units(1000);
        }
        assert_eq!(cart.count(), 2);

        cart.api.session().teardown();

        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.phase(), CartPhase::Unauthenticated);

        cart.refresh().await.unwrap();
        assert_eq!(cart.state.read().unwrap().summary.count, 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected_locally() {
        let (cart, notifier) = cart();
        let err = cart
            .update_quantity(CartItemId::new(3), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity));
        assert_eq!(notifier.messages(), vec!["Quantity must be at least 1"]);
    }

    #[test]
    fn test_restore_phase_after_failed_mutation() {
        let (cart, _) = cart();
        cart.state.write().unwrap().phase = CartPhase::Ready;

        let previous = cart.enter_loading().unwrap();
        assert_eq!(cart.state.read().unwrap().phase, CartPhase::Loading);

        cart.restore_phase(previous);
        assert_eq!(cart.state.read().unwrap().phase, CartPhase::Ready);
    }
}
