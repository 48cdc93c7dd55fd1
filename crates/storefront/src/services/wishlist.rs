//! Wishlist state holder.
//!
//! Same discipline as the cart: submit, then re-read the whole list.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use vastraverse_core::{ProductId, WishlistItemId};

use super::{BusyGuard, failure_message};
use crate::api::{Ack, ApiClient, ApiError, ApiResponse, WishlistItem};
use crate::error::add_breadcrumb;
use crate::ui::{Notification, Notifier};

const LOGIN_REQUIRED: &str = "Please login to add items to wishlist";

/// Errors surfaced by [`WishlistStore`] operations.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// No active session. Nothing was sent.
    #[error("Please login to add items to wishlist")]
    LoginRequired,

    /// The backend call failed or was refused.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The wishlist snapshot lock was poisoned.
    #[error("wishlist state lock poisoned")]
    Poisoned,
}

/// Wishlist state holder.
pub struct WishlistStore {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    items: RwLock<Vec<WishlistItem>>,
    in_flight: AtomicUsize,
}

impl WishlistStore {
    #[must_use]
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            items: RwLock::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Follow the session: refresh on login, reset on logout.
    pub fn bind_session(self: &Arc<Self>) -> JoinHandle<()> {
        let wishlist = Arc::clone(self);
        let mut sessions = self.api.session().subscribe();

        tokio::spawn(async move {
            loop {
                let active = sessions.borrow_and_update().is_some();
                if active {
                    if let Err(e) = wishlist.refresh().await {
                        debug!(error = %e, "Wishlist refresh after session change failed");
                    }
                } else {
                    wishlist.reset();
                }

                if sessions.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Saved items.
    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.snapshot(<[WishlistItem]>::to_vec)
    }

    /// Number of saved items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot(<[WishlistItem]>::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `product_id` is on the wishlist.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.snapshot(|items| items.iter().any(|item| item.product_id == product_id))
    }

    /// Read the snapshot. Empty without an active session.
    fn snapshot<T: Default>(&self, f: impl FnOnce(&[WishlistItem]) -> T) -> T {
        if !self.api.session().is_active() {
            return T::default();
        }
        self.items
            .read()
            .map(|items| f(items.as_slice()))
            .unwrap_or_default()
    }

    /// Whether any operation is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Discard the snapshot.
    pub fn reset(&self) {
        if let Ok(mut items) = self.items.write() {
            items.clear();
        }
    }

    /// Re-read the wishlist. Without an active session the snapshot is
    /// discarded and nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Api` if the read fails; the previous snapshot
    /// is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), WishlistError> {
        if !self.api.session().is_active() {
            self.reset();
            return Ok(());
        }
        let _busy = BusyGuard::enter(&self.in_flight);
        self.reload().await
    }

    /// Save a product.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::LoginRequired` without any network call if
    /// nobody is signed in, or `WishlistError::Api` if the backend refuses.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: ProductId) -> Result<(), WishlistError> {
        if !self.api.session().is_active() {
            self.notifier.notify(Notification::error(LOGIN_REQUIRED));
            return Err(WishlistError::LoginRequired);
        }

        add_breadcrumb(
            "wishlist",
            "Add to wishlist",
            Some(&[("product_id", product_id.to_string().as_str())]),
        );
        self.submit(
            self.api.add_to_wishlist(product_id),
            "Added to wishlist",
            "Failed to add to wishlist",
        )
        .await
    }

    /// Remove a wishlist entry by its own ID.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Api` if the backend refuses.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove(&self, item_id: WishlistItemId) -> Result<(), WishlistError> {
        self.submit(
            self.api.remove_from_wishlist(item_id),
            "Removed from wishlist",
            "Failed to remove from wishlist",
        )
        .await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Api` if the backend refuses.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<(), WishlistError> {
        self.submit(
            self.api.remove_product_from_wishlist(product_id),
            "Removed from wishlist",
            "Failed to remove from wishlist",
        )
        .await
    }

    /// Add the product if absent, remove it if present.
    ///
    /// Returns whether the product is on the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// As [`Self::add`] and [`Self::remove_product`].
    pub async fn toggle(&self, product_id: ProductId) -> Result<bool, WishlistError> {
        if self.contains(product_id) {
            self.remove_product(product_id).await?;
        } else {
            self.add(product_id).await?;
        }
        Ok(self.contains(product_id))
    }

    async fn submit(
        &self,
        request: impl Future<Output = Result<Ack, ApiError>>,
        success: &str,
        failure: &str,
    ) -> Result<(), WishlistError> {
        let _busy = BusyGuard::enter(&self.in_flight);

        if let Err(e) = request.await.and_then(ApiResponse::into_ack) {
            if e.is_unauthorized() {
                self.reset();
            }
            warn!(error = %e, "Wishlist mutation failed");
            self.notifier.notify(Notification::error(failure_message(&e, failure)));
            return Err(e.into());
        }

        if let Err(e) = self.reload().await {
            debug!(error = %e, "Wishlist re-read after mutation failed");
        }
        self.notifier.notify(Notification::success(success));
        Ok(())
    }

    async fn reload(&self) -> Result<(), WishlistError> {
        match self.api.wishlist().await.and_then(ApiResponse::into_data) {
            Ok(fresh) => {
                let mut items = self.items.write().map_err(|_| WishlistError::Poisoned)?;
                info!(count = fresh.len(), "Wishlist refreshed");
                *items = if self.api.session().is_active() {
                    fresh
                } else {
                    Vec::new()
                };
                Ok(())
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.reset();
                }
                warn!(error = %e, "Failed to load wishlist");
                self.notifier
                    .notify(Notification::error("Failed to load wishlist"));
                Err(e.into())
            }
        }
    }
}
