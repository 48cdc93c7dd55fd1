//! Wiring for one shopper's client.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::services::{AuthSession, CartStore, Catalog, Checkout, WishlistStore};
use crate::session::{FileSessionStore, SessionHandle, SessionStore};
use crate::ui::{Navigator, Notifier};

/// Every state holder for one shopper, wired to one session.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    auth: AuthSession,
    cart: Arc<CartStore>,
    wishlist: Arc<WishlistStore>,
    catalog: Catalog,
    checkout: Checkout,
}

impl Storefront {
    /// Build a storefront persisting its session to `config.session_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: StorefrontConfig,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let store = Arc::new(FileSessionStore::new(&config.session_file));
        Self::with_store(config, store, navigator, notifier)
    }

    /// Build a storefront over an arbitrary session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(
        config: StorefrontConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let session = SessionHandle::new(store);
        let api = ApiClient::new(&config.api, session, Arc::clone(&navigator))?;

        let auth = AuthSession::new(api.clone(), navigator);
        let cart = Arc::new(CartStore::new(api.clone(), Arc::clone(&notifier)));
        let wishlist = Arc::new(WishlistStore::new(api.clone(), Arc::clone(&notifier)));
        let catalog = Catalog::new(api.clone(), config.catalog_cache_ttl);
        let checkout = Checkout::new(api.clone(), Arc::clone(&cart), notifier);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                auth,
                cart,
                wishlist,
                catalog,
                checkout,
            }),
        })
    }

    /// Subscribe the cart and wishlist to session changes.
    ///
    /// Long-running front-ends call this once; the returned tasks run until
    /// aborted. One-shot commands can call `refresh` directly instead.
    #[must_use]
    pub fn bind_session(&self) -> [JoinHandle<()>; 2] {
        [
            self.inner.cart.bind_session(),
            self.inner.wishlist.bind_session(),
        ]
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the auth session holder.
    #[must_use]
    pub fn auth(&self) -> &AuthSession {
        &self.inner.auth
    }

    /// Get a reference to the cart holder.
    #[must_use]
    pub fn cart(&self) -> &Arc<CartStore> {
        &self.inner.cart
    }

    /// Get a reference to the wishlist holder.
    #[must_use]
    pub fn wishlist(&self) -> &Arc<WishlistStore> {
        &self.inner.wishlist
    }

    /// Get a reference to the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to checkout.
    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }
}
