//! End-to-end test support for the Vastraverse storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vastraverse-integration-tests
//! ```
//!
//! No external services are needed. Each test starts a [`MockBackend`], an
//! in-process `axum` server on `127.0.0.1:0` that speaks the Vastraverse
//! REST API and records every request it receives, so properties like "no
//! request was sent" can be asserted directly.
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::start().await;
//! let shopper = backend.shopper();
//! shopper.login_as("priya@example.com").await;
//!
//! shopper.storefront.cart().add(ProductId::new(1), 2).await?;
//! assert_eq!(shopper.storefront.cart().count(), 2);
//! ```

mod routes;
mod state;

pub use state::{Failure, RecordedRequest};

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use vastraverse_storefront::Storefront;
use vastraverse_storefront::config::StorefrontConfig;
use vastraverse_storefront::session::MemorySessionStore;
use vastraverse_storefront::ui::{RecordingNavigator, RecordingNotifier};

use routes::{Shared, lock};
use state::MockState;

/// Password given to every user created through [`MockBackend::add_user`].
pub const TEST_PASSWORD: &str = "hunter22";

/// An in-process Vastraverse backend.
///
/// Seeded with four products:
///
/// | id | name                    | price  | category | stock |
/// |----|-------------------------|--------|----------|-------|
/// | 1  | Banarasi Silk Saree     | 500    | sarees   | 10    |
/// | 2  | Chikankari Cotton Kurta | 899    | kurtas   | 5     |
/// | 3  | Phulkari Dupatta        | 250.50 | dupattas | 3     |
/// | 4  | Kanjeevaram Saree       | 12999  | sarees   | 0     |
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::seeded()));
        let app = routes::router(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the REST API, e.g. `http://127.0.0.1:53211/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Configuration pointing a client at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the generated base URL is rejected.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let base_url = self.base_url();
        StorefrontConfig::from_lookup(|key| (key == "VASTRAVERSE_API_URL").then(|| base_url.clone()))
            .expect("Mock backend config is valid")
    }

    /// A fresh shopper client with in-memory session storage.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn shopper(&self) -> Shopper {
        let store = Arc::new(MemorySessionStore::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let storefront = Storefront::with_store(
            self.config(),
            store.clone(),
            navigator.clone(),
            notifier.clone(),
        )
        .expect("Failed to build storefront client");

        Shopper {
            storefront,
            store,
            navigator,
            notifier,
        }
    }

    /// Create a user directly in the backend, with [`TEST_PASSWORD`].
    ///
    /// Returns the user ID.
    pub fn add_user(&self, name: &str, email: &str) -> i64 {
        lock(&self.state).add_user(name, email, TEST_PASSWORD).0.id
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Requests received so far whose path starts with `/api{prefix}`.
    #[must_use]
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        let prefix = format!("/api{prefix}");
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(&prefix))
            .collect()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.state).requests.clear();
    }

    /// Answer the next `method path` request with `failure` instead of
    /// handling it. `path` is relative to `/api`, e.g. `/cart/3`.
    pub fn fail_next(&self, method: &str, path: &str, failure: Failure) {
        lock(&self.state)
            .failures
            .insert(format!("{method} /api{path}"), failure);
    }

    /// Hold the next `method path` request for `delay` before answering it.
    pub fn delay_next(&self, method: &str, path: &str, delay: Duration) {
        lock(&self.state)
            .delays
            .insert(format!("{method} /api{path}"), delay);
    }

    /// Invalidate every issued token, as a server-side session expiry would.
    pub fn expire_sessions(&self) {
        lock(&self.state).tokens.clear();
    }

    /// Set a product's stock.
    pub fn set_stock(&self, product_id: i64, stock: u32) {
        if let Some(product) = lock(&self.state).products.get_mut(&product_id) {
            product.stock = stock;
        }
    }

    /// Number of cart lines the backend holds for `user_id`.
    #[must_use]
    pub fn cart_lines(&self, user_id: i64) -> usize {
        lock(&self.state)
            .cart
            .iter()
            .filter(|l| l.user_id == user_id)
            .count()
    }

    /// Number of orders the backend holds.
    #[must_use]
    pub fn order_count(&self) -> usize {
        lock(&self.state).orders.len()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A shopper's client wired to recording presentation seams.
pub struct Shopper {
    pub storefront: Storefront,
    pub store: Arc<MemorySessionStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Shopper {
    /// Log in as an existing user with [`TEST_PASSWORD`].
    ///
    /// # Panics
    ///
    /// Panics if the login is refused.
    pub async fn login_as(&self, email: &str) {
        self.storefront
            .auth()
            .login(email, TEST_PASSWORD)
            .await
            .expect("Login failed");
    }

    /// Notification messages shown so far, draining them.
    #[must_use]
    pub fn take_messages(&self) -> Vec<String> {
        self.notifier
            .take()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }
}
