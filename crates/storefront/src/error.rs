//! Unified error handling with Sentry integration.
//!
//! Each boundary has its own error enum; front-ends that drive several of
//! them at once can collect them into [`AppError`]. The Sentry helpers here
//! are no-ops until a client is initialised by the binary.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::{AuthError, CartError, CheckoutError, WishlistError};
use crate::session::SessionStoreError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Authentication failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// A wishlist operation failed.
    #[error(transparent)]
    Wishlist(#[from] WishlistError),

    /// Checkout failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Session persistence failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionStoreError),
}

impl AppError {
    /// Whether this error is worth reporting to Sentry.
    ///
    /// Business refusals, validation failures and expired sessions are
    /// expected and stay out of error tracking.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Config(_) | Self::Session(_) => true,
            Self::Api(e)
            | Self::Auth(AuthError::Api(e))
            | Self::Cart(CartError::Api(e))
            | Self::Wishlist(WishlistError::Api(e))
            | Self::Checkout(CheckoutError::Api(e)) => {
                matches!(e, ApiError::Http(_) | ApiError::Parse(_) | ApiError::MissingData)
            }
            Self::Auth(AuthError::Session(_))
            | Self::Cart(CartError::Poisoned)
            | Self::Wishlist(WishlistError::Poisoned) => true,
            _ => false,
        }
    }

    /// Send the error to Sentry if it is reportable.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Add to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
