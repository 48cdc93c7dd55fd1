//! Client-side state holders.
//!
//! # Services
//!
//! - `auth` - Login, registration, logout and profile refresh
//! - `cart` - Cart snapshot with submit-then-refresh mutations
//! - `wishlist` - Wishlist snapshot, same discipline as the cart
//! - `catalog` - Cached product browsing
//! - `checkout` - Order placement and history
//!
//! Holders never apply optimistic patches. Every successful mutation is
//! followed by a full re-read from the backend, and every failure leaves the
//! previous snapshot untouched.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod wishlist;

pub use auth::{AuthError, AuthSession};
pub use cart::{CartError, CartPhase, CartStore};
pub use catalog::Catalog;
pub use checkout::{Checkout, CheckoutError};
pub use wishlist::{WishlistError, WishlistStore};

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::ApiError;

/// Marks a holder busy for as long as the guard lives.
///
/// Counts rather than flags, so overlapping operations keep the holder busy
/// until the last one finishes.
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Text shown to the shopper for a failed operation: the backend's own
/// message when it gave one, `fallback` otherwise.
fn failure_message(error: &ApiError, fallback: &str) -> String {
    error.backend_message().unwrap_or(fallback).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_counts_overlapping_operations() {
        let counter = AtomicUsize::new(0);
        let first = BusyGuard::enter(&counter);
        let second = BusyGuard::enter(&counter);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        drop(first);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        drop(second);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failure_message_prefers_backend_text() {
        let rejected = ApiError::Rejected {
            status: Some(400),
            message: "Insufficient stock".into(),
        };
        assert_eq!(
            failure_message(&rejected, "Failed to update quantity"),
            "Insufficient stock"
        );
        assert_eq!(
            failure_message(&ApiError::MissingData, "Failed to update quantity"),
            "Failed to update quantity"
        );
    }
}
