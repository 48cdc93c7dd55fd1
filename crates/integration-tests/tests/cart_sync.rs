//! Cart holder against the mock backend: submit-then-refresh, failure
//! handling and the login-required fast path.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use vastraverse_core::{CartItemId, Price, ProductId};
use vastraverse_integration_tests::{Failure, MockBackend};
use vastraverse_storefront::api::ApiError;
use vastraverse_storefront::services::{CartError, CartPhase};

const EMAIL: &str = "priya@vastraverse.in";

async fn signed_in() -> (MockBackend, vastraverse_integration_tests::Shopper) {
    let backend = MockBackend::start().await;
    backend.add_user("Priya", EMAIL);
    let shopper = backend.shopper();
    shopper.login_as(EMAIL).await;
    shopper.storefront.cart().refresh().await.unwrap();
    shopper.take_messages();
    (backend, shopper)
}

#[tokio::test]
async fn add_then_refresh_reflects_server_totals() {
    let (backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    backend.clear_requests();

    cart.add(ProductId::new(1), 2).await.unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.total(), Price::from_units(1000));
    assert_eq!(cart.count(), 2);
    assert_eq!(cart.phase(), CartPhase::Ready);
    assert!(!cart.is_busy());
    assert_eq!(shopper.take_messages(), vec!["Item added to cart!"]);

    // One submit, then one full re-read.
    let calls: Vec<_> = backend
        .requests()
        .into_iter()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect();
    assert_eq!(calls, vec!["POST /api/cart", "GET /api/cart"]);

    let submit = backend.requests_to("/cart").into_iter().next().unwrap();
    let body = submit.body.unwrap();
    assert_eq!(body["product_id"], 1);
    assert_eq!(body["quantity"], 2);
}

#[tokio::test]
async fn count_and_total_match_refreshed_items() {
    let (_backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();

    cart.add(ProductId::new(1), 1).await.unwrap();
    cart.add(ProductId::new(3), 2).await.unwrap();
    cart.add(ProductId::new(1), 1).await.unwrap();

    let items = cart.items();
    let quantity: u32 = items.iter().map(|i| i.quantity).sum();
    let total: Price = items.iter().map(|i| i.line_total()).sum();

    assert_eq!(items.len(), 2);
    assert_eq!(cart.count(), quantity);
    assert_eq!(cart.count(), 4);
    assert_eq!(cart.total(), total);
    assert_eq!(cart.total().to_string(), "1501.00");
}

#[tokio::test]
async fn unauthenticated_add_sends_nothing() {
    let backend = MockBackend::start().await;
    let shopper = backend.shopper();
    let cart = shopper.storefront.cart();

    let err = cart.add(ProductId::new(1), 1).await.unwrap_err();

    assert!(matches!(err, CartError::LoginRequired));
    assert!(backend.requests().is_empty());
    assert_eq!(
        shopper.take_messages(),
        vec!["Please login to add items to cart"]
    );
    assert_eq!(cart.count(), 0);
    assert_eq!(cart.phase(), CartPhase::Unauthenticated);
}

#[tokio::test]
async fn failed_update_keeps_previous_state_and_surfaces_message() {
    let (backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    cart.add(ProductId::new(1), 2).await.unwrap();
    shopper.take_messages();

    let item_id = cart.items().first().unwrap().id;
    let before = cart.summary();
    backend.clear_requests();

    // Only 10 in stock.
    let err = cart.update_quantity(item_id, 50).await.unwrap_err();

    assert_eq!(err.to_string(), "Insufficient stock");
    assert!(matches!(
        err,
        CartError::Api(ApiError::Rejected {
            status: Some(400),
            ..
        })
    ));
    assert_eq!(shopper.take_messages(), vec!["Insufficient stock"]);
    assert_eq!(cart.summary(), before);
    assert_eq!(cart.phase(), CartPhase::Ready);

    // No refresh after a failed mutation.
    assert_eq!(backend.requests().len(), 1);
    assert_eq!(backend.requests_to("/cart").len(), 1);
}

#[tokio::test]
async fn business_failure_without_message_uses_default_text() {
    let (backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    backend.fail_next(
        "POST",
        "/cart",
        Failure {
            status: 200,
            message: None,
        },
    );

    assert!(cart.add(ProductId::new(2), 1).await.is_err());
    assert_eq!(shopper.take_messages(), vec!["Failed to add item to cart"]);
    assert_eq!(cart.count(), 0);
}

#[tokio::test]
async fn business_failure_with_success_false_is_surfaced() {
    let (backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    backend.fail_next("DELETE", "/cart", Failure::business("Cart is locked"));

    let err = cart.clear().await.unwrap_err();

    assert_eq!(err.to_string(), "Cart is locked");
    assert_eq!(shopper.take_messages(), vec!["Cart is locked"]);
}

#[tokio::test]
async fn update_and_remove_follow_submit_then_refresh() {
    let (_backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    cart.add(ProductId::new(2), 1).await.unwrap();
    cart.add(ProductId::new(1), 1).await.unwrap();

    let kurta = cart
        .items()
        .into_iter()
        .find(|i| i.product_id == ProductId::new(2))
        .unwrap();
    cart.update_quantity(kurta.id, 3).await.unwrap();
    assert_eq!(cart.count(), 4);
    assert_eq!(cart.total(), Price::from_units(899 * 3 + 500));

    cart.remove(kurta.id).await.unwrap();
    assert_eq!(cart.count(), 1);
    assert_eq!(cart.total(), Price::from_units(500));

    let messages = shopper.take_messages();
    assert!(messages.ends_with(&["Cart updated".to_owned(), "Item removed from cart".to_owned()]));
}

#[tokio::test]
async fn removing_unknown_item_keeps_cart() {
    let (_backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    cart.add(ProductId::new(1), 1).await.unwrap();
    shopper.take_messages();

    assert!(cart.remove(CartItemId::new(999_999)).await.is_err());
    assert_eq!(shopper.take_messages(), vec!["Cart item not found"]);
    assert_eq!(cart.count(), 1);
}

#[tokio::test]
async fn clear_twice_leaves_empty_cart() {
    let (_backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    cart.add(ProductId::new(1), 2).await.unwrap();

    cart.clear().await.unwrap();
    assert_eq!(cart.count(), 0);
    assert!(cart.total().is_zero());

    cart.clear().await.unwrap();
    assert_eq!(cart.count(), 0);
    assert!(cart.total().is_zero());
    assert!(cart.items().is_empty());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let (backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    cart.add(ProductId::new(1), 1).await.unwrap();
    shopper.take_messages();

    backend.fail_next("GET", "/cart", Failure::server_error());
    let err = cart.refresh().await.unwrap_err();

    assert!(matches!(
        err,
        CartError::Api(ApiError::Rejected {
            status: Some(500),
            ..
        })
    ));
    assert_eq!(shopper.take_messages(), vec!["Failed to load cart"]);
    assert_eq!(cart.count(), 1);
    assert_eq!(cart.phase(), CartPhase::Ready);
}

#[tokio::test]
async fn every_request_carries_token_and_request_id() {
    let (backend, shopper) = signed_in().await;
    backend.clear_requests();

    shopper
        .storefront
        .cart()
        .add(ProductId::new(1), 1)
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert!(request.authorization.as_deref().unwrap().starts_with("Bearer tok-"));
        assert_eq!(request.content_type.as_deref(), Some("application/json"));
        let request_id = request.request_id.as_deref().unwrap();
        assert_eq!(request_id.len(), 36);
    }
    assert_ne!(requests[0].request_id, requests[1].request_id);
}

#[tokio::test]
async fn busy_while_mutation_is_outstanding() {
    let (backend, shopper) = signed_in().await;
    let cart = Arc::clone(shopper.storefront.cart());
    backend.delay_next("POST", "/cart", Duration::from_millis(300));

    let pending = tokio::spawn({
        let cart = Arc::clone(&cart);
        async move { cart.add(ProductId::new(1), 1).await }
    });

    let mut seen_busy = false;
    for _ in 0..50 {
        if cart.is_busy() {
            seen_busy = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(seen_busy);
    assert_eq!(cart.phase(), CartPhase::Loading);

    pending.await.unwrap().unwrap();
    assert!(!cart.is_busy());
    assert_eq!(cart.phase(), CartPhase::Ready);
    assert_eq!(cart.count(), 1);
}

#[tokio::test]
async fn unauthorized_mutation_resets_cart() {
    let (backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    cart.add(ProductId::new(1), 2).await.unwrap();
    shopper.take_messages();
    backend.fail_next("POST", "/cart", Failure::unauthorized());

    let err = cart.add(ProductId::new(2), 1).await.unwrap_err();

    assert!(matches!(err, CartError::Api(ApiError::Unauthorized)));
    assert_eq!(cart.phase(), CartPhase::Unauthenticated);
    assert_eq!(cart.count(), 0);
    assert!(cart.items().is_empty());
    assert_eq!(shopper.navigator.routes(), vec!["/login"]);
}

#[tokio::test]
async fn logout_empties_cart_without_session_binding() {
    let (_backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    cart.add(ProductId::new(1), 2).await.unwrap();

    shopper.storefront.auth().logout().await;

    assert_eq!(cart.count(), 0);
    assert_eq!(cart.total(), Price::ZERO);
    assert_eq!(cart.phase(), CartPhase::Unauthenticated);

    cart.refresh().await.unwrap();
    assert_eq!(cart.count(), 0);
    assert!(cart.items().is_empty());
}

#[tokio::test]
async fn unauthorized_elsewhere_empties_cart() {
    let (backend, shopper) = signed_in().await;
    let cart = shopper.storefront.cart();
    cart.add(ProductId::new(1), 2).await.unwrap();
    backend.expire_sessions();

    assert!(shopper.storefront.checkout().orders().await.is_err());

    assert!(!shopper.storefront.auth().is_authenticated());
    assert_eq!(cart.phase(), CartPhase::Unauthenticated);
    assert_eq!(cart.count(), 0);
}
