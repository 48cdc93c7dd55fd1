//! Auth session holder and the global 401 teardown.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use vastraverse_core::ProductId;
use vastraverse_integration_tests::{Failure, MockBackend, TEST_PASSWORD};
use vastraverse_storefront::Storefront;
use vastraverse_storefront::api::{ApiError, Registration};
use vastraverse_storefront::services::{AuthError, CartError, CartPhase, WishlistError};
use vastraverse_storefront::session::{FileSessionStore, SessionStore, keys};
use vastraverse_storefront::ui::{RecordingNavigator, RecordingNotifier, routes};

const EMAIL: &str = "arjun@vastraverse.in";

/// Poll `condition` until it holds or a second passes.
async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

#[tokio::test]
async fn login_persists_session_under_fixed_keys() {
    let backend = MockBackend::start().await;
    backend.add_user("Arjun", EMAIL);
    let shopper = backend.shopper();

    let user = shopper
        .storefront
        .auth()
        .login(EMAIL, TEST_PASSWORD)
        .await
        .unwrap();

    assert_eq!(user.name, "Arjun");
    assert!(shopper.storefront.auth().is_authenticated());

    let token = shopper.store.read(keys::TOKEN).unwrap().unwrap();
    assert!(token.starts_with("tok-"));
    let stored_user = shopper.store.read(keys::USER).unwrap().unwrap();
    assert!(stored_user.contains(EMAIL));

    // The request body carried the credentials as given.
    let login = backend.requests_to("/auth/login").pop().unwrap();
    assert_eq!(login.method, "POST");
    assert_eq!(login.body.unwrap()["email"], EMAIL);
    assert!(login.authorization.is_none());
}

#[tokio::test]
async fn register_signs_in() {
    let backend = MockBackend::start().await;
    let shopper = backend.shopper();

    let user = shopper
        .storefront
        .auth()
        .register(Registration {
            name: "Meera".into(),
            email: "meera@vastraverse.in".into(),
            password: "s3cret!".into(),
            phone: Some("+91 98765 43210".into()),
            address: None,
        })
        .await
        .unwrap();

    assert_eq!(user.phone.as_deref(), Some("+91 98765 43210"));
    assert!(shopper.storefront.auth().is_authenticated());

    let body = backend.requests_to("/auth/register").pop().unwrap().body.unwrap();
    assert!(body.get("address").is_none());
}

#[tokio::test]
async fn duplicate_registration_surfaces_backend_message() {
    let backend = MockBackend::start().await;
    backend.add_user("Arjun", EMAIL);
    let shopper = backend.shopper();

    let err = shopper
        .storefront
        .auth()
        .register(Registration {
            name: "Arjun".into(),
            email: EMAIL.into(),
            password: TEST_PASSWORD.into(),
            ..Registration::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "User already exists with this email");
    assert!(!shopper.storefront.auth().is_authenticated());
}

#[tokio::test]
async fn wrong_password_is_rejected_without_redirect() {
    let backend = MockBackend::start().await;
    backend.add_user("Arjun", EMAIL);
    let shopper = backend.shopper();

    let err = shopper
        .storefront
        .auth()
        .login(EMAIL, "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Api(ApiError::Rejected { .. })));
    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(!shopper.storefront.auth().is_authenticated());
    assert!(shopper.navigator.routes().is_empty());
}

#[tokio::test]
async fn malformed_email_never_reaches_backend() {
    let backend = MockBackend::start().await;
    let shopper = backend.shopper();

    let err = shopper
        .storefront
        .auth()
        .login("arjun@", TEST_PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidEmail(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn expired_token_tears_down_session_and_redirects() {
    let backend = MockBackend::start().await;
    backend.add_user("Arjun", EMAIL);
    let shopper = backend.shopper();
    shopper.login_as(EMAIL).await;
    let cart = shopper.storefront.cart();
    cart.add(ProductId::new(1), 1).await.unwrap();
    assert_eq!(cart.count(), 1);

    backend.expire_sessions();
    let err = cart.refresh().await.unwrap_err();

    assert!(matches!(err, CartError::Api(ApiError::Unauthorized)));
    assert!(!shopper.storefront.auth().is_authenticated());
    assert!(shopper.store.read(keys::TOKEN).unwrap().is_none());
    assert!(shopper.store.read(keys::USER).unwrap().is_none());
    assert_eq!(shopper.navigator.routes(), vec![routes::LOGIN]);
    assert_eq!(cart.phase(), CartPhase::Unauthenticated);
    assert_eq!(cart.count(), 0);
}

#[tokio::test]
async fn unauthorized_from_any_endpoint_signs_out() {
    let backend = MockBackend::start().await;
    backend.add_user("Arjun", EMAIL);
    let shopper = backend.shopper();
    shopper.login_as(EMAIL).await;

    backend.fail_next("POST", "/wishlist", Failure::unauthorized());
    let err = shopper
        .storefront
        .wishlist()
        .add(ProductId::new(2))
        .await
        .unwrap_err();

    assert!(matches!(err, WishlistError::Api(ApiError::Unauthorized)));
    assert!(!shopper.storefront.auth().is_authenticated());
    assert_eq!(shopper.navigator.routes(), vec![routes::LOGIN]);

    // Subsequent requests go out without a token.
    backend.clear_requests();
    shopper.storefront.catalog().categories().await.unwrap();
    assert!(backend.requests()[0].authorization.is_none());
}

#[tokio::test]
async fn logout_clears_locally_even_when_backend_fails() {
    let backend = MockBackend::start().await;
    backend.add_user("Arjun", EMAIL);
    let shopper = backend.shopper();
    shopper.login_as(EMAIL).await;

    backend.fail_next("POST", "/auth/logout", Failure::server_error());
    shopper.storefront.auth().logout().await;

    assert!(!shopper.storefront.auth().is_authenticated());
    assert!(shopper.store.read(keys::TOKEN).unwrap().is_none());
    assert_eq!(backend.requests_to("/auth/logout").len(), 1);
    assert_eq!(shopper.navigator.routes(), vec![routes::HOME]);
}

#[tokio::test]
async fn cart_follows_login_and_logout() {
    let backend = MockBackend::start().await;
    backend.add_user("Arjun", EMAIL);
    let shopper = backend.shopper();
    let cart = Arc::clone(shopper.storefront.cart());

    // Seed the server-side cart through a second client.
    let other = backend.shopper();
    other.login_as(EMAIL).await;
    other
        .storefront
        .cart()
        .add(ProductId::new(2), 2)
        .await
        .unwrap();

    let tasks = shopper.storefront.bind_session();

    shopper.login_as(EMAIL).await;
    assert!(eventually(|| cart.count() == 2).await);
    assert_eq!(cart.phase(), CartPhase::Ready);

    shopper.storefront.auth().logout().await;
    assert!(eventually(|| cart.phase() == CartPhase::Unauthenticated).await);
    assert_eq!(cart.count(), 0);
    assert!(cart.items().is_empty());

    for task in tasks {
        task.abort();
    }
}

#[tokio::test]
async fn persisted_session_is_restored_by_a_new_client() {
    let backend = MockBackend::start().await;
    backend.add_user("Arjun", EMAIL);
    let shopper = backend.shopper();
    shopper.login_as(EMAIL).await;

    let restored = Storefront::with_store(
        backend.config(),
        shopper.store.clone(),
        Arc::new(RecordingNavigator::default()),
        Arc::new(RecordingNotifier::default()),
    )
    .unwrap();

    assert!(restored.auth().is_authenticated());
    assert_eq!(restored.auth().user().unwrap().name, "Arjun");

    let profile = restored.auth().refresh_profile().await.unwrap();
    assert_eq!(profile.email.as_str(), EMAIL);

    let token = restored.api().session().token().unwrap();
    let sent = backend.requests_to("/auth/profile").pop().unwrap();
    assert_eq!(
        sent.authorization.unwrap(),
        format!("Bearer {}", token.expose_secret())
    );
}

#[tokio::test]
async fn corrupt_session_file_does_not_block_login() {
    let backend = MockBackend::start().await;
    backend.add_user("Arjun", EMAIL);

    let dir = std::env::temp_dir().join(format!("vastraverse-it-{}", uuid::Uuid::new_v4()));
    let path = dir.join("session.json");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(&path, "{{{").unwrap();

    let storefront = Storefront::with_store(
        backend.config(),
        Arc::new(FileSessionStore::new(&path)),
        Arc::new(RecordingNavigator::default()),
        Arc::new(RecordingNotifier::default()),
    )
    .unwrap();
    assert!(!storefront.auth().is_authenticated());

    storefront.auth().login(EMAIL, TEST_PASSWORD).await.unwrap();
    storefront.auth().logout().await;
    storefront.auth().login(EMAIL, TEST_PASSWORD).await.unwrap();

    let store = FileSessionStore::new(&path);
    assert!(store.read(keys::TOKEN).unwrap().is_some());
    std::fs::remove_dir_all(&dir).unwrap();
}
