//! HTTP handlers of the mock backend, mirroring the Vastraverse REST API.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use vastraverse_core::Price;

use crate::state::{CartLine, MockOrder, MockProduct, MockState, MockUser, RecordedRequest, WishlistEntry};

pub type Shared = Arc<Mutex<MockState>>;

pub fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
        .route("/products", get(list_products).post(create_product))
        .route("/products/meta/categories", get(categories))
        .route("/products/category/{category}", get(products_by_category))
        .route("/products/{id}", get(get_product))
        .route("/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/cart/{id}", put(update_cart_item).delete(remove_cart_item))
        .route("/wishlist", get(get_wishlist).post(add_to_wishlist))
        .route("/wishlist/{id}", delete(remove_wishlist_item))
        .route("/wishlist/product/{product_id}", delete(remove_wishlist_product))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

// =============================================================================
// Middleware
// =============================================================================

/// Record every request, then answer with an injected failure if one is
/// queued for it.
async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_owned(),
        query: parts.uri.query().map(str::to_owned),
        authorization: header(AUTHORIZATION.as_str()),
        request_id: header("x-request-id"),
        content_type: header(CONTENT_TYPE.as_str()),
        body: serde_json::from_slice(&bytes).ok(),
    };

    let key = format!("{} {}", recorded.method, recorded.path);
    let (failure, delay) = {
        let mut state = lock(&state);
        state.requests.push(recorded);
        (state.failures.remove(&key), state.delays.remove(&key))
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if let Some(failure) = failure {
        let status = StatusCode::from_u16(failure.status).unwrap_or(StatusCode::BAD_REQUEST);
        return match failure.message {
            Some(message) => fail(status, &message),
            None if status.is_success() => Json(json!({"success": false})).into_response(),
            None => (status, "Internal Server Error").into_response(),
        };
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// =============================================================================
// Helpers
// =============================================================================

fn ok(data: Value) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

fn ok_message(message: &str) -> Response {
    Json(json!({"success": true, "message": message})).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

/// Resolve the bearer token to a user ID.
fn authenticate(state: &MockState, headers: &HeaderMap) -> Result<i64, Response> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Access denied. No token provided."))?;

    state
        .tokens
        .get(token)
        .copied()
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Invalid token."))
}

fn auth_payload(user: &MockUser, token: &str) -> Value {
    json!({"user": user.to_json(), "token": token})
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
    phone: Option<String>,
    address: Option<String>,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = lock(&state);
    if state.users.values().any(|u| u.email == body.email) {
        return fail(StatusCode::BAD_REQUEST, "User already exists with this email");
    }

    let (mut user, token) = state.add_user(&body.name, &body.email, &body.password);
    user.phone = body.phone;
    user.address = body.address;
    state.users.insert(user.id, user.clone());

    Json(json!({
        "success": true,
        "message": "User registered successfully",
        "data": auth_payload(&user, &token),
    }))
    .into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let mut state = lock(&state);
    let Some(user) = state
        .users
        .values()
        .find(|u| u.email == body.email && u.password == body.password)
        .cloned()
    else {
        return fail(StatusCode::BAD_REQUEST, "Invalid email or password");
    };

    let token = state.issue_token(user.id);
    ok(auth_payload(&user, &token))
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.tokens.remove(token);
    }
    ok_message("Logged out successfully")
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.users.get(&user_id) {
        Some(user) => ok(user.to_json()),
        None => fail(StatusCode::NOT_FOUND, "User not found"),
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Deserialize)]
struct ListParams {
    category: Option<String>,
    search: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

fn paginate(products: Vec<Value>, limit: Option<usize>, offset: Option<usize>) -> Vec<Value> {
    products
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

async fn list_products(State(state): State<Shared>, Query(params): Query<ListParams>) -> Response {
    let state = lock(&state);
    let search = params.search.map(|s| s.to_lowercase());
    let matching: Vec<Value> = state
        .products
        .values()
        .filter(|p| params.category.as_ref().is_none_or(|c| &p.category == c))
        .filter(|p| {
            search
                .as_ref()
                .is_none_or(|s| p.name.to_lowercase().contains(s.as_str()))
        })
        .map(MockProduct::to_json)
        .collect();
    let total = matching.len();

    ok(json!({
        "products": paginate(matching, params.limit, params.offset),
        "total": total,
    }))
}

#[derive(Deserialize)]
struct PageParams {
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn products_by_category(
    State(state): State<Shared>,
    Path(category): Path<String>,
    Query(page): Query<PageParams>,
) -> Response {
    let state = lock(&state);
    let matching: Vec<Value> = state
        .products
        .values()
        .filter(|p| p.category == category)
        .map(MockProduct::to_json)
        .collect();
    ok(Value::Array(paginate(matching, page.limit, page.offset)))
}

async fn categories(State(state): State<Shared>) -> Response {
    let state = lock(&state);
    let mut categories: Vec<String> = state.products.values().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();
    ok(json!(categories))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let state = lock(&state);
    match state.products.get(&id) {
        Some(product) => ok(product.to_json()),
        None => fail(StatusCode::NOT_FOUND, "Product not found"),
    }
}

#[derive(Deserialize)]
struct ProductBody {
    name: String,
    description: String,
    price: Price,
    category: String,
    image: String,
    stock: u32,
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ProductBody>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate(&state, &headers) {
        return response;
    }

    let product = MockProduct {
        id: state.next_id(),
        name: body.name,
        description: body.description,
        price: body.price,
        category: body.category,
        image: body.image,
        stock: body.stock,
    };
    state.products.insert(product.id, product.clone());
    (StatusCode::CREATED, Json(json!({"success": true, "data": product.to_json()}))).into_response()
}

// =============================================================================
// Cart
// =============================================================================

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match authenticate(&state, &headers) {
        Ok(user_id) => ok(state.cart_json(user_id)),
        Err(response) => response,
    }
}

#[derive(Deserialize)]
struct AddToCartBody {
    product_id: i64,
    quantity: u32,
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddToCartBody>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(stock) = state.products.get(&body.product_id).map(|p| p.stock) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };

    let now = Utc::now();
    let existing = state
        .cart
        .iter()
        .position(|l| l.user_id == user_id && l.product_id == body.product_id);
    let already = existing
        .and_then(|i| state.cart.get(i))
        .map_or(0, |l| l.quantity);
    if already + body.quantity > stock {
        return fail(StatusCode::BAD_REQUEST, "Insufficient stock");
    }

    match existing {
        Some(index) => {
            if let Some(line) = state.cart.get_mut(index) {
                line.quantity += body.quantity;
                line.updated_at = now;
            }
        }
        None => {
            let id = state.next_id();
            state.cart.push(CartLine {
                id,
                user_id,
                product_id: body.product_id,
                quantity: body.quantity,
                created_at: now,
                updated_at: now,
            });
        }
    }
    ok_message("Item added to cart")
}

#[derive(Deserialize)]
struct QuantityBody {
    quantity: u32,
}

async fn update_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<QuantityBody>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(product_id) = state
        .cart
        .iter()
        .find(|l| l.id == id && l.user_id == user_id)
        .map(|l| l.product_id)
    else {
        return fail(StatusCode::NOT_FOUND, "Cart item not found");
    };
    if state.products.get(&product_id).map_or(0, |p| p.stock) < body.quantity {
        return fail(StatusCode::BAD_REQUEST, "Insufficient stock");
    }

    if let Some(line) = state.cart.iter_mut().find(|l| l.id == id) {
        line.quantity = body.quantity;
        line.updated_at = Utc::now();
    }
    ok_message("Cart updated")
}

async fn remove_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let before = state.cart.len();
    state.cart.retain(|l| !(l.id == id && l.user_id == user_id));
    if state.cart.len() == before {
        return fail(StatusCode::NOT_FOUND, "Cart item not found");
    }
    ok_message("Item removed from cart")
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    state.cart.retain(|l| l.user_id != user_id);
    ok_message("Cart cleared")
}

// =============================================================================
// Wishlist
// =============================================================================

async fn get_wishlist(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match authenticate(&state, &headers) {
        Ok(user_id) => ok(state.wishlist_json(user_id)),
        Err(response) => response,
    }
}

#[derive(Deserialize)]
struct WishlistBody {
    product_id: i64,
}

async fn add_to_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<WishlistBody>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if !state.products.contains_key(&body.product_id) {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    }
    if state
        .wishlist
        .iter()
        .any(|w| w.user_id == user_id && w.product_id == body.product_id)
    {
        return fail(StatusCode::BAD_REQUEST, "Product already in wishlist");
    }

    let id = state.next_id();
    state.wishlist.push(WishlistEntry {
        id,
        user_id,
        product_id: body.product_id,
        created_at: Utc::now(),
    });
    ok_message("Added to wishlist")
}

async fn remove_wishlist_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    state.wishlist.retain(|w| !(w.id == id && w.user_id == user_id));
    ok_message("Removed from wishlist")
}

async fn remove_wishlist_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    state
        .wishlist
        .retain(|w| !(w.product_id == product_id && w.user_id == user_id));
    ok_message("Removed from wishlist")
}

// =============================================================================
// Orders
// =============================================================================

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let orders: Vec<Value> = state
        .orders
        .iter()
        .filter(|o| o.user_id == user_id)
        .map(|o| state.order_json(o))
        .collect();
    ok(Value::Array(orders))
}

async fn get_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.orders.iter().find(|o| o.id == id && o.user_id == user_id) {
        Some(order) => ok(state.order_json(order)),
        None => fail(StatusCode::NOT_FOUND, "Order not found"),
    }
}

#[derive(Deserialize)]
struct OrderBody {
    shipping_address: String,
    items: Vec<OrderLineBody>,
}

#[derive(Deserialize)]
struct OrderLineBody {
    product_id: i64,
    quantity: u32,
    price: Price,
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OrderBody>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if body.items.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Order must contain items");
    }
    for line in &body.items {
        if state.products.get(&line.product_id).map_or(0, |p| p.stock) < line.quantity {
            return fail(StatusCode::BAD_REQUEST, "Insufficient stock");
        }
    }

    for line in &body.items {
        if let Some(product) = state.products.get_mut(&line.product_id) {
            product.stock -= line.quantity;
        }
    }
    let order = MockOrder {
        id: state.next_id(),
        user_id,
        total: body.items.iter().map(|l| l.price.times(l.quantity)).sum(),
        shipping_address: body.shipping_address,
        created_at: Utc::now(),
        items: body
            .items
            .iter()
            .map(|l| (l.product_id, l.quantity, l.price))
            .collect(),
    };
    state.cart.retain(|l| l.user_id != user_id);
    state.orders.push(order.clone());

    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order placed successfully",
            "data": state.order_json(&order),
        })),
    )
        .into_response()
}
