//! In-memory data behind the mock backend.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use vastraverse_core::Price;

/// A request as the mock backend received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path without the query string, e.g. `/api/cart/3`.
    pub path: String,
    pub query: Option<String>,
    /// Raw `Authorization` header.
    pub authorization: Option<String>,
    /// Raw `x-request-id` header.
    pub request_id: Option<String>,
    pub content_type: Option<String>,
    /// JSON body, if the request had one.
    pub body: Option<Value>,
}

/// A canned failure for the next matching request.
#[derive(Debug, Clone)]
pub struct Failure {
    pub status: u16,
    /// `None` answers `{"success": false}` for a 2xx status and a plain-text
    /// body otherwise.
    pub message: Option<String>,
}

impl Failure {
    /// A non-2xx refusal with the usual envelope.
    #[must_use]
    pub fn rejected(status: u16, message: &str) -> Self {
        Self {
            status,
            message: Some(message.to_owned()),
        }
    }

    /// A 200 answer whose envelope says `success: false`.
    #[must_use]
    pub fn business(message: &str) -> Self {
        Self::rejected(200, message)
    }

    /// A 401, as for an expired token.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::rejected(401, "Invalid token.")
    }

    /// A 5xx with a plain-text body.
    #[must_use]
    pub fn server_error() -> Self {
        Self {
            status: 500,
            message: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockProduct {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub image: String,
    pub stock: u32,
}

impl MockProduct {
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "price": self.price.to_string(),
            "category": self.category,
            "image": self.image,
            "stock": self.stock,
            "created_at": "2024-01-15T10:00:00.000Z",
            "updated_at": "2024-01-15T10:00:00.000Z",
        })
    }
}

#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MockUser {
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "address": self.address,
            "created_at": self.created_at.to_rfc3339(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WishlistEntry {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MockOrder {
    pub id: i64,
    pub user_id: i64,
    pub total: Price,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    /// `(product_id, quantity, unit price)`
    pub items: Vec<(i64, u32, Price)>,
}

/// Everything the mock backend knows.
#[derive(Debug, Default)]
pub struct MockState {
    next_id: i64,
    pub products: BTreeMap<i64, MockProduct>,
    pub users: BTreeMap<i64, MockUser>,
    /// Bearer token to user ID.
    pub tokens: HashMap<String, i64>,
    pub cart: Vec<CartLine>,
    pub wishlist: Vec<WishlistEntry>,
    pub orders: Vec<MockOrder>,
    pub requests: Vec<RecordedRequest>,
    /// Keyed by `"METHOD /path"`.
    pub failures: HashMap<String, Failure>,
    /// Keyed by `"METHOD /path"`; applied once.
    pub delays: HashMap<String, Duration>,
}

impl MockState {
    /// A store with a small seeded catalog.
    pub fn seeded() -> Self {
        let mut state = Self {
            next_id: 100,
            ..Self::default()
        };
        for (id, name, price, category, stock) in [
            (1, "Banarasi Silk Saree", "500", "sarees", 10),
            (2, "Chikankari Cotton Kurta", "899", "kurtas", 5),
            (3, "Phulkari Dupatta", "250.50", "dupattas", 3),
            (4, "Kanjeevaram Saree", "12999", "sarees", 0),
        ] {
            state.products.insert(
                id,
                MockProduct {
                    id,
                    name: name.to_owned(),
                    description: format!("Handcrafted {name}"),
                    price: price.parse().unwrap_or_default(),
                    category: category.to_owned(),
                    image: format!("/images/products/{id}.jpg"),
                    stock,
                },
            );
        }
        state
    }

    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Create a user and a token for them.
    pub fn add_user(&mut self, name: &str, email: &str, password: &str) -> (MockUser, String) {
        let user = MockUser {
            id: self.next_id(),
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            phone: None,
            address: None,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        let token = self.issue_token(user.id);
        (user, token)
    }

    pub fn issue_token(&mut self, user_id: i64) -> String {
        let token = format!("tok-{user_id}-{}", Uuid::new_v4().simple());
        self.tokens.insert(token.clone(), user_id);
        token
    }

    pub fn cart_json(&self, user_id: i64) -> Value {
        let mut total = Price::ZERO;
        let mut count = 0;
        let mut items = Vec::new();

        for line in self.cart.iter().filter(|l| l.user_id == user_id) {
            let Some(product) = self.products.get(&line.product_id) else {
                continue;
            };
            total = total + product.price.times(line.quantity);
            count += line.quantity;
            items.push(json!({
                "id": line.id,
                "user_id": line.user_id,
                "product_id": line.product_id,
                "quantity": line.quantity,
                "created_at": line.created_at.to_rfc3339(),
                "updated_at": line.updated_at.to_rfc3339(),
                "name": product.name,
                "price": product.price.to_string(),
                "image": product.image,
                "stock": product.stock,
            }));
        }

        json!({ "items": items, "total": total, "count": count })
    }

    pub fn wishlist_json(&self, user_id: i64) -> Value {
        let items: Vec<Value> = self
            .wishlist
            .iter()
            .filter(|w| w.user_id == user_id)
            .filter_map(|w| {
                let product = self.products.get(&w.product_id)?;
                Some(json!({
                    "id": w.id,
                    "user_id": w.user_id,
                    "product_id": w.product_id,
                    "created_at": w.created_at.to_rfc3339(),
                    "name": product.name,
                    "price": product.price.to_string(),
                    "image": product.image,
                    "stock": product.stock,
                    "category": product.category,
                }))
            })
            .collect();
        Value::Array(items)
    }

    pub fn order_json(&self, order: &MockOrder) -> Value {
        let items: Vec<Value> = order
            .items
            .iter()
            .enumerate()
            .map(|(i, (product_id, quantity, price))| {
                json!({
                    "id": order.id * 100 + i64::try_from(i).unwrap_or_default(),
                    "product_id": product_id,
                    "quantity": quantity,
                    "price": price.to_string(),
                    "name": self.products.get(product_id).map(|p| p.name.clone()),
                })
            })
            .collect();

        json!({
            "id": order.id,
            "user_id": order.user_id,
            "total_amount": order.total.to_string(),
            "status": "pending",
            "shipping_address": order.shipping_address,
            "created_at": order.created_at.to_rfc3339(),
            "items": items,
        })
    }
}
