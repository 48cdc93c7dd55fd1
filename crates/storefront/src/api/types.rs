//! Wire types for the backend REST API.
//!
//! Field names follow the backend's snake_case JSON. Optional or
//! backend-version-dependent fields default instead of failing the whole
//! response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vastraverse_core::{
    CartItemId, Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId, WishlistItemId,
};

// =============================================================================
// Auth Types
// =============================================================================

/// A shopper's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Phone number, if given at signup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Default shipping address, if given at signup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Account creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload returned by login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    /// The authenticated user.
    pub user: User,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// `POST /auth/register` body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A catalog product. Owned by the backend; never mutated by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Category slug (open set, e.g. "sarees", "kurtas").
    #[serde(default)]
    pub category: String,
    /// Image URL or path.
    #[serde(default)]
    pub image: Option<String>,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// `POST /products` body.
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub image: String,
    pub stock: u32,
}

/// Filters for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    /// Restrict to one category.
    pub category: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Page offset.
    pub offset: Option<u32>,
}

impl ProductQuery {
    /// Query-string pairs for the set filters, in a stable order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("category", category.to_owned()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_owned()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }

    /// Whether this is a free-text search (results are never cached).
    #[must_use]
    pub fn is_search(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Pagination for category listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Page {
    /// Query-string pairs for the set fields.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

/// A page of products.
///
/// The backend answers listings either with a bare array or with
/// `{products, total}`; both decode to this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProductListing")]
pub struct ProductPage {
    /// Products on this page.
    pub products: Vec<Product>,
    /// Total matching products, when the backend reports it.
    pub total: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductListing {
    Bare(Vec<Product>),
    Paged {
        products: Vec<Product>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl From<ProductListing> for ProductPage {
    fn from(listing: ProductListing) -> Self {
        match listing {
            ProductListing::Bare(products) => Self {
                products,
                total: None,
            },
            ProductListing::Paged { products, total } => Self { products, total },
        }
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// One line of the shopper's cart, with denormalized product fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart item ID (not the product ID).
    pub id: CartItemId,
    /// Owning user.
    pub user_id: UserId,
    /// Product in this line.
    pub product_id: ProductId,
    /// Quantity, always positive.
    pub quantity: u32,
    /// When the line was created.
    pub created_at: DateTime<Utc>,
    /// When the line was last changed.
    pub updated_at: DateTime<Utc>,
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Product image.
    #[serde(default)]
    pub image: Option<String>,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// `GET /cart` payload: the server's view of the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    /// Cart lines.
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Server-computed sum of price × quantity.
    #[serde(default)]
    pub total: Price,
    /// Server-computed number of units.
    #[serde(default)]
    pub count: u32,
}

/// `POST /cart` body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// `PUT /cart/:id` body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateQuantity {
    pub quantity: u32,
}

// =============================================================================
// Wishlist Types
// =============================================================================

/// A saved product on the shopper's wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    /// Wishlist item ID (not the product ID).
    pub id: WishlistItemId,
    /// Owning user.
    pub user_id: UserId,
    /// Saved product.
    pub product_id: ProductId,
    /// When the product was saved.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Product image.
    #[serde(default)]
    pub image: Option<String>,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Product category.
    #[serde(default)]
    pub category: Option<String>,
}

/// `POST /wishlist` body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AddToWishlist {
    pub product_id: ProductId,
}

// =============================================================================
// Order Types
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Owning user.
    pub user_id: UserId,
    /// Order total as charged by the backend.
    #[serde(alias = "total")]
    pub total_amount: Price,
    /// Fulfilment status.
    #[serde(default)]
    pub status: OrderStatus,
    /// Where the order ships.
    #[serde(default)]
    pub shipping_address: String,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Order lines (absent from some list responses).
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Order item ID.
    #[serde(default)]
    pub id: Option<OrderItemId>,
    /// Ordered product.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: u32,
    /// Unit price at order time.
    pub price: Price,
    /// Product name.
    #[serde(default)]
    pub name: Option<String>,
    /// Product image.
    #[serde(default)]
    pub image: Option<String>,
}

/// `POST /orders` body.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub shipping_address: String,
    pub items: Vec<NewOrderItem>,
}

/// One line of a `POST /orders` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
}

impl From<&CartItem> for NewOrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_summary_from_backend_json() {
        let summary: CartSummary = serde_json::from_value(json!({
            "items": [{
                "id": 11,
                "user_id": 7,
                "product_id": 1,
                "quantity": 2,
                "created_at": "2024-03-01T10:00:00.000Z",
                "updated_at": "2024-03-01T10:05:00.000Z",
                "name": "Banarasi Silk Saree",
                "price": "500.00",
                "image": "/images/saree.jpg",
                "stock": 8
            }],
            "total": 1000,
            "count": 2
        }))
        .unwrap();

        assert_eq!(summary.count, 2);
        assert_eq!(summary.total, Price::from_units(1000));
        let item = summary.items.first().unwrap();
        assert_eq!(item.product_id, ProductId::new(1));
        assert_eq!(item.line_total(), Price::from_units(1000));
    }

    #[test]
    fn test_product_listing_bare_and_paged() {
        let product = json!({"id": 1, "name": "Kurta", "price": 899, "category": "kurtas", "stock": 3});

        let bare: ProductPage = serde_json::from_value(json!([product.clone()])).unwrap();
        assert_eq!(bare.products.len(), 1);
        assert!(bare.total.is_none());

        let paged: ProductPage =
            serde_json::from_value(json!({"products": [product], "total": 42})).unwrap();
        assert_eq!(paged.total, Some(42));
        assert!(paged.products.first().unwrap().in_stock());
    }

    #[test]
    fn test_product_query_pairs_skip_blank_filters() {
        let query = ProductQuery {
            category: Some("sarees".into()),
            search: Some("   ".into()),
            limit: Some(12),
            offset: None,
        };
        assert_eq!(
            query.pairs(),
            vec![("category", "sarees".to_owned()), ("limit", "12".to_owned())]
        );
        assert!(!query.is_search());
    }

    #[test]
    fn test_registration_omits_absent_optionals() {
        let body = serde_json::to_value(Registration {
            name: "Priya".into(),
            email: "priya@vastraverse.in".into(),
            password: "hunter22".into(),
            ..Registration::default()
        })
        .unwrap();
        assert!(body.get("phone").is_none());
        assert!(body.get("address").is_none());
    }

    #[test]
    fn test_order_accepts_total_alias_and_unknown_status() {
        let order: Order = serde_json::from_value(json!({
            "id": 5,
            "user_id": 7,
            "total": "1000.00",
            "status": "on_hold",
            "shipping_address": "12 MG Road, Pune",
            "created_at": "2024-03-02T09:00:00Z"
        }))
        .unwrap();
        assert_eq!(order.total_amount, Price::from_units(1000));
        assert_eq!(order.status, OrderStatus::Unknown);
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_new_order_item_from_cart_item_sends_numeric_price() {
        let item: CartItem = serde_json::from_value(json!({
            "id": 1, "user_id": 1, "product_id": 9, "quantity": 3,
            "created_at": "2024-03-01T10:00:00Z", "updated_at": "2024-03-01T10:00:00Z",
            "name": "Dupatta", "price": "250.50"
        }))
        .unwrap();

        let body = serde_json::to_value(NewOrderItem::from(&item)).unwrap();
        assert_eq!(body["product_id"], 9);
        assert_eq!(body["quantity"], 3);
        assert_eq!(body["price"].as_f64(), Some(250.5));
    }
}
