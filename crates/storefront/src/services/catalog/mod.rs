//! Product catalog with an in-memory read cache.
//!
//! Product details, category listings, the category list and unfiltered
//! listings are cached with `moka`. Free-text searches always go to the
//! backend. Creating a product invalidates everything.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, info, instrument};

use vastraverse_core::ProductId;

use crate::api::{ApiClient, ApiError, NewProduct, Page, Product, ProductPage, ProductQuery};

use cache::{CacheKey, CacheValue};

/// Maximum number of cached catalog responses.
const CACHE_CAPACITY: u64 = 1000;

/// Cached product catalog.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl Catalog {
    /// Create a catalog whose entries live for `ttl`.
    #[must_use]
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogInner { api, cache }),
        }
    }

    /// List products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        if query.is_search() {
            return self.inner.api.products(query).await?.into_data();
        }

        let key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product listing");
            return Ok(page);
        }

        let page = self.inner.api.products(query).await?.into_data()?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(page.clone()))
            .await;
        Ok(page)
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.inner.api.product(id).await?.into_data()?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// List one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn by_category(&self, category: &str, page: Page) -> Result<ProductPage, ApiError> {
        let key = CacheKey::Category {
            category: category.to_owned(),
            page,
        };
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category listing");
            return Ok(products);
        }

        let products = self
            .inner
            .api
            .products_by_category(category, page)
            .await?
            .into_data()?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// All category slugs.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self.inner.api.categories().await?.into_data()?;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// Create a product and drop every cached response.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses (for example, the session is
    /// not an admin).
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let created = self.inner.api.create_product(product).await?.into_data()?;
        self.invalidate();
        info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    /// Drop every cached response.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }
}
