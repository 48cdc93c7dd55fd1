//! `/products` endpoints.

use tracing::instrument;

use vastraverse_core::ProductId;

use super::{ApiClient, ApiError, ApiResponse, NewProduct, Page, Product, ProductPage, ProductQuery};

impl ApiClient {
    /// `GET /products` with optional filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(
        &self,
        query: &ProductQuery,
    ) -> Result<ApiResponse<ProductPage>, ApiError> {
        let url = self.url_with_query(&["products"], &query.pairs())?;
        self.get(url).await
    }

    /// `GET /products/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<ApiResponse<Product>, ApiError> {
        self.get(self.url(&["products", &id.to_string()])?).await
    }

    /// `GET /products/category/:category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products_by_category(
        &self,
        category: &str,
        page: Page,
    ) -> Result<ApiResponse<ProductPage>, ApiError> {
        let url = self.url_with_query(&["products", "category", category], &page.pairs())?;
        self.get(url).await
    }

    /// `GET /products/meta/categories`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<ApiResponse<Vec<String>>, ApiError> {
        self.get(self.url(&["products", "meta", "categories"])?).await
    }

    /// `POST /products`. Requires an admin session on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        product: &NewProduct,
    ) -> Result<ApiResponse<Product>, ApiError> {
        self.post(self.url(&["products"])?, product).await
    }
}
