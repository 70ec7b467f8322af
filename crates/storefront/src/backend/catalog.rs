//! Product and category endpoints.

use tracing::{debug, instrument};
use zaheen_core::{CategoryId, ProductId};

use super::cache::{CacheKey, CacheValue};
use super::types::{Category, CategoryInput, Envelope, Product, ProductInput};
use super::{BackendClient, BackendError};

impl BackendClient {
    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let response: Envelope<Vec<Product>> = self.fetch(self.http().get(self.url("/products"))).await?;
        let products = response.data;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("/products/{id}");
        let response: Envelope<Option<Product>> = self.fetch(self.http().get(self.url(&path))).await?;
        let product = response
            .data
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&CacheKey::Categories).await {
            debug!("Cache hit for category list");
            return Ok(categories);
        }

        let response: Envelope<Vec<Category>> = self.fetch(self.http().get(self.url("/categories"))).await?;
        let categories = response.data;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Create a product. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the product or the token.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_product(&self, token: &str, input: &ProductInput) -> Result<(), BackendError> {
        self.execute(self.http().post(self.url("/products")).bearer_auth(token).json(input))
            .await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Update a product. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the token.
    #[instrument(skip(self, token, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &str,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<(), BackendError> {
        let path = format!("/products/{id}");
        self.execute(self.http().patch(self.url(&path)).bearer_auth(token).json(input))
            .await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Delete a product. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion or the token.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &str, id: &ProductId) -> Result<(), BackendError> {
        let path = format!("/products/{id}");
        self.execute(self.http().delete(self.url(&path)).bearer_auth(token))
            .await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Create a category. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the category or the token.
    #[instrument(skip(self, token))]
    pub async fn create_category(&self, token: &str, name: &str) -> Result<(), BackendError> {
        let body = CategoryInput { name: name.to_string() };
        self.execute(self.http().post(self.url("/categories")).bearer_auth(token).json(&body))
            .await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Rename a category. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the token.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn update_category(&self, token: &str, id: &CategoryId, name: &str) -> Result<(), BackendError> {
        let path = format!("/categories/{id}");
        let body = CategoryInput { name: name.to_string() };
        self.execute(self.http().patch(self.url(&path)).bearer_auth(token).json(&body))
            .await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Delete a category. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion or the token.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn delete_category(&self, token: &str, id: &CategoryId) -> Result<(), BackendError> {
        let path = format!("/categories/{id}");
        self.execute(self.http().delete(self.url(&path)).bearer_auth(token))
            .await?;
        self.invalidate_catalog().await;
        Ok(())
    }
}
