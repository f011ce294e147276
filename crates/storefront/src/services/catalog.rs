//! Product catalog with a read-through cache.
//!
//! Product lookups by ID are cached using `moka` (5-minute TTL). Writes go
//! through this type so the cache never serves a product that was updated or
//! deleted on this instance.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use shopfront_core::{PageRequest, ProductId, UserId};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::product::{NewProduct, Product, ProductFilter, ProductUpdate};

/// Cached access to products.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    pool: PgPool,
    cache: Cache<ProductId, Product>,
}

impl Catalog {
    /// Create a catalog over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogInner { pool, cache }),
        }
    }

    fn repo(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.inner.pool)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        if let Some(product) = self.inner.cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(Some(product));
        }

        let product = self.repo().get_by_id(id).await?;
        if let Some(ref product) = product {
            self.inner.cache.insert(id, product.clone()).await;
        }
        Ok(product)
    }

    /// One page of the filtered catalog and the number of matches. Not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        self.repo().list(filter, page).await
    }

    /// All products owned by a user. Not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Product>, RepositoryError> {
        self.repo().list_by_owner(owner).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: UserId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let created = self.repo().create(owner, product).await?;
        self.inner.cache.insert(created.id, created.clone()).await;
        Ok(created)
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        self.invalidate(id).await;
        let updated = self.repo().update(id, update).await?;
        self.inner.cache.insert(id, updated.clone()).await;
        Ok(updated)
    }

    /// Delete a product, returning the deleted row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.invalidate(id).await;
        self.repo().delete(id).await
    }

    /// Drop a product from the cache.
    pub async fn invalidate(&self, id: ProductId) {
        self.inner.cache.invalidate(&id).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use shopfront_core::Price;
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn product(id: i32) -> Product {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Product {
            id: ProductId::new(id),
            name: "Teapot".to_string(),
            description: "Short and stout".to_string(),
            price: Price::parse("12.00").unwrap(),
            image: None,
            user_id: UserId::new(1),
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> Catalog {
        // Never connects: every lookup below is served from the cache.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        Catalog::new(pool)
    }

    #[tokio::test]
    async fn test_get_serves_cached_product() {
        let catalog = catalog();
        catalog
            .inner
            .cache
            .insert(ProductId::new(7), product(7))
            .await;

        let found = catalog.get(ProductId::new(7)).await.unwrap();
        assert_eq!(found, Some(product(7)));
    }

    #[tokio::test]
    async fn test_invalidate_evicts() {
        let catalog = catalog();
        catalog
            .inner
            .cache
            .insert(ProductId::new(3), product(3))
            .await;

        catalog.invalidate(ProductId::new(3)).await;
        assert!(catalog.inner.cache.get(&ProductId::new(3)).await.is_none());
    }
}
