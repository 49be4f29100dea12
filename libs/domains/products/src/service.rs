//! Product Service - business façade between handlers and storage

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::error::ProductResult;
use crate::models::{Product, ProductInput};
use crate::repository::ProductRepository;

/// Operations the HTTP layer depends on.
///
/// Contracts mirror [`ProductRepository`] one to one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductOperations: Send + Sync {
    async fn get_all_products(&self) -> ProductResult<Vec<Product>>;

    async fn create_product(&self, input: ProductInput) -> ProductResult<Product>;

    async fn get_product_by_id(&self, id: i64) -> ProductResult<Product>;

    async fn update_product(&self, product: Product) -> ProductResult<Product>;

    async fn delete_product(&self, id: i64) -> ProductResult<()>;
}

/// Product service backed by a repository
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}

#[async_trait]
impl<R: ProductRepository> ProductOperations for ProductService<R> {
    #[instrument(skip(self))]
    async fn get_all_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.get_all().await
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn create_product(&self, input: ProductInput) -> ProductResult<Product> {
        self.repository.create(input).await
    }

    #[instrument(skip(self))]
    async fn get_product_by_id(&self, id: i64) -> ProductResult<Product> {
        self.repository.get_by_id(id).await
    }

    #[instrument(skip(self, product), fields(product_id = product.id))]
    async fn update_product(&self, product: Product) -> ProductResult<Product> {
        self.repository.update(product).await
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: i64) -> ProductResult<()> {
        self.repository.delete(id).await
    }
}
