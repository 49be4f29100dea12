use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductInput, touch};

/// Repository trait for Product persistence
///
/// Soft-deleted products are invisible to every operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All live products, ordered by id
    async fn get_all(&self) -> ProductResult<Vec<Product>>;

    /// Insert a product and return it with its generated id and timestamps
    async fn create(&self, input: ProductInput) -> ProductResult<Product>;

    /// Get a live product by ID
    async fn get_by_id(&self, id: i64) -> ProductResult<Product>;

    /// Persist title, description and price of `product`, refreshing `updated_at`
    async fn update(&self, product: Product) -> ProductResult<Product>;

    /// Soft-delete a product. Unknown or already deleted ids are not an error.
    async fn delete(&self, id: i64) -> ProductResult<()>;
}

#[derive(Debug, Default)]
struct Store {
    products: BTreeMap<i64, Product>,
    last_id: i64,
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_all(&self) -> ProductResult<Vec<Product>> {
        let store = self.store.read().await;

        Ok(store
            .products
            .values()
            .filter(|p| p.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn create(&self, input: ProductInput) -> ProductResult<Product> {
        let mut store = self.store.write().await;
        store.last_id += 1;

        let now = Utc::now();
        let product = Product {
            id: store.last_id,
            title: input.title,
            description: input.description,
            price: input.price,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Product> {
        let store = self.store.read().await;

        store
            .products
            .get(&id)
            .filter(|p| p.deleted_at.is_none())
            .cloned()
            .ok_or(ProductError::NotFound(id))
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        let stored = store
            .products
            .get_mut(&product.id)
            .filter(|p| p.deleted_at.is_none())
            .ok_or(ProductError::NotFound(product.id))?;

        stored.title = product.title;
        stored.description = product.description;
        stored.price = product.price;
        stored.updated_at = touch(stored.updated_at);

        tracing::info!(product_id = stored.id, "Updated product");
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> ProductResult<()> {
        let mut store = self.store.write().await;

        if let Some(product) = store
            .products
            .get_mut(&id)
            .filter(|p| p.deleted_at.is_none())
        {
            product.deleted_at = Some(Utc::now());
            tracing::info!(product_id = id, "Deleted product");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(title: &str) -> ProductInput {
        ProductInput {
            title: title.to_string(),
            description: format!("{title} description"),
            price: Decimal::new(1999, 2),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = InMemoryProductRepository::new();

        let first = repo.create(input("Bulbasaur")).await.unwrap();
        let second = repo.create(input("Charmander")).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(first.created_at, first.updated_at);
        assert!(first.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let repo = InMemoryProductRepository::new();

        let created = repo.create(input("Squirtle")).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap();

        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_not_found() {
        let repo = InMemoryProductRepository::new();

        let result = repo.get_by_id(999).await;
        assert!(matches!(result, Err(ProductError::NotFound(999))));
    }

    #[tokio::test]
    async fn test_get_all_is_ordered_and_skips_deleted() {
        let repo = InMemoryProductRepository::new();
        let a = repo.create(input("A")).await.unwrap();
        let b = repo.create(input("B")).await.unwrap();
        let c = repo.create(input("C")).await.unwrap();

        repo.delete(b.id).await.unwrap();

        let ids: Vec<i64> = repo.get_all().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[tokio::test]
    async fn test_delete_hides_product_and_is_idempotent() {
        let repo = InMemoryProductRepository::new();
        let product = repo.create(input("Pikachu")).await.unwrap();

        repo.delete(product.id).await.unwrap();
        repo.delete(product.id).await.unwrap();
        repo.delete(12345).await.unwrap();

        assert!(matches!(
            repo.get_by_id(product.id).await,
            Err(ProductError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_advances_timestamp() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(input("Eevee")).await.unwrap();

        let mut changed = created.clone();
        changed.title = "Vaporeon".to_string();
        changed.price = Decimal::new(4500, 2);
        let updated = repo.update(changed).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.title, "Vaporeon");
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_ignores_client_timestamps() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(input("Snorlax")).await.unwrap();

        let mut changed = created.clone();
        changed.created_at = Utc::now() + chrono::Duration::days(1);
        let updated = repo.update(changed).await.unwrap();

        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_deleted_product_is_not_found() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(input("Mew")).await.unwrap();
        repo.delete(created.id).await.unwrap();

        let result = repo.update(created).await;
        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }
}
