use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{Product, ProductInput, touch},
    repository::ProductRepository,
};

/// PostgreSQL-backed product repository
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn live() -> sea_orm::Select<entity::Entity> {
        entity::Entity::find().filter(entity::Column::DeletedAt.is_null())
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get_all(&self) -> ProductResult<Vec<Product>> {
        let models = Self::live()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn create(&self, input: ProductInput) -> ProductResult<Product> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Product> {
        Self::live()
            .filter(entity::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .map(Into::into)
            .ok_or(ProductError::NotFound(id))
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        let id = product.id;
        let changes = entity::ActiveModel {
            title: Set(product.title),
            description: Set(product.description),
            price: Set(product.price),
            updated_at: Set(touch(product.updated_at).into()),
            ..Default::default()
        };

        // Single UPDATE ... RETURNING so a concurrent soft delete cannot slip in between
        let updated = entity::Entity::update_many()
            .set(changes)
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db)
            .await?;

        let model = updated
            .into_iter()
            .next()
            .ok_or(ProductError::NotFound(id))?;

        tracing::info!(product_id = id, "Updated product");
        Ok(model.into())
    }

    async fn delete(&self, id: i64) -> ProductResult<()> {
        let tombstone = entity::ActiveModel {
            deleted_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        let result = entity::Entity::update_many()
            .set(tombstone)
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(())
    }
}
