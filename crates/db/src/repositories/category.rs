//! Category repository.

use std::sync::Arc;

use crate::entities::{Category, category};
use cidadao_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List all categories in ID order.
    pub async fn find_all(&self) -> AppResult<Vec<category::Model>> {
        Category::find()
            .order_by_asc(category::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by ID on the given connection.
    pub async fn find_by_id<C>(&self, conn: &C, id: i32) -> AppResult<Option<category::Model>>
    where
        C: ConnectionTrait,
    {
        Category::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count categories on the given connection.
    pub async fn count<C>(&self, conn: &C) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        Category::find()
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a category on the given connection.
    pub async fn create<C>(
        &self,
        conn: &C,
        model: category::ActiveModel,
    ) -> AppResult<category::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn category(id: i32, name: &str) -> category::Model {
        category::Model {
            id,
            name: name.to_string(),
            icon: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_name_exact() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[category(2, "Iluminação")]])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let found = repo.find_by_name("Iluminação").await.unwrap();

        assert_eq!(found.unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .into_connection(),
        );

        let repo = CategoryRepository::new(Arc::clone(&db));
        let found = repo.find_by_id(db.as_ref(), 77).await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(8)),
                }]])
                .into_connection(),
        );

        let repo = CategoryRepository::new(Arc::clone(&db));
        assert_eq!(repo.count(db.as_ref()).await.unwrap(), 8);
    }
}
