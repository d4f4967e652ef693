//! Official repository.

use std::sync::Arc;

use crate::entities::{Official, official};
use cidadao_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

/// Official repository for database operations.
#[derive(Clone)]
pub struct OfficialRepository {
    db: Arc<DatabaseConnection>,
}

impl OfficialRepository {
    /// Create a new official repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an official by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<official::Model>> {
        Official::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an official by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<official::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Official {id}")))
    }

    /// Find an official by ID on the given connection.
    pub async fn find_by_id_on<C>(&self, conn: &C, id: i32) -> AppResult<Option<official::Model>>
    where
        C: ConnectionTrait,
    {
        Official::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the official profile linked to a user account.
    pub async fn find_by_user_id(&self, user_id: i32) -> AppResult<Option<official::Model>> {
        Official::find()
            .filter(official::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every official in ID order.
    pub async fn find_all(&self) -> AppResult<Vec<official::Model>> {
        Official::find()
            .order_by_asc(official::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find officials by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<official::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Official::find()
            .filter(official::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count officials.
    pub async fn count(&self) -> AppResult<u64> {
        Official::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an official on the given connection.
    pub async fn create<C>(
        &self,
        conn: &C,
        model: official::ActiveModel,
    ) -> AppResult<official::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
