//! Neighborhood repository.

use std::sync::Arc;

use crate::entities::{Neighborhood, neighborhood};
use cidadao_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::OnConflict,
};

/// Neighborhood repository for database operations.
#[derive(Clone)]
pub struct NeighborhoodRepository {
    db: Arc<DatabaseConnection>,
}

impl NeighborhoodRepository {
    /// Create a new neighborhood repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List all neighborhoods in name order.
    pub async fn find_all(&self) -> AppResult<Vec<neighborhood::Model>> {
        Neighborhood::find()
            .order_by_asc(neighborhood::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a neighborhood by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<neighborhood::Model>> {
        Neighborhood::find()
            .filter(neighborhood::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find neighborhoods by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<neighborhood::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Neighborhood::find()
            .filter(neighborhood::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Return the neighborhood with this name, creating it if needed.
    ///
    /// The insert is `ON CONFLICT (name) DO NOTHING`, so a concurrent creator
    /// of the same name never produces a second row or a unique violation.
    pub async fn get_or_create<C>(&self, conn: &C, name: &str) -> AppResult<neighborhood::Model>
    where
        C: ConnectionTrait,
    {
        let model = neighborhood::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        Neighborhood::insert(model)
            .on_conflict(
                OnConflict::column(neighborhood::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Neighborhood::find()
            .filter(neighborhood::Column::Name.eq(name))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Database(format!("Neighborhood {name} vanished after insert")))
    }
}
