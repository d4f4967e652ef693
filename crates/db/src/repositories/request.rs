//! Service request repository.

use std::sync::Arc;

use crate::entities::{Request, category, request, request::RequestStatus};
use cidadao_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, TransactionTrait,
};

/// Resolved search criteria. Every field left as `None` is not applied.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub category_id: Option<i32>,
    pub neighborhood_id: Option<i32>,
    pub status: Option<RequestStatus>,
    pub official_id: Option<i32>,
    /// Substring matched against title, description and address.
    pub search: Option<String>,
    pub limit: Option<u64>,
}

/// Projection of a claimed request used by the statistics engine.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ClaimedRequestRow {
    pub id: i32,
    pub official_id: i32,
    pub user_id: i32,
    pub status: RequestStatus,
    pub category_id: i32,
    pub category_name: String,
    pub resolution_time_days: Option<i32>,
}

/// Escape LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Request repository for database operations.
#[derive(Clone)]
pub struct RequestRepository {
    db: Arc<DatabaseConnection>,
}

impl RequestRepository {
    /// Create a new request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Begin a transaction on the underlying pool.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<request::Model>> {
        Request::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a request by ID on the given connection, returning an error if not found.
    pub async fn get_by_id_on<C>(&self, conn: &C, id: i32) -> AppResult<request::Model>
    where
        C: ConnectionTrait,
    {
        Request::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Request {id}")))
    }

    /// Search requests, newest first.
    pub async fn search(&self, filter: &RequestFilter) -> AppResult<Vec<request::Model>> {
        let mut query = Request::find();

        if let Some(category_id) = filter.category_id {
            query = query.filter(request::Column::CategoryId.eq(category_id));
        }

        if let Some(neighborhood_id) = filter.neighborhood_id {
            query = query.filter(request::Column::NeighborhoodId.eq(neighborhood_id));
        }

        if let Some(status) = filter.status {
            query = query.filter(request::Column::Status.eq(status));
        }

        if let Some(official_id) = filter.official_id {
            query = query.filter(request::Column::OfficialId.eq(official_id));
        }

        if let Some(term) = filter.search.as_deref().filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(term));
            query = query.filter(
                Condition::any()
                    .add(request::Column::Title.like(&pattern))
                    .add(request::Column::Description.like(&pattern))
                    .add(request::Column::Address.like(&pattern)),
            );
        }

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        query
            .order_by_desc(request::Column::CreatedAt)
            .order_by_desc(request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Newest requests.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<request::Model>> {
        self.search(&RequestFilter {
            limit: Some(limit),
            ..Default::default()
        })
        .await
    }

    /// Insert a request on the given connection.
    pub async fn create<C>(&self, conn: &C, model: request::ActiveModel) -> AppResult<request::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a request on the given connection.
    pub async fn update<C>(&self, conn: &C, model: request::ActiveModel) -> AppResult<request::Model>
    where
        C: ConnectionTrait,
    {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Claimed requests projected for statistics, optionally for one official.
    pub async fn find_claimed_rows(
        &self,
        official_id: Option<i32>,
    ) -> AppResult<Vec<ClaimedRequestRow>> {
        let mut query = Request::find()
            .select_only()
            .column(request::Column::Id)
            .column(request::Column::OfficialId)
            .column(request::Column::UserId)
            .column(request::Column::Status)
            .column(request::Column::CategoryId)
            .column_as(category::Column::Name, "category_name")
            .column(request::Column::ResolutionTimeDays)
            .join(JoinType::InnerJoin, request::Relation::Category.def());

        query = match official_id {
            Some(id) => query.filter(request::Column::OfficialId.eq(id)),
            None => query.filter(request::Column::OfficialId.is_not_null()),
        };

        query
            .order_by_asc(request::Column::Id)
            .into_model::<ClaimedRequestRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
