//! Service request lifecycle and queries.

use std::collections::HashMap;

use chrono::Utc;
use cidadao_common::{AppError, AppResult};
use cidadao_db::{
    entities::{
        request::{self, RequestStatus, encode_photos},
        user,
    },
    repositories::{
        CategoryRepository, NeighborhoodRepository, OfficialRepository, RequestFilter,
        RequestRepository, UserRepository,
    },
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;
use validator::Validate;

/// Default number of requests returned by [`RequestService::recent`].
pub const DEFAULT_RECENT_LIMIT: u64 = 10;

/// Upper bound for [`RequestService::recent`].
pub const MAX_RECENT_LIMIT: u64 = 100;

/// Search criteria as supplied by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestQuery {
    /// Category name.
    pub category: Option<String>,
    /// Neighborhood name.
    pub neighborhood: Option<String>,
    pub status: Option<RequestStatus>,
    pub official_id: Option<i32>,
    pub search: Option<String>,
}

/// Input for creating a request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRequestInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub category_id: i32,

    #[validate(length(min = 1))]
    pub description: String,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    /// Neighborhood name, created on first use.
    #[validate(length(max = 100))]
    pub neighborhood: Option<String>,

    #[validate(length(max = 20))]
    pub postal_code: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    #[serde(default)]
    pub photos: Vec<String>,

    #[serde(default)]
    pub anonymous: bool,
}

/// Input for updating a request.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRequestInput {
    pub status: Option<RequestStatus>,

    /// `Some(None)` unclaims the request.
    #[serde(default, deserialize_with = "double_option")]
    pub official_id: Option<Option<i32>>,

    #[validate(length(min = 1))]
    pub description: Option<String>,
}

/// Distinguish an explicit `null` from an absent field.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A request as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub id: i32,
    pub title: String,
    pub category_id: i32,
    pub category: Option<String>,
    pub description: String,
    pub address: Option<String>,
    pub neighborhood_id: Option<i32>,
    pub neighborhood: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photos: Vec<String>,
    pub status: RequestStatus,
    pub anonymous: bool,
    pub official_id: Option<i32>,
    pub official_name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub resolution_time_days: Option<i32>,
    /// Only present on single-request reads of non-anonymous requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitter: Option<user::Model>,
}

/// Names looked up for a batch of requests.
#[derive(Default)]
struct Names {
    categories: HashMap<i32, String>,
    neighborhoods: HashMap<i32, String>,
    officials: HashMap<i32, String>,
}

impl RequestView {
    fn build(model: request::Model, names: &Names) -> Self {
        let photos = model.photo_urls();
        Self {
            id: model.id,
            title: model.title,
            category_id: model.category_id,
            category: names.categories.get(&model.category_id).cloned(),
            description: model.description,
            address: model.address,
            neighborhood_id: model.neighborhood_id,
            neighborhood: model
                .neighborhood_id
                .and_then(|id| names.neighborhoods.get(&id).cloned()),
            postal_code: model.postal_code,
            latitude: model.latitude,
            longitude: model.longitude,
            photos,
            status: model.status,
            anonymous: model.anonymous,
            official_id: model.official_id,
            official_name: model
                .official_id
                .and_then(|id| names.officials.get(&id).cloned()),
            created_at: model.created_at,
            updated_at: model.updated_at,
            resolution_time_days: model.resolution_time_days,
            submitter: None,
        }
    }
}

/// Whole days between creation and resolution, never negative.
#[must_use]
pub fn resolution_days(created_at: DateTimeWithTimeZone, resolved_at: DateTimeWithTimeZone) -> i32 {
    let days = resolved_at.signed_duration_since(created_at).num_days();
    i32::try_from(days.max(0)).unwrap_or(i32::MAX)
}

/// Whether the current user may update a request.
#[must_use]
pub fn can_update(user: &user::Model, request: &request::Model) -> bool {
    user.is_official() || request.user_id == user.id
}

/// Request service for business logic.
#[derive(Clone)]
pub struct RequestService {
    request_repo: RequestRepository,
    category_repo: CategoryRepository,
    neighborhood_repo: NeighborhoodRepository,
    official_repo: OfficialRepository,
    user_repo: UserRepository,
}

impl RequestService {
    /// Create a new request service.
    #[must_use]
    pub const fn new(
        request_repo: RequestRepository,
        category_repo: CategoryRepository,
        neighborhood_repo: NeighborhoodRepository,
        official_repo: OfficialRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            request_repo,
            category_repo,
            neighborhood_repo,
            official_repo,
            user_repo,
        }
    }

    /// Search requests, newest first.
    ///
    /// Category and neighborhood are matched by exact name. A name that does
    /// not exist leaves that criterion out instead of matching nothing.
    pub async fn list(&self, query: RequestQuery) -> AppResult<Vec<RequestView>> {
        let mut filter = RequestFilter {
            status: query.status,
            official_id: query.official_id,
            search: query.search.filter(|s| !s.is_empty()),
            ..Default::default()
        };

        if let Some(name) = query.category.as_deref().filter(|s| !s.is_empty()) {
            filter.category_id = self.category_repo.find_by_name(name).await?.map(|c| c.id);
        }

        if let Some(name) = query.neighborhood.as_deref().filter(|s| !s.is_empty()) {
            filter.neighborhood_id = self
                .neighborhood_repo
                .find_by_name(name)
                .await?
                .map(|n| n.id);
        }

        let requests = self.request_repo.search(&filter).await?;
        self.views(requests).await
    }

    /// The newest requests.
    pub async fn recent(&self, limit: Option<u64>) -> AppResult<Vec<RequestView>> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .clamp(1, MAX_RECENT_LIMIT);

        let requests = self.request_repo.find_recent(limit).await?;
        self.views(requests).await
    }

    /// A single request, with its submitter unless it was filed anonymously.
    pub async fn get(&self, id: i32) -> AppResult<RequestView> {
        let request = self
            .request_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {id}")))?;

        let submitter = if request.anonymous {
            None
        } else {
            self.user_repo.find_by_id(request.user_id).await?
        };

        let mut view = self.view(request).await?;
        view.submitter = submitter;
        Ok(view)
    }

    /// Requests claimed by an official.
    pub async fn list_for_official(
        &self,
        official_id: i32,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<RequestView>> {
        self.official_repo.get_by_id(official_id).await?;

        let requests = self
            .request_repo
            .search(&RequestFilter {
                official_id: Some(official_id),
                status,
                ..Default::default()
            })
            .await?;

        self.views(requests).await
    }

    /// File a new request on behalf of `user`.
    pub async fn create(
        &self,
        user: &user::Model,
        input: CreateRequestInput,
    ) -> AppResult<RequestView> {
        input.validate()?;

        let title = input.title.trim().to_string();
        let description = input.description.trim().to_string();
        if title.is_empty() || description.is_empty() {
            return Err(AppError::Validation(
                "title and description must not be blank".to_string(),
            ));
        }

        let txn = self.request_repo.begin().await?;

        self.category_repo
            .find_by_id(&txn, input.category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {}", input.category_id)))?;

        let neighborhood_id = match input
            .neighborhood
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(name) => Some(self.neighborhood_repo.get_or_create(&txn, name).await?.id),
            None => None,
        };

        let now: DateTimeWithTimeZone = Utc::now().into();
        let model = request::ActiveModel {
            title: Set(title),
            category_id: Set(input.category_id),
            description: Set(description),
            address: Set(input.address),
            neighborhood_id: Set(neighborhood_id),
            postal_code: Set(input.postal_code),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            photos: Set(Some(encode_photos(&input.photos))),
            status: Set(RequestStatus::Open),
            anonymous: Set(input.anonymous),
            user_id: Set(user.id),
            official_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            resolution_time_days: Set(None),
            ..Default::default()
        };

        let created = self.request_repo.create(&txn, model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        info!(request_id = created.id, user_id = user.id, "Created request");

        self.view(created).await
    }

    /// Update status, claiming official or description of a request.
    pub async fn update(
        &self,
        user: &user::Model,
        id: i32,
        input: UpdateRequestInput,
    ) -> AppResult<RequestView> {
        input.validate()?;

        let description = match input.description.as_deref().map(str::trim) {
            Some("") => {
                return Err(AppError::Validation(
                    "description must not be blank".to_string(),
                ));
            }
            Some(text) => Some(text.to_string()),
            None => None,
        };

        let txn = self.request_repo.begin().await?;

        let existing = self.request_repo.get_by_id_on(&txn, id).await?;

        if !can_update(user, &existing) {
            return Err(AppError::Forbidden(
                "Only the submitter or an official may update this request".to_string(),
            ));
        }

        if let Some(Some(official_id)) = input.official_id {
            self.official_repo
                .find_by_id_on(&txn, official_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Official {official_id}")))?;
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let previous_status = existing.status;
        let created_at = existing.created_at;

        let mut model: request::ActiveModel = existing.into();

        if let Some(status) = input.status {
            model.status = Set(status);
            if status == RequestStatus::Resolved && previous_status != RequestStatus::Resolved {
                model.resolution_time_days = Set(Some(resolution_days(created_at, now)));
            }
        }

        if let Some(official_id) = input.official_id {
            model.official_id = Set(official_id);
        }

        if let Some(description) = description {
            model.description = Set(description);
        }

        model.updated_at = Set(now);

        let updated = self.request_repo.update(&txn, model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if updated.status == RequestStatus::Resolved && previous_status != RequestStatus::Resolved {
            info!(
                request_id = updated.id,
                days = ?updated.resolution_time_days,
                "Request resolved"
            );
        }

        self.view(updated).await
    }

    async fn view(&self, request: request::Model) -> AppResult<RequestView> {
        let mut views = self.views(vec![request]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("Request view lost".to_string()))
    }

    async fn views(&self, requests: Vec<request::Model>) -> AppResult<Vec<RequestView>> {
        if requests.is_empty() {
            return Ok(vec![]);
        }

        let names = self.names_for(&requests).await?;
        Ok(requests
            .into_iter()
            .map(|r| RequestView::build(r, &names))
            .collect())
    }

    async fn names_for(&self, requests: &[request::Model]) -> AppResult<Names> {
        let mut neighborhood_ids: Vec<i32> =
            requests.iter().filter_map(|r| r.neighborhood_id).collect();
        neighborhood_ids.sort_unstable();
        neighborhood_ids.dedup();

        let mut official_ids: Vec<i32> = requests.iter().filter_map(|r| r.official_id).collect();
        official_ids.sort_unstable();
        official_ids.dedup();

        let categories = self
            .category_repo
            .find_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let neighborhoods = self
            .neighborhood_repo
            .find_by_ids(&neighborhood_ids)
            .await?
            .into_iter()
            .map(|n| (n.id, n.name))
            .collect();

        let officials = self
            .official_repo
            .find_by_ids(&official_ids)
            .await?
            .into_iter()
            .map(|o| (o.id, o.name))
            .collect();

        Ok(Names {
            categories,
            neighborhoods,
            officials,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cidadao_db::entities::{category, neighborhood, official, user::UserRole};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> RequestService {
        let db = Arc::new(db);
        RequestService::new(
            RequestRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    fn test_user(id: i32, role: UserRole) -> user::Model {
        user::Model {
            id,
            email: format!("user{id}@email.com"),
            password_hash: "hash".to_string(),
            name: format!("Usuário {id}"),
            role,
            phone: None,
            created_at: Utc::now().into(),
        }
    }

    fn test_request(id: i32, user_id: i32, status: RequestStatus) -> request::Model {
        let created: DateTimeWithTimeZone = (Utc::now() - Duration::days(3)).into();
        request::Model {
            id,
            title: "Poste apagado".to_string(),
            category_id: 2,
            description: "Poste sem luz há uma semana".to_string(),
            address: Some("Rua das Flores, 10".to_string()),
            neighborhood_id: None,
            postal_code: None,
            latitude: None,
            longitude: None,
            photos: Some(r#"["/uploads/a.jpg"]"#.to_string()),
            status,
            anonymous: false,
            user_id,
            official_id: None,
            created_at: created,
            updated_at: created,
            resolution_time_days: None,
        }
    }

    fn iluminacao() -> category::Model {
        category::Model {
            id: 2,
            name: "Iluminação".to_string(),
            icon: Some("lightbulb".to_string()),
        }
    }

    fn create_input() -> CreateRequestInput {
        CreateRequestInput {
            title: "Poste apagado".to_string(),
            category_id: 2,
            description: "Poste sem luz há uma semana".to_string(),
            address: None,
            neighborhood: None,
            postal_code: None,
            latitude: None,
            longitude: None,
            photos: vec![],
            anonymous: false,
        }
    }

    #[test]
    fn test_resolution_days_floors() {
        let created: DateTimeWithTimeZone = Utc::now().into();
        let later = created + Duration::hours(71);

        assert_eq!(resolution_days(created, later), 2);
        assert_eq!(resolution_days(created, created), 0);
        assert_eq!(resolution_days(later, created), 0);
    }

    #[test]
    fn test_can_update() {
        let request = test_request(1, 5, RequestStatus::Open);

        assert!(can_update(&test_user(5, UserRole::Citizen), &request));
        assert!(can_update(&test_user(9, UserRole::Official), &request));
        assert!(!can_update(&test_user(9, UserRole::Citizen), &request));
    }

    #[test]
    fn test_update_input_distinguishes_null_official() {
        let unclaim: UpdateRequestInput = serde_json::from_str(r#"{"official_id": null}"#).unwrap();
        assert_eq!(unclaim.official_id, Some(None));

        let absent: UpdateRequestInput = serde_json::from_str(r#"{"status": "resolved"}"#).unwrap();
        assert_eq!(absent.official_id, None);
        assert_eq!(absent.status, Some(RequestStatus::Resolved));

        let claim: UpdateRequestInput = serde_json::from_str(r#"{"official_id": 4}"#).unwrap();
        assert_eq!(claim.official_id, Some(Some(4)));
    }

    #[tokio::test]
    async fn test_create_returns_open_request() {
        let caller = test_user(7, UserRole::Citizen);
        let mut created = test_request(11, 7, RequestStatus::Open);
        created.photos = Some("[]".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[iluminacao()]])
            .append_query_results([[created]])
            .append_query_results([[iluminacao()]])
            .into_connection();

        let view = service(db).create(&caller, create_input()).await.unwrap();

        assert_eq!(view.status, RequestStatus::Open);
        assert_eq!(view.category.as_deref(), Some("Iluminação"));
        assert!(view.photos.is_empty());
        assert!(view.submitter.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["neighborhood"].is_null());
        assert!(json["neighborhood_id"].is_null());
    }

    #[tokio::test]
    async fn test_create_insert_uses_caller_and_open_status() {
        let caller = test_user(7, UserRole::Citizen);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[iluminacao()]])
                .append_query_results([[test_request(11, 7, RequestStatus::Open)]])
                .append_query_results([[iluminacao()]])
                .into_connection(),
        );
        let service = RequestService::new(
            RequestRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
        );

        service.create(&caller, create_input()).await.unwrap();
        drop(service);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("INSERT INTO \\\"request\\\""));
        assert!(log.contains("String(Some(\"open\"))"));
        assert!(log.contains("Int(Some(7))"));
        // No neighborhood was given, so none is created.
        assert!(!log.contains("INSERT INTO \\\"neighborhood\\\""));
    }

    #[tokio::test]
    async fn test_create_with_neighborhood_gets_or_creates_it() {
        let caller = test_user(7, UserRole::Citizen);
        let mut created = test_request(12, 7, RequestStatus::Open);
        created.neighborhood_id = Some(3);
        let centro = neighborhood::Model {
            id: 3,
            name: "Centro".to_string(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[iluminacao()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 3,
                rows_affected: 1,
            }])
            .append_query_results([[centro.clone()]])
            .append_query_results([[created]])
            .append_query_results([[iluminacao()]])
            .append_query_results([[centro]])
            .into_connection();

        let mut input = create_input();
        input.neighborhood = Some("Centro".to_string());

        let view = service(db).create(&caller, input).await.unwrap();

        assert_eq!(view.neighborhood_id, Some(3));
        assert_eq!(view.neighborhood.as_deref(), Some("Centro"));
    }

    #[tokio::test]
    async fn test_create_unknown_category_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()])
            .into_connection();

        let result = service(db)
            .create(&test_user(1, UserRole::Citizen), create_input())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_blank_description_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut input = create_input();
        input.description = "   ".to_string();

        let result = service(db)
            .create(&test_user(1, UserRole::Citizen), input)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_by_stranger_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_request(1, 5, RequestStatus::Open)]])
            .into_connection();

        let result = service(db)
            .update(
                &test_user(6, UserRole::Citizen),
                1,
                UpdateRequestInput {
                    description: Some("Outro texto".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_missing_request_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<request::Model>::new()])
            .into_connection();

        let result = service(db)
            .update(
                &test_user(6, UserRole::Official),
                99,
                UpdateRequestInput::default(),
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_to_resolved_stamps_resolution_time() {
        let existing = test_request(1, 5, RequestStatus::InProgress);
        let mut updated = existing.clone();
        updated.status = RequestStatus::Resolved;
        updated.resolution_time_days = Some(3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[updated]])
                .append_query_results([[iluminacao()]])
                .into_connection(),
        );
        let service = RequestService::new(
            RequestRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
        );

        let view = service
            .update(
                &test_user(6, UserRole::Official),
                1,
                UpdateRequestInput {
                    status: Some(RequestStatus::Resolved),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(view.resolution_time_days, Some(3));
        drop(service);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("\\\"resolution_time_days\\\" = "));
        assert!(log.contains("Int(Some(3))"));
    }

    #[tokio::test]
    async fn test_update_resolved_to_resolved_keeps_resolution_time() {
        let mut existing = test_request(1, 5, RequestStatus::Resolved);
        existing.resolution_time_days = Some(1);
        let updated = existing.clone();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[updated]])
                .append_query_results([[iluminacao()]])
                .into_connection(),
        );
        let service = RequestService::new(
            RequestRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
        );

        let view = service
            .update(
                &test_user(5, UserRole::Citizen),
                1,
                UpdateRequestInput {
                    status: Some(RequestStatus::Resolved),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(view.resolution_time_days, Some(1));
        drop(service);

        // The UPDATE statement only touches changed columns.
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(!log.contains("\\\"resolution_time_days\\\" = "));
    }

    #[tokio::test]
    async fn test_update_to_in_progress_leaves_resolution_time_unset() {
        let existing = test_request(1, 5, RequestStatus::Open);
        let mut updated = existing.clone();
        updated.status = RequestStatus::InProgress;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[updated]])
                .append_query_results([[iluminacao()]])
                .into_connection(),
        );
        let service = RequestService::new(
            RequestRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
        );

        let view = service
            .update(
                &test_user(6, UserRole::Official),
                1,
                UpdateRequestInput {
                    status: Some(RequestStatus::InProgress),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(view.status, RequestStatus::InProgress);
        assert!(view.resolution_time_days.is_none());
        drop(service);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("String(Some(\"in_progress\"))"));
        assert!(!log.contains("\\\"resolution_time_days\\\" = "));
    }

    #[tokio::test]
    async fn test_update_blank_description_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = RequestService::new(
            RequestRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
        );

        let result = service
            .update(
                &test_user(5, UserRole::Citizen),
                1,
                UpdateRequestInput {
                    description: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        drop(service);

        // Rejected before any statement runs.
        assert!(Arc::try_unwrap(db).unwrap().into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_update_claim_unknown_official_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_request(1, 5, RequestStatus::Open)]])
            .append_query_results([Vec::<official::Model>::new()])
            .into_connection();

        let result = service(db)
            .update(
                &test_user(6, UserRole::Official),
                1,
                UpdateRequestInput {
                    official_id: Some(Some(42)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_unknown_category_passes_through() {
        let all = vec![
            test_request(2, 5, RequestStatus::Open),
            test_request(1, 6, RequestStatus::Resolved),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .append_query_results([all])
                .append_query_results([[iluminacao()]])
                .into_connection(),
        );
        let service = RequestService::new(
            RequestRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
        );

        let views = service
            .list(RequestQuery {
                category: Some("Inexistente".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(views.len(), 2);
        drop(service);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let search = format!("{:?}", log[1]);
        assert!(!search.contains("\\\"category_id\\\" ="));
    }

    #[tokio::test]
    async fn test_recent_limit_is_clamped() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<request::Model>::new()])
                .into_connection(),
        );
        let service = RequestService::new(
            RequestRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
        );

        assert!(service.recent(Some(500)).await.unwrap().is_empty());
        drop(service);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let query = format!("{:?}", log[0]);
        assert!(query.contains("LIMIT"));
        assert!(query.contains("Some(100)"));
    }

    #[tokio::test]
    async fn test_list_unknown_neighborhood_passes_through() {
        let all = vec![
            test_request(2, 5, RequestStatus::Open),
            test_request(1, 6, RequestStatus::Resolved),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<neighborhood::Model>::new()])
                .append_query_results([all])
                .append_query_results([[iluminacao()]])
                .into_connection(),
        );
        let service = RequestService::new(
            RequestRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
        );

        let views = service
            .list(RequestQuery {
                neighborhood: Some("Bairro Fantasma".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(views.len(), 2);
        drop(service);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let search = format!("{:?}", log[1]);
        assert!(!search.contains("\\\"neighborhood_id\\\" ="));
    }

    #[tokio::test]
    async fn test_get_anonymous_hides_submitter() {
        let mut anonymous = test_request(3, 5, RequestStatus::Open);
        anonymous.anonymous = true;

        // No user query is expected; only the category lookup follows.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[anonymous]])
            .append_query_results([[iluminacao()]])
            .into_connection();

        let view = service(db).get(3).await.unwrap();

        assert!(view.submitter.is_none());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("submitter").is_none());
        assert!(json.get("user_id").is_none());
    }

    #[tokio::test]
    async fn test_get_includes_submitter() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_request(3, 5, RequestStatus::Open)]])
            .append_query_results([[test_user(5, UserRole::Citizen)]])
            .append_query_results([[iluminacao()]])
            .into_connection();

        let view = service(db).get(3).await.unwrap();

        assert_eq!(view.submitter.map(|u| u.id), Some(5));
        assert_eq!(view.photos, vec!["/uploads/a.jpg"]);
        assert!(view.neighborhood.is_none());
    }

    #[tokio::test]
    async fn test_list_for_unknown_official_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<official::Model>::new()])
            .into_connection();

        let result = service(db).list_for_official(8, None).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
