//! Service request endpoints.

use axum::{
    Router,
    extract::State,
    routing::get,
};
use cidadao_common::AppResult;
use cidadao_core::{CreateRequestInput, RequestQuery, RequestView, UpdateRequestInput};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{ApiJson, ApiPath, ApiQuery, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// A list of requests.
#[derive(Serialize)]
pub struct RequestsResponse {
    pub requests: Vec<RequestView>,
    pub total: usize,
}

impl From<Vec<RequestView>> for RequestsResponse {
    fn from(requests: Vec<RequestView>) -> Self {
        Self {
            total: requests.len(),
            requests,
        }
    }
}

/// Query for the recent list.
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u64>,
}

/// Search requests.
async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RequestQuery>,
) -> AppResult<ApiResponse<RequestsResponse>> {
    let requests = state.request_service.list(query).await?;
    Ok(ApiResponse::ok(requests.into()))
}

/// Newest requests.
async fn recent(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecentQuery>,
) -> AppResult<ApiResponse<RequestsResponse>> {
    let requests = state.request_service.recent(query.limit).await?;
    Ok(ApiResponse::ok(requests.into()))
}

/// A single request.
async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiResponse<RequestView>> {
    let request = state.request_service.get(id).await?;
    Ok(ApiResponse::ok(request))
}

/// File a new request.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateRequestInput>,
) -> AppResult<ApiResponse<RequestView>> {
    let request = state.request_service.create(&user, input).await?;
    Ok(ApiResponse::created(request))
}

/// Update a request.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<UpdateRequestInput>,
) -> AppResult<ApiResponse<RequestView>> {
    let request = state.request_service.update(&user, id, input).await?;
    Ok(ApiResponse::ok(request))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/recent", get(recent))
        .route("/{id}", get(show).put(update))
}
