//! Official endpoints.

use axum::{Router, extract::State, routing::get};
use cidadao_common::AppResult;
use cidadao_core::{GlobalStats, OfficialProfile};
use cidadao_db::entities::request::RequestStatus;
use serde::{Deserialize, Serialize};

use super::requests::RequestsResponse;
use crate::{
    extractors::{ApiPath, ApiQuery},
    middleware::AppState,
    response::ApiResponse,
};

/// Ranking query. Every period yields the same all-time ranking.
#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub ranking: Option<String>,
}

/// Status filter for an official's requests.
#[derive(Debug, Deserialize)]
pub struct OfficialRequestsQuery {
    pub status: Option<RequestStatus>,
}

/// Ranked officials.
#[derive(Serialize)]
pub struct OfficialsResponse {
    pub officials: Vec<OfficialProfile>,
    pub total: usize,
}

/// Officials ranked by resolution rate.
async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RankingQuery>,
) -> AppResult<ApiResponse<OfficialsResponse>> {
    if let Some(ranking) = query.ranking.as_deref() {
        tracing::debug!(ranking, "Ranking period requested");
    }

    let officials = state.official_service.ranking().await?;
    Ok(ApiResponse::ok(OfficialsResponse {
        total: officials.len(),
        officials,
    }))
}

/// Statistics across all officials.
async fn stats(State(state): State<AppState>) -> AppResult<ApiResponse<GlobalStats>> {
    let stats = state.official_service.global_stats().await?;
    Ok(ApiResponse::ok(stats))
}

/// One official with statistics.
async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<ApiResponse<OfficialProfile>> {
    let profile = state.official_service.profile(id).await?;
    Ok(ApiResponse::ok(profile))
}

/// Requests claimed by an official.
async fn requests(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<OfficialRequestsQuery>,
) -> AppResult<ApiResponse<RequestsResponse>> {
    let requests = state
        .request_service
        .list_for_official(id, query.status)
        .await?;
    Ok(ApiResponse::ok(requests.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/stats", get(stats))
        .route("/{id}", get(show))
        .route("/{id}/requests", get(requests))
}
