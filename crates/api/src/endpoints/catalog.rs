//! Reference data endpoints.

use axum::{Router, extract::State, routing::get};
use cidadao_common::AppResult;
use cidadao_db::entities::{category, neighborhood};

use crate::{middleware::AppState, response::ApiResponse};

/// List categories.
async fn categories(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<category::Model>>> {
    let categories = state.catalog_service.categories().await?;
    Ok(ApiResponse::ok(categories))
}

/// List neighborhoods.
async fn neighborhoods(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<neighborhood::Model>>> {
    let neighborhoods = state.catalog_service.neighborhoods().await?;
    Ok(ApiResponse::ok(neighborhoods))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories))
        .route("/neighborhoods", get(neighborhoods))
}
