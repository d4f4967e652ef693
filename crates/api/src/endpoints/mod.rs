//! API endpoints.

mod auth;
mod catalog;
mod health;
mod officials;
mod requests;
mod upload;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router. Mounted under `/api` by the server.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/requests", requests::router())
        .nest("/officials", officials::router())
        .merge(catalog::router())
        .merge(upload::router())
        .merge(health::router())
}
