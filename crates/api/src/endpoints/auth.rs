//! Authentication endpoints.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use cidadao_common::AppResult;
use cidadao_core::{LoginInput, OfficialProfile, RegisterInput, Session};
use cidadao_db::entities::user;
use serde::Serialize;

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Token and account returned by register and login.
#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: user::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_id: Option<i32>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.user,
            official_id: session.official.map(|o| o.id),
        }
    }
}

/// Current account.
#[derive(Serialize)]
pub struct MeResponse {
    pub user: user::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official: Option<OfficialProfile>,
}

/// Logout response.
#[derive(Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = state.auth_service.register(input).await?;
    Ok(ApiResponse::created(session.into()))
}

/// Log in with e-mail and password.
async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = state.auth_service.login(input).await?;
    Ok(ApiResponse::ok(session.into()))
}

/// The authenticated account, with the official profile for officials.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MeResponse>> {
    let official = if user.is_official() {
        state.official_service.profile_for_user(user.id).await?
    } else {
        None
    };

    Ok(ApiResponse::ok(MeResponse { user, official }))
}

/// Tokens are stateless; logging out is up to the client.
async fn logout(AuthUser(_user): AuthUser) -> ApiResponse<LogoutResponse> {
    ApiResponse::ok(LogoutResponse { ok: true })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
}
