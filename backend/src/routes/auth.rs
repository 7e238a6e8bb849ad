//! Token authentication routes
//!
//! Login issues a JWT for `Authorization: Token <jwt>`; logout revokes the
//! token the request was made with.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use foodgram_shared::{AuthToken, LoginRequest};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token/login/", post(login))
        .route("/auth/token/logout/", post(logout))
}

/// POST /api/auth/token/login/
///
/// Password verification is offloaded to the blocking thread pool.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthToken>> {
    let token = UserService::login(state.db(), state.jwt(), &req.email, &req.password).await?;
    Ok(Json(token))
}

/// POST /api/auth/token/logout/
async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResult<StatusCode> {
    UserService::logout(state.db(), &auth).await?;
    Ok(StatusCode::NO_CONTENT)
}
