//! Short recipe links (`/s/{id}/`)

use crate::error::ApiResult;
use crate::extract::ApiPath;
use crate::services::RecipeService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

pub fn short_link_routes() -> Router<AppState> {
    Router::new().route("/s/:id/", get(follow_short_link))
}

/// 302 to the recipe page of the web UI
async fn follow_short_link(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Response> {
    RecipeService::ensure_exists(state.db(), id).await?;
    Ok((StatusCode::FOUND, [(header::LOCATION, format!("/recipes/{}/", id))]).into_response())
}
