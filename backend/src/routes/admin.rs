//! Staff-only administrative surface under `/admin/`

use crate::auth::StaffUser;
use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::services::{AdminService, IngredientService, RecipeService};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use foodgram_shared::{
    AdminRecipeRow, AdminSearchQuery, AdminSummary, AdminUserRow, CreateIngredientRequest,
    IngredientResponse,
};
use tracing::info;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/", get(summary))
        .route("/admin/recipes/", get(recipes))
        .route("/admin/recipes/:id/", delete(delete_recipe))
        .route("/admin/users/", get(users))
        .route("/admin/ingredients/", post(create_ingredient))
}

async fn summary(State(state): State<AppState>, _staff: StaffUser) -> ApiResult<Json<AdminSummary>> {
    Ok(Json(AdminService::summary(state.db()).await?))
}

/// GET /admin/recipes/?search= - name or author username
async fn recipes(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(query): ApiQuery<AdminSearchQuery>,
) -> ApiResult<Json<Vec<AdminRecipeRow>>> {
    Ok(Json(AdminService::recipes(state.db(), query.search.as_deref()).await?))
}

async fn delete_recipe(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    RecipeService::delete_any(state.db(), state.media(), id).await?;
    info!(recipe_id = id, staff_id = staff.user_id, "Recipe removed by staff");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/users/?search= - email or username
async fn users(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(query): ApiQuery<AdminSearchQuery>,
) -> ApiResult<Json<Vec<AdminUserRow>>> {
    Ok(Json(AdminService::users(state.db(), query.search.as_deref()).await?))
}

async fn create_ingredient(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(req): Json<CreateIngredientRequest>,
) -> ApiResult<(StatusCode, Json<IngredientResponse>)> {
    let ingredient = IngredientService::create(state.db(), req).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}
