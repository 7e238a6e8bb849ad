//! Ingredient lookup routes (unpaginated)

use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::services::IngredientService;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use foodgram_shared::{IngredientResponse, IngredientSearchQuery};

pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients/", get(list_ingredients))
        .route("/ingredients/:id/", get(get_ingredient))
}

/// GET /api/ingredients/?name= - Case-insensitive prefix search
async fn list_ingredients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IngredientSearchQuery>,
) -> ApiResult<Json<Vec<IngredientResponse>>> {
    let ingredients = IngredientService::search(state.db(), query.name.as_deref()).await?;
    Ok(Json(ingredients))
}

async fn get_ingredient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<IngredientResponse>> {
    Ok(Json(IngredientService::get(state.db(), id).await?))
}
