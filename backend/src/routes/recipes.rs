//! Recipe routes: feed, CRUD, collections, short links and the shopping list

use super::paginate;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiPath, ApiQuery};
use crate::repositories::{RecipeCollection, RecipeFilter};
use crate::services::{RecipeService, ShoppingListFormat, ShoppingListService};
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use foodgram_shared::validation::is_truthy;
use foodgram_shared::{
    CreateRecipeRequest, LimitOffset, Paginated, RecipeListQuery, RecipeResponse,
    ShoppingListQuery, ShortLinkResponse, ShortRecipe, UpdateRecipeRequest,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/", get(list_recipes).post(create_recipe))
        .route("/recipes/download_shopping_cart/", get(download_shopping_cart))
        .route(
            "/recipes/:id/",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/:id/get-link/", get(get_link))
        .route(
            "/recipes/:id/favorite/",
            axum::routing::post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/recipes/:id/shopping_cart/",
            axum::routing::post(add_to_cart).delete(remove_from_cart),
        )
}

/// Translate feed query parameters into repository filters
///
/// The favorite and cart flags only apply to authenticated viewers.
fn recipe_filter(query: &RecipeListQuery, viewer: Option<i64>) -> Result<RecipeFilter, ApiError> {
    let author_id = match query.author.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ApiError::field("author", "Select a valid author id."))?,
        ),
    };

    let flag = |value: &Option<String>| viewer.and(value.as_deref().map(is_truthy));

    Ok(RecipeFilter {
        author_id,
        viewer_id: viewer,
        favorited: flag(&query.is_favorited),
        in_cart: flag(&query.is_in_shopping_cart),
    })
}

/// GET /api/recipes/ - Limit/offset paginated feed
async fn list_recipes(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<RecipeListQuery>,
) -> ApiResult<Json<Paginated<RecipeResponse>>> {
    let filter = recipe_filter(&query, viewer.user_id())?;
    let window = LimitOffset::new(query.limit, query.offset, state.config().site.page_size);

    let (recipes, count) =
        RecipeService::list(state.db(), state.media(), viewer.user_id(), filter, window).await?;

    Ok(Json(paginate(
        &state.config().site,
        &uri,
        recipes,
        count,
        window.next_params(count),
        window.previous_params(),
    )))
}

/// POST /api/recipes/
async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeResponse>)> {
    let recipe = RecipeService::create(state.db(), state.media(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn get_recipe(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<RecipeResponse>> {
    let recipe = RecipeService::get(state.db(), state.media(), viewer.user_id(), id).await?;
    Ok(Json(recipe))
}

/// PATCH /api/recipes/{id}/ - Author only
async fn update_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    Json(req): Json<UpdateRecipeRequest>,
) -> ApiResult<Json<RecipeResponse>> {
    let recipe = RecipeService::update(state.db(), state.media(), auth.user_id, id, req).await?;
    Ok(Json(recipe))
}

/// DELETE /api/recipes/{id}/ - Author only
async fn delete_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    RecipeService::delete(state.db(), state.media(), auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/recipes/{id}/get-link/
async fn get_link(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ShortLinkResponse>> {
    RecipeService::ensure_exists(state.db(), id).await?;
    Ok(Json(ShortLinkResponse {
        short_link: state.config().site.absolute(&format!("/s/{}/", id)),
    }))
}

async fn add_to_collection(
    state: &AppState,
    collection: RecipeCollection,
    user_id: i64,
    recipe_id: i64,
) -> ApiResult<(StatusCode, Json<ShortRecipe>)> {
    let recipe =
        RecipeService::add_to(state.db(), state.media(), collection, user_id, recipe_id).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn remove_from_collection(
    state: &AppState,
    collection: RecipeCollection,
    user_id: i64,
    recipe_id: i64,
) -> ApiResult<StatusCode> {
    RecipeService::remove_from(state.db(), collection, user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<(StatusCode, Json<ShortRecipe>)> {
    add_to_collection(&state, RecipeCollection::Favorites, auth.user_id, id).await
}

async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    remove_from_collection(&state, RecipeCollection::Favorites, auth.user_id, id).await
}

async fn add_to_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<(StatusCode, Json<ShortRecipe>)> {
    add_to_collection(&state, RecipeCollection::ShoppingCart, auth.user_id, id).await
}

async fn remove_from_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    remove_from_collection(&state, RecipeCollection::ShoppingCart, auth.user_id, id).await
}

/// GET /api/recipes/download_shopping_cart/?format=txt|csv
async fn download_shopping_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ShoppingListQuery>,
) -> ApiResult<Response> {
    let format = ShoppingListFormat::parse(query.format.as_deref())?;
    let (file_name, body) = ShoppingListService::download(state.db(), auth.user_id, format).await?;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response())
}
