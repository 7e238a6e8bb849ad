//! User, avatar, password and subscription routes

use super::paginate;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::services::{SubscriptionService, UserService};
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use foodgram_shared::{
    AuthorWithRecipes, AvatarRequest, AvatarResponse, PageNumber, PageQuery, Paginated,
    RecipesLimitQuery, RegisterRequest, RegisteredUser, SetPasswordRequest, UserResponse,
};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", get(list_users).post(register))
        .route("/users/me/", get(me))
        .route("/users/me/avatar/", put(set_avatar).delete(delete_avatar))
        .route("/users/set_password/", post(set_password))
        .route("/users/subscriptions/", get(subscriptions))
        .route("/users/:id/", get(get_user))
        .route("/users/:id/subscribe/", post(subscribe).delete(unsubscribe))
}

/// POST /api/users/ - Register a new user
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisteredUser>)> {
    let user = UserService::register(state.db(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/ - Page-number paginated users
async fn list_users(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<UserResponse>>> {
    let page = PageNumber::new(query.page, query.limit, state.config().site.page_size);
    let (users, count) = UserService::list(state.db(), state.media(), viewer.user_id(), page).await?;

    Ok(Json(paginate(
        &state.config().site,
        &uri,
        users,
        count,
        page.next_params(count),
        page.previous_params(),
    )))
}

/// GET /api/users/{id}/
async fn get_user(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::get(state.db(), state.media(), viewer.user_id(), id).await?;
    Ok(Json(user))
}

/// GET /api/users/me/
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    let user = UserService::me(state.db(), state.media(), auth.user_id).await?;
    Ok(Json(user))
}

/// POST /api/users/set_password/
async fn set_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SetPasswordRequest>,
) -> ApiResult<StatusCode> {
    UserService::set_password(state.db(), auth.user_id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/users/me/avatar/ - Upload a base64 avatar
async fn set_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AvatarRequest>,
) -> ApiResult<Json<AvatarResponse>> {
    let avatar =
        UserService::set_avatar(state.db(), state.media(), auth.user_id, req.avatar.as_deref()).await?;
    Ok(Json(AvatarResponse { avatar }))
}

/// DELETE /api/users/me/avatar/
async fn delete_avatar(State(state): State<AppState>, auth: AuthUser) -> ApiResult<StatusCode> {
    UserService::delete_avatar(state.db(), state.media(), auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/subscriptions/ - Followed authors with their recipes
async fn subscriptions(
    State(state): State<AppState>,
    auth: AuthUser,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<AuthorWithRecipes>>> {
    let page = PageNumber::new(query.page, query.limit, state.config().site.page_size);
    let (authors, count) = SubscriptionService::list(
        state.db(),
        state.media(),
        auth.user_id,
        page,
        query.recipes_limit,
    )
    .await?;

    Ok(Json(paginate(
        &state.config().site,
        &uri,
        authors,
        count,
        page.next_params(count),
        page.previous_params(),
    )))
}

/// POST /api/users/{id}/subscribe/
async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<RecipesLimitQuery>,
) -> ApiResult<(StatusCode, Json<AuthorWithRecipes>)> {
    let author =
        SubscriptionService::subscribe(state.db(), state.media(), auth.user_id, id, query.recipes_limit)
            .await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// DELETE /api/users/{id}/subscribe/
async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    SubscriptionService::unsubscribe(state.db(), auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
