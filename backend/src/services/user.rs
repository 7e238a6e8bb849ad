//! User service for accounts, authentication and profiles
//!
//! Password hashing and verification run on the blocking thread pool; the
//! JWT service is passed by reference with its keys pre-computed.

use crate::auth::{AuthUser, JwtService, PasswordService};
use crate::db::unique_violation;
use crate::error::ApiError;
use crate::repositories::user::{EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};
use crate::repositories::{CreateUser, SubscriptionRepository, TokenRepository, UserRecord, UserRepository};
use crate::services::media::{MediaKind, MediaStorage};
use foodgram_shared::{
    AuthToken, PageNumber, RegisterRequest, RegisteredUser, SetPasswordRequest, UserResponse,
};
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::info;
use validator::Validate;

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// Build the public representation of a user
pub fn user_response(media: &MediaStorage, user: &UserRecord, is_subscribed: bool) -> UserResponse {
    UserResponse {
        email: user.email.clone(),
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed,
        avatar: user.avatar.as_deref().map(|path| media.url(path)),
    }
}

/// User service
pub struct UserService;

impl UserService {
    /// Register a new account
    pub async fn register(pool: &PgPool, req: RegisterRequest) -> Result<RegisteredUser, ApiError> {
        req.validate()?;

        let password_hash = PasswordService::hash_async(req.password)
            .await
            .map_err(ApiError::Internal)?;

        let input = CreateUser {
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
            is_staff: false,
        };

        let user = UserRepository::create(pool, input)
            .await
            .map_err(|e| match unique_violation(&e).as_deref() {
                Some(EMAIL_CONSTRAINT) => {
                    ApiError::field("email", "A user with that email already exists.")
                }
                Some(USERNAME_CONSTRAINT) => {
                    ApiError::field("username", "A user with that username already exists.")
                }
                _ => ApiError::Internal(e),
            })?;

        metrics::counter!("foodgram_users_registered_total").increment(1);
        info!(user_id = user.id, username = %user.username, "User registered");

        Ok(RegisteredUser {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        })
    }

    /// Exchange email and password for an auth token
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        email: &str,
        password: &str,
    ) -> Result<AuthToken, ApiError> {
        let user = UserRepository::find_by_email(pool, email)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::BadRequest(BAD_CREDENTIALS.to_string()))?;

        let valid = PasswordService::verify_async(password.to_string(), user.password_hash)
            .await
            .map_err(ApiError::Internal)?;

        if !valid {
            return Err(ApiError::BadRequest(BAD_CREDENTIALS.to_string()));
        }

        let auth_token = jwt_service
            .generate_token(user.id)
            .map_err(ApiError::Internal)?;

        Ok(AuthToken { auth_token })
    }

    /// Revoke the token the request was authenticated with
    pub async fn logout(pool: &PgPool, auth: &AuthUser) -> Result<(), ApiError> {
        TokenRepository::revoke(pool, &auth.jti, auth.user_id, auth.expires_at)
            .await
            .map_err(ApiError::Internal)?;

        let purged = TokenRepository::purge_expired(pool)
            .await
            .map_err(ApiError::Internal)?;
        if purged > 0 {
            info!(purged, "Purged expired revoked tokens");
        }

        Ok(())
    }

    /// Represent users as seen by `viewer`
    pub async fn present(
        pool: &PgPool,
        media: &MediaStorage,
        viewer: Option<i64>,
        users: &[UserRecord],
    ) -> Result<Vec<UserResponse>, ApiError> {
        let followed: HashSet<i64> = match viewer {
            Some(viewer) => {
                let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
                SubscriptionRepository::followed_among(pool, viewer, &ids)
                    .await
                    .map_err(ApiError::Internal)?
                    .into_iter()
                    .collect()
            }
            None => HashSet::new(),
        };

        Ok(users
            .iter()
            .map(|user| user_response(media, user, followed.contains(&user.id)))
            .collect())
    }

    /// Page of all users, ordered by username
    pub async fn list(
        pool: &PgPool,
        media: &MediaStorage,
        viewer: Option<i64>,
        page: PageNumber,
    ) -> Result<(Vec<UserResponse>, i64), ApiError> {
        let count = UserRepository::count(pool).await.map_err(ApiError::Internal)?;
        if page.is_out_of_range(count) {
            return Err(ApiError::NotFound("Invalid page.".to_string()));
        }

        let users = UserRepository::list(pool, page.limit, page.offset())
            .await
            .map_err(ApiError::Internal)?;

        Ok((Self::present(pool, media, viewer, &users).await?, count))
    }

    /// Fetch a user record or 404
    pub async fn find(pool: &PgPool, id: i64) -> Result<UserRecord, ApiError> {
        UserRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn get(
        pool: &PgPool,
        media: &MediaStorage,
        viewer: Option<i64>,
        id: i64,
    ) -> Result<UserResponse, ApiError> {
        let user = Self::find(pool, id).await?;
        let mut presented = Self::present(pool, media, viewer, std::slice::from_ref(&user)).await?;
        presented
            .pop()
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Profile of the authenticated user
    pub async fn me(pool: &PgPool, media: &MediaStorage, user_id: i64) -> Result<UserResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        Ok(user_response(media, &user, false))
    }

    /// Change password after checking the current one
    pub async fn set_password(
        pool: &PgPool,
        user_id: i64,
        req: SetPasswordRequest,
    ) -> Result<(), ApiError> {
        req.validate()?;

        let user = Self::find(pool, user_id).await?;
        let valid = PasswordService::verify_async(req.current_password, user.password_hash)
            .await
            .map_err(ApiError::Internal)?;
        if !valid {
            return Err(ApiError::field("current_password", "Invalid password."));
        }

        let password_hash = PasswordService::hash_async(req.new_password)
            .await
            .map_err(ApiError::Internal)?;
        UserRepository::update_password(pool, user_id, &password_hash)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id, "Password changed");
        Ok(())
    }

    /// Store a new avatar and return its public URL
    pub async fn set_avatar(
        pool: &PgPool,
        media: &MediaStorage,
        user_id: i64,
        avatar: Option<&str>,
    ) -> Result<String, ApiError> {
        let data = avatar
            .filter(|data| !data.trim().is_empty())
            .ok_or_else(|| ApiError::field("avatar", "This field is required."))?;

        let path = media.save(MediaKind::Avatar, data).await?;

        let previous = match UserRepository::set_avatar(pool, user_id, Some(&path)).await {
            Ok(previous) => previous,
            Err(e) => {
                media.remove(&path).await;
                return Err(ApiError::Internal(e));
            }
        };
        if let Some(previous) = previous {
            media.remove(&previous).await;
        }

        Ok(media.url(&path))
    }

    pub async fn delete_avatar(pool: &PgPool, media: &MediaStorage, user_id: i64) -> Result<(), ApiError> {
        let previous = UserRepository::set_avatar(pool, user_id, None)
            .await
            .map_err(ApiError::Internal)?;
        if let Some(previous) = previous {
            media.remove(&previous).await;
        }
        Ok(())
    }
}
