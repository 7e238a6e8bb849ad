//! Authentication extractors
//!
//! Validates the `Authorization` header against the pre-computed JWT keys
//! in AppState and rejects tokens revoked through logout.
//!
//! Both `Token <jwt>` and `Bearer <jwt>` schemes are accepted.

use crate::error::ApiError;
use crate::repositories::{TokenRepository, UserRepository};
use crate::state::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Utc};

/// Authenticated user extracted from the auth token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    /// Token ID, needed to revoke this token on logout
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Optional authentication for public endpoints
///
/// A missing header yields an anonymous viewer; a header that is present but
/// invalid is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.user_id)
    }
}

/// Authenticated user with the staff flag set
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthUser);

/// Strip the auth scheme from an `Authorization` header value
pub fn token_from_header(value: &str) -> Result<&str, ApiError> {
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))
}

async fn authenticate(state: &AppState, header: &str) -> Result<AuthUser, ApiError> {
    let token = token_from_header(header)?;

    let claims = state
        .jwt()
        .validate_token(token)
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))?;

    let user_id = claims
        .user_id()
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    if TokenRepository::is_revoked(state.db(), &claims.jti)
        .await
        .map_err(ApiError::Internal)?
    {
        return Err(ApiError::Unauthorized("Token has been revoked".to_string()));
    }

    Ok(AuthUser {
        user_id,
        jti: claims.jti.clone(),
        expires_at: claims.expires_at(),
    })
}

fn authorization_header(parts: &Parts) -> Result<Option<&str>, ApiError> {
    match parts.headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| ApiError::Unauthorized("Invalid authorization header".to_string())),
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header = authorization_header(parts)?
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        authenticate(&app_state, header).await
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        match authorization_header(parts)? {
            None => Ok(MaybeAuthUser(None)),
            Some(header) => Ok(MaybeAuthUser(Some(authenticate(&app_state, header).await?))),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);

        let is_staff = UserRepository::find_by_id(app_state.db(), user.user_id)
            .await
            .map_err(ApiError::Internal)?
            .map(|record| record.is_staff)
            .unwrap_or(false);

        if !is_staff {
            return Err(ApiError::Forbidden("Staff access required".to_string()));
        }

        Ok(StaffUser(user))
    }
}
