//! Request extractors that reject with the JSON error body

use crate::error::ApiError;
use axum::extract::{FromRequestParts, Path, Query};

/// `Path` whose parse failures render as `ApiError`
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `Query` whose parse failures render as `ApiError`
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
