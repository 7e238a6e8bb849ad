//! Route definitions for the Foodgram API
//!
//! This module organizes all API routes and applies middleware.
//! Every API path keeps its trailing slash.

use crate::config::SiteConfig;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use foodgram_shared::pagination::{build_link, ParamOverrides};
use foodgram_shared::Paginated;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod admin;
mod auth;
mod docs;
mod health;
mod ingredients;
mod recipes;
mod short_link;
mod users;


/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    // Base64 inflates uploads by a third; leave room for the JSON around it
    let body_limit = state.config().media.max_image_bytes / 3 * 4 + 64 * 1024;
    let media_root = state.config().media.root.clone();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(render_metrics))
        .nest("/api", api_routes())
        .merge(admin::admin_routes())
        .merge(short_link::short_link_routes())
        .nest_service("/media", ServeDir::new(media_root))
        // Apply middleware layers
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// REST API routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(users::user_routes())
        .merge(auth::auth_routes())
        .merge(ingredients::ingredient_routes())
        .merge(recipes::recipe_routes())
        .merge(docs::docs_routes())
}

/// GET /metrics - Prometheus exposition
async fn render_metrics(axum::extract::State(state): axum::extract::State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Wrap a page of results with `next`/`previous` links derived from the
/// request URI
pub(crate) fn paginate<T>(
    site: &SiteConfig,
    uri: &Uri,
    results: Vec<T>,
    count: i64,
    next: Option<ParamOverrides>,
    previous: Option<ParamOverrides>,
) -> Paginated<T> {
    let base = site.absolute(uri.path());
    let link = |params: ParamOverrides| build_link(&base, uri.query(), &params);

    Paginated {
        count,
        next: next.map(&link),
        previous: previous.map(&link),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodgram_shared::LimitOffset;

    #[test]
    fn test_paginate_builds_absolute_links() {
        let site = SiteConfig::default();
        let uri: Uri = "/api/recipes/?limit=2&author=3".parse().unwrap();
        let window = LimitOffset::new(Some(2), None, 6);

        let page = paginate(&site, &uri, vec![1, 2], 5, window.next_params(5), window.previous_params());

        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost/api/recipes/?limit=2&author=3&offset=2")
        );
        assert!(page.previous.is_none());
        assert_eq!(page.count, 5);
    }
}
