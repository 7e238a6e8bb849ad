//! API documentation: a static OpenAPI document and a page that renders it

use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::state::AppState;

const OPENAPI_YAML: &str = include_str!("../../docs/openapi.yml");
const DOCS_PAGE: &str = include_str!("../../docs/redoc.html");

pub fn docs_routes() -> Router<AppState> {
    Router::new()
        .route("/docs/", get(docs_page))
        .route("/docs/openapi.yml", get(openapi_document))
}

async fn docs_page() -> Html<&'static str> {
    Html(DOCS_PAGE)
}

async fn openapi_document() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/yaml")], OPENAPI_YAML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_points_at_document() {
        assert!(DOCS_PAGE.contains("/api/docs/openapi.yml"));
        assert!(OPENAPI_YAML.starts_with("openapi:"));
    }
}
