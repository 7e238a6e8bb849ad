//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe, pings PostgreSQL
//! - /health/live - Liveness probe

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;

const SERVICE: &str = "foodgram";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub healthy: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    fn new(status: &'static str, checks: Option<HealthChecks>) -> Self {
        Self {
            service: SERVICE,
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", None))
}

/// Readiness probe, 503 while the database is unreachable
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let started = Instant::now();
    let result = db::health_check(state.db()).await;

    let database = CheckStatus {
        healthy: result.is_ok(),
        latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        message: result.err().map(|e| e.to_string()),
    };

    if database.healthy {
        Ok(Json(HealthResponse::new("ready", Some(HealthChecks { database }))))
    } else {
        tracing::warn!(error = ?database.message, "Readiness check failed");
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new("not_ready", Some(HealthChecks { database }))),
        ))
    }
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("alive", None))
}
