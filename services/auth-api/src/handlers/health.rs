//! Health check handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::time::Instant;

use crate::state::AppState;

const SERVICE_NAME: &str = "auth-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub active_sessions: usize,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    pub database: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    pub latency_ms: u64,
}

/// GET /health - Liveness probe (fast, no dependencies)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

/// GET /ready - Readiness probe (checks DB connectivity)
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let start = Instant::now();

    // Check database connectivity with a simple query
    let db_result = sqlx::query("SELECT 1").fetch_one(&*state.pool).await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (status, db_status) = match db_result {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "Database readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "error")
        }
    };

    let body = ReadyResponse {
        status: if status == StatusCode::OK { "ready" } else { "not_ready" },
        service: SERVICE_NAME,
        active_sessions: state.sessions.len(),
        checks: ReadyChecks {
            database: CheckResult {
                status: db_status,
                latency_ms,
            },
        },
    };

    (status, Json(body))
}
