//! Health Check Handlers
//!
//! # Endpoints
//! - `GET /health` - Static health check
//! - `GET /health/live` - Liveness probe (is the process up?)
//! - `GET /health/ready` - Readiness probe (can we reach the database?)
//! - `GET /metrics` - Prometheus exposition

use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::application::dto::response::HealthResponse;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Server start time for uptime calculation
static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);

const READINESS_TIMEOUT: Duration = Duration::from_secs(2);

/// Initialize the server start time (call during startup)
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: None,
    })
}

/// Liveness probe. Never touches dependencies.
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive",
        uptime_seconds: SERVER_START.elapsed().as_secs(),
    })
}

/// Readiness probe. 503 when the database does not answer.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let ping = sqlx::query("SELECT 1").execute(&state.db);
    let database_ok = match tokio::time::timeout(READINESS_TIMEOUT, ping).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Readiness check failed");
            false
        }
        Err(_) => {
            tracing::warn!("Readiness check timed out");
            false
        }
    };

    let (status_code, status, database) = if database_ok {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable", "unavailable")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database: Some(database),
        }),
    )
}

/// Prometheus metrics endpoint
pub async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let body = metrics::gather_metrics()
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_is_static() {
        let Json(body) = health_check().await;
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert!(value.get("database").is_none());
    }

    #[tokio::test]
    async fn test_liveness_reports_alive() {
        init_server_start();
        let Json(body) = liveness().await;
        assert_eq!(body.status, "alive");
    }
}
