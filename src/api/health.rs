// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

use axum::{http::StatusCode, Json};
use serde::Serialize;
use std::path::Path;
use utoipa::ToSchema;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Data directory availability (if configured).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Check if the data directory exists and is accessible.
fn check_data_dir() -> Option<String> {
    if let Ok(dir) = std::env::var("DATA_DIR") {
        if Path::new(&dir).exists() {
            Some("ok".to_string())
        } else {
            Some("missing".to_string())
        }
    } else {
        None
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health() -> (StatusCode, Json<ReadyResponse>) {
    let data_dir = check_data_dir();
    let all_ok = data_dir.as_ref().map(|s| s == "ok").unwrap_or(true);

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            data_dir,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness() -> (StatusCode, Json<ReadyResponse>) {
    health().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn liveness_always_reports_ok() {
        let Json(response) = liveness().await;
        assert_eq!(response.status, "ok");
    }
}
