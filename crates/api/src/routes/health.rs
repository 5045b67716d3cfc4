//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::HealthStatus;
use health::HealthAggregator;

/// Maps an overall status onto the endpoint's HTTP status code.
///
/// Anything that is not a valid HTTP code becomes 500.
pub fn status_code(status: HealthStatus) -> StatusCode {
    StatusCode::from_u16(status.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// GET /api/health — runs every probe and returns the report.
///
/// Answers 200 when healthy or degraded and 503 when unhealthy.
pub async fn check(State(aggregator): State<Arc<HealthAggregator>>) -> Response {
    let report = aggregator.check_health().await;
    let code = status_code(report.status());
    if code != StatusCode::OK {
        tracing::warn!(status = %report.status(), code = code.as_u16(), "service reported unhealthy");
    }
    (code, Json(report)).into_response()
}
