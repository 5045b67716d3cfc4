//! HTTP health endpoint with observability.
//!
//! Serves the aggregated health report on `/api/health`, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use health::{HealthAggregator, PostgresDatabase, ProbeError, RedisCache};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(aggregator: Arc<HealthAggregator>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/api/health", get(routes::health::check))
        .route("/api/health/default", get(routes::health::check))
        .with_state(aggregator)
        .merge(metrics_router)
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the aggregator over PostgreSQL and Redis as configured.
///
/// No connection is opened here; an unreachable backend shows up as an
/// unhealthy check on the first request.
pub fn create_aggregator(config: &Config) -> Result<HealthAggregator, ProbeError> {
    let database = PostgresDatabase::connect_lazy(&config.database.url())?;
    let cache =
        RedisCache::open(&config.redis.url())?.with_response_timeout(config.checks.cache_timeout);

    Ok(HealthAggregator::new(Arc::new(database), Arc::new(cache))
        .with_options(config.checks.clone()))
}
