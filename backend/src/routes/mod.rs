//! Route definitions for the Vitatone API
//!
//! This module organizes all API routes and applies middleware.

use crate::state::AppState;
use axum::{routing::get, Router};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod advice;
mod calculators;
mod health;
mod plans;
mod profiles;
mod progress;
mod stats;

pub use advice::advice_routes;
pub use calculators::calculator_routes;
pub use plans::plan_routes;
pub use profiles::profile_routes;
pub use progress::{activity_routes, progress_routes};
pub use stats::tip_routes;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    // Plan generation waits on the generator, so the timeout comes from config
    let request_timeout = Duration::from_secs(state.config().server.request_timeout_secs);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(health::prometheus_metrics))
        .nest("/api/v1", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Vitatone API v1" }))
        .nest("/metrics", calculator_routes())
        .nest("/profiles", profile_routes())
        .nest("/plans", plan_routes())
        .nest("/activities", activity_routes())
        .nest("/progress", progress_routes())
        .nest("/advice", advice_routes())
        .nest("/tips", tip_routes())
        .route("/stats", get(stats::get_usage_stats))
}
