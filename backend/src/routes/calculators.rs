//! BMI and calorie calculator routes

use crate::error::ApiError;
use crate::services::MetricsService;
use crate::state::AppState;
use axum::{routing::post, Json, Router};
use vitatone_shared::types::{BmiRequest, BmiResponse, CaloriesRequest, CaloriesResponse};

/// Create calculator routes
pub fn calculator_routes() -> Router<AppState> {
    Router::new()
        .route("/bmi", post(calculate_bmi))
        .route("/calories", post(calculate_calories))
}

/// POST /api/v1/metrics/bmi
async fn calculate_bmi(Json(req): Json<BmiRequest>) -> Result<Json<BmiResponse>, ApiError> {
    MetricsService::bmi(&req).map(Json)
}

/// POST /api/v1/metrics/calories
async fn calculate_calories(
    Json(req): Json<CaloriesRequest>,
) -> Result<Json<CaloriesResponse>, ApiError> {
    MetricsService::calories(&req).map(Json)
}
