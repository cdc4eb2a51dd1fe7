//! Usage overview and health tip routes

use crate::error::ApiError;
use crate::services::StatsService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use vitatone_shared::stats::UsageStats;
use vitatone_shared::tips::TipResponse;

/// Create tip routes
pub fn tip_routes() -> Router<AppState> {
    Router::new().route("/:category", get(get_tip))
}

/// GET /api/v1/stats
pub async fn get_usage_stats(State(state): State<AppState>) -> Result<Json<UsageStats>, ApiError> {
    StatsService::usage(state.store(), Utc::now()).await.map(Json)
}

/// GET /api/v1/tips/:category - Unknown categories fall back to general
async fn get_tip(Path(category): Path<String>) -> Json<TipResponse> {
    Json(StatsService::tip(&category, &mut rand::thread_rng()))
}
