//! Activity tracking and weekly progress routes

use crate::error::ApiError;
use crate::services::ActivityService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use vitatone_shared::activity::WeeklyProgressSummary;
use vitatone_shared::types::{
    TrackActivityRequest, TrackActivityResponse, WeeklyProgressQuery, WeeklyProgressResponse,
    WeeklySummaryRequest,
};

/// Create activity routes
pub fn activity_routes() -> Router<AppState> {
    Router::new().route("/", post(track_activity))
}

/// Create progress routes
pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/weekly/:profile_id", get(get_weekly_progress))
        .route("/weekly-summary", post(summarize_week))
}

/// POST /api/v1/activities - Track or update one day
async fn track_activity(
    State(state): State<AppState>,
    Json(req): Json<TrackActivityRequest>,
) -> Result<Json<TrackActivityResponse>, ApiError> {
    ActivityService::track(state.store(), req).await.map(Json)
}

/// GET /api/v1/progress/weekly/:profile_id?start_date=YYYY-MM-DD
async fn get_weekly_progress(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Query(query): Query<WeeklyProgressQuery>,
) -> Result<Json<WeeklyProgressResponse>, ApiError> {
    ActivityService::weekly_progress(state.store(), profile_id, query.start_date)
        .await
        .map(Json)
}

/// POST /api/v1/progress/weekly-summary - Summarize client-supplied days
async fn summarize_week(
    Json(req): Json<WeeklySummaryRequest>,
) -> Result<Json<WeeklyProgressSummary>, ApiError> {
    ActivityService::summarize(&req.activities).map(Json)
}
