//! Plan generation and lifecycle routes

use crate::error::ApiError;
use crate::services::PlanService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;
use vitatone_shared::models::PlanSummary;
use vitatone_shared::profile::ProfileInput;
use vitatone_shared::types::{
    ActivePlanResponse, GeneratePlanResponse, PaginatedResponse, Pagination, TodayPlanResponse,
    UpdatePlanStatusRequest, UpdatePlanStatusResponse,
};

/// Create plan routes
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate_plan))
        .route("/active/:profile_id", get(get_active_plan))
        .route("/today/:profile_id", get(get_today_plan))
        .route("/history/:profile_id", get(get_plan_history))
        .route("/:plan_id/status", patch(update_plan_status))
}

/// POST /api/v1/plans/generate
///
/// Returns the raw generator text plus the normalized week when one could be
/// extracted.
async fn generate_plan(
    State(state): State<AppState>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<GeneratePlanResponse>, ApiError> {
    PlanService::generate_plan(state.store(), state.generator(), input)
        .await
        .map(Json)
}

/// GET /api/v1/plans/active/:profile_id
async fn get_active_plan(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<ActivePlanResponse>, ApiError> {
    PlanService::active_plan(state.store(), profile_id).await.map(Json)
}

/// GET /api/v1/plans/today/:profile_id
async fn get_today_plan(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<TodayPlanResponse>, ApiError> {
    PlanService::today_plan(state.store(), profile_id).await.map(Json)
}

/// GET /api/v1/plans/history/:profile_id?page=&per_page=
async fn get_plan_history(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<PlanSummary>>, ApiError> {
    PlanService::history(state.store(), profile_id, pagination)
        .await
        .map(Json)
}

/// PATCH /api/v1/plans/:plan_id/status
async fn update_plan_status(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<UpdatePlanStatusRequest>,
) -> Result<Json<UpdatePlanStatusResponse>, ApiError> {
    PlanService::update_status(state.store(), plan_id, req)
        .await
        .map(Json)
}
