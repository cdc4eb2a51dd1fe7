//! Advice routes backed by the text generator

use crate::error::ApiError;
use crate::services::AdviceService;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use vitatone_shared::types::{
    AdviceResponse, ChatRequest, NutritionAdviceRequest, WorkoutRoutineRequest,
};

/// Create advice routes
pub fn advice_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition", post(nutrition_advice))
        .route("/workout", post(workout_routine))
        .route("/chat", post(chat))
}

/// POST /api/v1/advice/nutrition
async fn nutrition_advice(
    State(state): State<AppState>,
    Json(req): Json<NutritionAdviceRequest>,
) -> Result<Json<AdviceResponse>, ApiError> {
    AdviceService::nutrition(state.generator(), req).await.map(Json)
}

/// POST /api/v1/advice/workout
async fn workout_routine(
    State(state): State<AppState>,
    Json(req): Json<WorkoutRoutineRequest>,
) -> Result<Json<AdviceResponse>, ApiError> {
    AdviceService::workout(state.generator(), req).await.map(Json)
}

/// POST /api/v1/advice/chat
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<AdviceResponse>, ApiError> {
    AdviceService::chat(state.generator(), req).await.map(Json)
}
