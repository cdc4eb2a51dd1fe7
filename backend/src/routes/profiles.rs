//! Profile routes

use crate::error::ApiError;
use crate::services::ProfileService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use vitatone_shared::profile::ProfileInput;
use vitatone_shared::types::{ProfileDetailResponse, SaveProfileResponse};

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(save_profile))
        .route("/:profile_id", get(get_profile))
}

/// POST /api/v1/profiles - Create or update a profile by email
async fn save_profile(
    State(state): State<AppState>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<SaveProfileResponse>, ApiError> {
    ProfileService::save(state.store(), input).await.map(Json)
}

/// GET /api/v1/profiles/:profile_id - Profile with plan figures
async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<ProfileDetailResponse>, ApiError> {
    ProfileService::get(state.store(), profile_id).await.map(Json)
}
