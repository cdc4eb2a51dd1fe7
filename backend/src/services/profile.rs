//! Profile persistence

use crate::error::ApiError;
use crate::repositories::HealthStore;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;
use vitatone_shared::fields::non_empty_text;
use vitatone_shared::models::Profile;
use vitatone_shared::profile::ProfileInput;
use vitatone_shared::stats::ProfilePlanStats;
use vitatone_shared::types::{ProfileDetailResponse, ProfileSummary, SaveProfileResponse};

/// Profile service for business logic
pub struct ProfileService;

impl ProfileService {
    /// Create or update the profile registered under the posted email
    ///
    /// Unlike plan generation, saving requires both a name and an email.
    #[instrument(skip_all)]
    pub async fn save(
        store: &dyn HealthStore,
        input: ProfileInput,
    ) -> Result<SaveProfileResponse, ApiError> {
        let (Some(_), Some(email)) = (
            non_empty_text(input.full_name.as_deref()),
            non_empty_text(input.email.as_deref()),
        ) else {
            return Err(ApiError::Validation(
                "Full name and email are required".to_string(),
            ));
        };

        let now = Utc::now();
        let existing = store.find_profile(&email.to_lowercase()).await?;
        let normalized = input.normalize(existing.as_ref().map(|p| &p.data), now.date_naive())?;

        let created = existing.is_none();
        let profile = match existing {
            Some(mut profile) => {
                profile.update(normalized, now);
                profile
            }
            None => Profile::new(normalized, now),
        };
        store.save_profile(&profile).await?;

        info!(profile_id = %profile.id, created, "Profile saved");

        Ok(SaveProfileResponse {
            message: "Profile saved successfully".to_string(),
            created,
            profile: ProfileSummary::from(&profile),
        })
    }

    /// A stored profile with its plan counts and active plan
    pub async fn get(
        store: &dyn HealthStore,
        profile_id: Uuid,
    ) -> Result<ProfileDetailResponse, ApiError> {
        let profile = store
            .find_profile_by_id(profile_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
        let counts = store.plan_counts(profile_id).await?;
        let active = store.active_plan(profile_id).await?;

        Ok(ProfileDetailResponse {
            profile,
            stats: ProfilePlanStats::new(counts, active.map(|plan| plan.id)),
        })
    }
}
