//! Plan generation and lifecycle
//!
//! `generate_plan` runs the full pipeline: normalize the profile, compute
//! metrics, persist the profile, ask the generator for a week, normalize the
//! answer and supersede the previous active plan.

use crate::error::ApiError;
use crate::generator::TextGenerator;
use crate::repositories::{HealthStore, PlanStatusChange};
use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use vitatone_shared::fields::non_empty_text;
use vitatone_shared::health_metrics::{compute_metrics, MetricsResult};
use vitatone_shared::models::{HealthPlan, PlanSummary, Profile};
use vitatone_shared::plan::{normalize_to_week, try_parse_generated_plan, WeekPlan};
use vitatone_shared::plan_record::{build_plan_record, PlanStatus};
use vitatone_shared::profile::{NormalizedProfile, ProfileInput};
use vitatone_shared::prompts::build_plan_prompt;
use vitatone_shared::types::{
    ActivePlanResponse, GeneratePlanResponse, PaginatedResponse, Pagination, PlanInfo,
    ProfileSummary, TodayPlanResponse, UpdatePlanStatusRequest, UpdatePlanStatusResponse,
};

const PLAN_GENERATIONS: &str = "vitatone_plan_generations_total";

/// Plan service for business logic
pub struct PlanService;

impl PlanService {
    /// Generate, normalize and store a week plan for the posted profile
    ///
    /// The profile is persisted only when it carries an email. The plan is
    /// persisted only when the profile was and the generator output could be
    /// normalized into a week.
    #[instrument(skip_all)]
    pub async fn generate_plan(
        store: &dyn HealthStore,
        generator: &dyn TextGenerator,
        input: ProfileInput,
    ) -> Result<GeneratePlanResponse, ApiError> {
        let now = Utc::now();
        let today = now.date_naive();

        let (normalized, mut profile) = Self::resolve_profile(store, &input, today, now).await?;
        let metrics = Self::metrics_for(&normalized, today);

        let prompt = build_plan_prompt(&normalized, today);
        let raw_output = generator.generate(&prompt).await.map_err(|e| {
            counter!(PLAN_GENERATIONS, "outcome" => "generator_error").increment(1);
            e
        })?;

        let week = match try_parse_generated_plan(&raw_output) {
            Ok(days) => normalize_to_week(&days, now),
            Err(e) => {
                warn!(error = %e, "Generated plan could not be parsed, returning raw text only");
                None
            }
        };

        let saved_plan = match (&week, profile.as_mut()) {
            (Some(week), Some(profile)) => Some(
                Self::supersede(store, profile, &normalized, week, &raw_output, &prompt, now).await?,
            ),
            _ => None,
        };

        let outcome = if week.is_some() { "structured" } else { "unstructured" };
        counter!(PLAN_GENERATIONS, "outcome" => outcome).increment(1);
        info!(
            outcome,
            saved = saved_plan.is_some(),
            "Plan generated"
        );

        let profile_summary = profile
            .as_ref()
            .map(ProfileSummary::from)
            .unwrap_or_else(|| ProfileSummary::from_normalized(None, &normalized));

        Ok(GeneratePlanResponse {
            plan: raw_output,
            structured_plan: week,
            saved_plan,
            metrics,
            profile: profile_summary,
            plan_duration: normalized.plan_duration.clone(),
            generated_at: now,
        })
    }

    /// Normalize the input against the stored profile and persist it when it has an email
    async fn resolve_profile(
        store: &dyn HealthStore,
        input: &ProfileInput,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(NormalizedProfile, Option<Profile>), ApiError> {
        let existing = match non_empty_text(input.email.as_deref()) {
            Some(email) => store.find_profile(&email.to_lowercase()).await?,
            None => None,
        };

        let normalized = input.normalize(existing.as_ref().map(|p| &p.data), today)?;
        if normalized.email.is_none() {
            debug!("No email supplied, profile will not be stored");
            return Ok((normalized, None));
        }

        let profile = match existing {
            Some(mut profile) => {
                profile.update(normalized.clone(), now);
                profile
            }
            None => Profile::new(normalized.clone(), now),
        };
        store.save_profile(&profile).await?;

        Ok((normalized, Some(profile)))
    }

    fn metrics_for(profile: &NormalizedProfile, today: NaiveDate) -> Option<MetricsResult> {
        let input = profile.metrics_input(today)?;
        match compute_metrics(&input) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                debug!(error = %e, "Skipping metrics for profile");
                None
            }
        }
    }

    /// Pause the current active plan and store the new one as active
    async fn supersede(
        store: &dyn HealthStore,
        profile: &mut Profile,
        normalized: &NormalizedProfile,
        week: &WeekPlan,
        raw_output: &str,
        prompt: &str,
        now: DateTime<Utc>,
    ) -> Result<PlanSummary, ApiError> {
        let record = build_plan_record(normalized, week.clone(), raw_output, prompt, now);
        let plan = HealthPlan::new(profile.id, record, now);

        let paused = store.deactivate_active_plans(profile.id).await?;
        store.save_plan(&plan).await?;

        profile.active_plan_id = Some(plan.id);
        profile.updated_at = now;
        store.save_profile(profile).await?;

        info!(plan_id = %plan.id, profile_id = %profile.id, paused, "Stored new active plan");
        Ok(plan.summary())
    }

    async fn require_active_plan(
        store: &dyn HealthStore,
        profile_id: Uuid,
    ) -> Result<HealthPlan, ApiError> {
        store
            .active_plan(profile_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("No active plan found".to_string()))
    }

    /// The active plan with its owner
    pub async fn active_plan(
        store: &dyn HealthStore,
        profile_id: Uuid,
    ) -> Result<ActivePlanResponse, ApiError> {
        let plan = Self::require_active_plan(store, profile_id).await?;
        let profile = store
            .find_profile_by_id(profile_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

        Ok(ActivePlanResponse {
            plan,
            profile: ProfileSummary::from(&profile),
        })
    }

    /// The day of the active plan that applies today
    pub async fn today_plan(
        store: &dyn HealthStore,
        profile_id: Uuid,
    ) -> Result<TodayPlanResponse, ApiError> {
        let plan = Self::require_active_plan(store, profile_id).await?;
        let today = plan
            .record
            .daily_plans
            .day_for(plan.record.start_date, Utc::now())
            .clone();

        Ok(TodayPlanResponse {
            today,
            plan_info: PlanInfo::from(&plan),
        })
    }

    /// Plans for a profile, newest first
    pub async fn history(
        store: &dyn HealthStore,
        profile_id: Uuid,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<PlanSummary>, ApiError> {
        let pagination = pagination.clamped();
        let (plans, total) = store.list_plans(profile_id, pagination).await?;
        Ok(PaginatedResponse::new(plans, total, pagination))
    }

    /// Change status, rating or notes of a plan
    #[instrument(skip(store, request))]
    pub async fn update_status(
        store: &dyn HealthStore,
        plan_id: Uuid,
        request: UpdatePlanStatusRequest,
    ) -> Result<UpdatePlanStatusResponse, ApiError> {
        let status = non_empty_text(request.status.as_deref())
            .map(|label| label.parse::<PlanStatus>())
            .transpose()
            .map_err(ApiError::Validation)?;

        let change = PlanStatusChange {
            status,
            rating: request.rating,
            note: request.notes,
        };

        let plan = store
            .update_plan_status(plan_id, &change, Utc::now())
            .await?
            .ok_or_else(|| ApiError::NotFound("Health plan not found".to_string()))?;

        let message = match status {
            Some(status) => format!("Plan status updated to {}", status),
            None => "Plan updated".to_string(),
        };

        Ok(UpdatePlanStatusResponse {
            message,
            plan: plan.summary(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorError;
    use crate::repositories::InMemoryHealthStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedGenerator(Result<String, GeneratorError>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
            self.0.clone()
        }
    }

    fn week_json() -> String {
        r#"```json
[{"food": {"breakfast": ["oats"]}, "exercise": ["walk"]}]
```"#
            .to_string()
    }

    fn input(value: serde_json::Value) -> ProfileInput {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_generate_plan_stores_profile_and_plan() {
        let store = InMemoryHealthStore::new();
        let generator = FixedGenerator(Ok(week_json()));

        let response = PlanService::generate_plan(
            &store,
            &generator,
            input(json!({
                "full_name": "Ana",
                "email": "Ana@Example.com",
                "gender": "female",
                "dob": "1990-05-01",
                "current_weight": "62 kg",
                "current_height": 165,
                "workout_days": "four days"
            })),
        )
        .await
        .unwrap();

        let week = response.structured_plan.unwrap();
        assert_eq!(week.days().len(), 7);
        assert_eq!(week.days()[6].plan.exercise, vec!["walk".to_string()]);
        assert!(response.metrics.is_some());

        let saved = response.saved_plan.unwrap();
        let profile = store.find_profile("ana@example.com").await.unwrap().unwrap();
        assert_eq!(profile.active_plan_id, Some(saved.id));
        assert_eq!(profile.data.workout_days, 4);
    }

    #[tokio::test]
    async fn test_second_generation_supersedes_first() {
        let store = InMemoryHealthStore::new();
        let generator = FixedGenerator(Ok(week_json()));
        let body = json!({ "full_name": "Bo", "email": "bo@example.com" });

        let first = PlanService::generate_plan(&store, &generator, input(body.clone()))
            .await
            .unwrap();
        let second = PlanService::generate_plan(&store, &generator, input(body))
            .await
            .unwrap();

        let profile_id = second.profile.id.unwrap();
        let active = store.active_plan(profile_id).await.unwrap().unwrap();
        assert_eq!(Some(active.id), second.saved_plan.map(|p| p.id));

        let history = PlanService::history(&store, profile_id, Pagination::default())
            .await
            .unwrap();
        assert_eq!(history.total, 2);
        let first_id = first.saved_plan.unwrap().id;
        let first_summary = history.data.iter().find(|p| p.id == first_id).unwrap();
        assert_eq!(first_summary.status, PlanStatus::Paused);
    }

    #[tokio::test]
    async fn test_unparseable_output_returns_raw_text_only() {
        let store = InMemoryHealthStore::new();
        let generator = FixedGenerator(Ok("Eat well and sleep.".to_string()));

        let response = PlanService::generate_plan(
            &store,
            &generator,
            input(json!({ "email": "raw@example.com" })),
        )
        .await
        .unwrap();

        assert_eq!(response.plan, "Eat well and sleep.");
        assert!(response.structured_plan.is_none());
        assert!(response.saved_plan.is_none());
    }

    #[tokio::test]
    async fn test_without_email_nothing_is_stored() {
        let store = InMemoryHealthStore::new();
        let generator = FixedGenerator(Ok(week_json()));

        let response = PlanService::generate_plan(&store, &generator, input(json!({ "goal": "weight_loss" })))
            .await
            .unwrap();

        assert!(response.structured_plan.is_some());
        assert!(response.saved_plan.is_none());
        assert_eq!(response.profile.id, None);
        assert_eq!(response.profile.goal, "weight_loss");
    }

    #[tokio::test]
    async fn test_generator_quota_is_rate_limited() {
        let store = InMemoryHealthStore::new();
        let generator = FixedGenerator(Err(GeneratorError::Quota("slow down".to_string())));

        let result = PlanService::generate_plan(&store, &generator, input(json!({}))).await;
        assert!(matches!(result, Err(ApiError::RateLimited(_))));
    }

    #[tokio::test]
    async fn test_invalid_profile_is_rejected_before_generation() {
        let store = InMemoryHealthStore::new();
        let generator = FixedGenerator(Err(GeneratorError::NotConfigured));

        let result = PlanService::generate_plan(
            &store,
            &generator,
            input(json!({ "email": "not-an-email" })),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_label() {
        let store = InMemoryHealthStore::new();
        let request = UpdatePlanStatusRequest {
            status: Some("archived".to_string()),
            ..Default::default()
        };

        let result = PlanService::update_status(&store, Uuid::new_v4(), request).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_no_active_plan_is_not_found() {
        let store = InMemoryHealthStore::new();
        let result = PlanService::today_plan(&store, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
