//! API request and response types

use crate::activity::{ActivityUpdate, DailyActivity, DailySummary, WeeklyProgressSummary};
use crate::health_metrics::{BmiCategory, HealthRisk, MacroGrams, MetricsResult};
use crate::models::{HealthPlan, PlanSummary, Profile};
use crate::plan::{PlannedDay, WeekPlan};
use crate::profile::NormalizedProfile;
use crate::stats::ProfilePlanStats;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl Pagination {
    pub const MAX_PER_PAGE: u32 = 100;

    /// Page at least 1, page size within 1..=100
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let per_page = u64::from(pagination.per_page.max(1));
        Self {
            data,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
            total_pages: total.div_ceil(per_page) as u32,
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// ============================================================================
// Calculator Types
// ============================================================================

/// BMI calculation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmiRequest {
    pub weight: f64,
    pub height: f64,
    /// kg when absent
    #[serde(default)]
    pub weight_unit: Option<String>,
    /// cm when absent
    #[serde(default)]
    pub height_unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmiResponse {
    pub bmi: f64,
    pub category: BmiCategory,
    pub health_risk: HealthRisk,
    pub recommendation: String,
    pub healthy_weight_range_kg: (f64, f64),
    pub calculated_at: DateTime<Utc>,
}

/// Calorie calculation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaloriesRequest {
    pub weight: f64,
    pub height: f64,
    pub age: u32,
    pub gender: String,
    /// Unknown or missing levels are treated as sedentary
    #[serde(default)]
    pub activity_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaloriesResponse {
    pub bmr: i32,
    pub maintenance: i32,
    pub weight_loss: i32,
    pub weight_gain: i32,
    pub activity_level: String,
    pub recommendations: MacroGrams,
    pub calculated_at: DateTime<Utc>,
}

// ============================================================================
// Profile and Plan Types
// ============================================================================

/// Short profile view returned alongside other payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Absent when the profile was not persisted
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub goal: String,
    pub bmi: f64,
    pub exercise_frequency: String,
}

impl ProfileSummary {
    pub fn from_normalized(id: Option<Uuid>, profile: &NormalizedProfile) -> Self {
        Self {
            id,
            name: profile.full_name.clone(),
            email: profile.email.clone(),
            goal: profile.goal.clone(),
            bmi: profile.bmi,
            exercise_frequency: profile.exercise_frequency.clone(),
        }
    }
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self::from_normalized(Some(profile.id), &profile.data)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveProfileResponse {
    pub message: String,
    pub created: bool,
    pub profile: ProfileSummary,
}

/// A stored profile with its plan figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDetailResponse {
    pub profile: Profile,
    pub stats: ProfilePlanStats,
}

/// Result of a plan generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePlanResponse {
    /// Raw generator output
    pub plan: String,
    /// Seven-day plan, when the output could be parsed
    pub structured_plan: Option<WeekPlan>,
    pub saved_plan: Option<PlanSummary>,
    /// Present when age and sex allow a full calculation
    pub metrics: Option<MetricsResult>,
    pub profile: ProfileSummary,
    pub plan_duration: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePlanResponse {
    pub plan: HealthPlan,
    pub profile: ProfileSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInfo {
    pub id: Uuid,
    pub plan_name: String,
    pub overall_goal: String,
    pub start_date: DateTime<Utc>,
}

impl From<&HealthPlan> for PlanInfo {
    fn from(plan: &HealthPlan) -> Self {
        Self {
            id: plan.id,
            plan_name: plan.record.plan_name.clone(),
            overall_goal: plan.record.overall_goal.clone(),
            start_date: plan.record.start_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayPlanResponse {
    pub today: PlannedDay,
    pub plan_info: PlanInfo,
}

/// Plan status update; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatePlanStatusRequest {
    pub status: Option<String>,
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePlanStatusResponse {
    pub message: String,
    pub plan: PlanSummary,
}

// ============================================================================
// Activity Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackActivityRequest {
    pub profile_id: Uuid,
    #[serde(default)]
    pub plan_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub update: ActivityUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackActivityResponse {
    pub message: String,
    pub created: bool,
    pub activity: DailySummary,
}

/// Query for a stored week; defaults to the current week
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyProgressQuery {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyProgressResponse {
    pub week_start: NaiveDate,
    pub activities: Vec<DailySummary>,
    pub summary: WeeklyProgressSummary,
}

/// Summary over client-supplied days
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummaryRequest {
    pub activities: Vec<DailyActivity>,
}

// ============================================================================
// Advice Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionAdviceRequest {
    pub question: String,
    #[serde(default)]
    pub user_goal: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRoutineRequest {
    pub fitness_level: String,
    pub available_time: String,
    #[serde(default)]
    pub equipment: Option<String>,
    pub goals: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub response: String,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(25, 10, 3)]
    #[case(30, 10, 3)]
    fn test_total_pages(#[case] total: u64, #[case] per_page: u32, #[case] expected: u32) {
        let page: PaginatedResponse<u8> = PaginatedResponse::new(vec![], total, Pagination { page: 1, per_page });
        assert_eq!(page.total_pages, expected);
    }

    #[test]
    fn test_pagination_clamp_and_offset() {
        let pagination = Pagination { page: 0, per_page: 500 }.clamped();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.per_page, 100);
        assert_eq!(pagination.offset(), 0);

        assert_eq!(Pagination { page: 3, per_page: 10 }.offset(), 20);
    }

    #[test]
    fn test_track_activity_request_flattens_update() {
        let body = serde_json::json!({
            "profile_id": Uuid::nil(),
            "date": "2024-03-04",
            "water_intake": 6,
            "mood": "very_poor"
        });
        let request: TrackActivityRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.update.water_intake, Some(6));
        assert!(request.plan_id.is_none());
    }
}
