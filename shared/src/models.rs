//! Stored data models

use crate::activity::DailyActivity;
use crate::plan_record::{PlanRecord, PlanStatus};
use crate::profile::NormalizedProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: NormalizedProfile,
    pub active_plan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(data: NormalizedProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            data,
            active_plan_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the profile data, keeping identity and creation time
    pub fn update(&mut self, data: NormalizedProfile, now: DateTime<Utc>) {
        self.data = data;
        self.updated_at = now;
    }
}

/// A persisted plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPlan {
    pub id: Uuid,
    pub profile_id: Uuid,
    #[serde(flatten)]
    pub record: PlanRecord,
    pub created_at: DateTime<Utc>,
}

impl HealthPlan {
    pub fn new(profile_id: Uuid, record: PlanRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            record,
            created_at: now,
        }
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            id: self.id,
            plan_name: self.record.plan_name.clone(),
            overall_goal: self.record.overall_goal.clone(),
            status: self.record.status,
            start_date: self.record.start_date,
            end_date: self.record.end_date,
            estimated_duration: self.record.estimated_duration.clone(),
            daily_plans_count: self.record.daily_plans.days().len(),
            rating: self.record.rating,
            created_at: self.created_at,
        }
    }
}

/// Listing view of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: Uuid,
    pub plan_name: String,
    pub overall_goal: String,
    pub status: PlanStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub estimated_duration: String,
    pub daily_plans_count: usize,
    pub rating: Option<u8>,
    pub created_at: DateTime<Utc>,
}

/// A persisted day of tracked activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub plan_id: Option<Uuid>,
    #[serde(flatten)]
    pub activity: DailyActivity,
    pub updated_at: DateTime<Utc>,
}
