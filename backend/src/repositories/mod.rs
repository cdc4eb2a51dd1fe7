//! Persistence for profiles, plans and tracked activity
//!
//! Services depend on the `HealthStore` trait. `PgHealthStore` is the
//! production implementation; `InMemoryHealthStore` backs local runs and the
//! integration tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;
use vitatone_shared::models::{ActivityRecord, HealthPlan, PlanSummary, Profile};
use vitatone_shared::plan_record::{PlanRecord, PlanStatus};
use vitatone_shared::stats::{PlanCounts, UsageCounts};
use vitatone_shared::types::Pagination;
use vitatone_shared::CoreResult;

mod memory;
mod postgres;

pub use memory::InMemoryHealthStore;
pub use postgres::PgHealthStore;

/// Store failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backing database could not be reached
    #[error("Store unavailable: {0}")]
    Connection(String),

    /// The write was rejected by a constraint
    #[error("Store rejected data: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.is_check_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.code().is_some_and(|code| rejects_data(&code)) =>
            {
                StoreError::Validation(db_err.message().to_string())
            }
            _ => StoreError::Connection(err.to_string()),
        }
    }
}

/// SQLSTATE classes raised by the values written: 22 data exception, 23
/// integrity constraint violation
fn rejects_data(sqlstate: &str) -> bool {
    sqlstate.starts_with("22") || sqlstate.starts_with("23")
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A change requested on a stored plan
#[derive(Debug, Clone, Default)]
pub struct PlanStatusChange {
    pub status: Option<PlanStatus>,
    pub rating: Option<u8>,
    pub note: Option<String>,
}

impl PlanStatusChange {
    /// Apply the change to `record` as of `now`
    pub fn apply(&self, record: &mut PlanRecord, now: DateTime<Utc>) -> CoreResult<()> {
        if let Some(status) = self.status {
            record.set_status(status, now);
        }
        if let Some(rating) = self.rating {
            record.set_rating(rating)?;
        }
        if let Some(note) = &self.note {
            record.add_note(note, now);
        }
        Ok(())
    }
}

/// Persistence interface used by the services
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Profile registered under `email` (already lower-cased)
    async fn find_profile(&self, email: &str) -> StoreResult<Option<Profile>>;

    async fn find_profile_by_id(&self, id: Uuid) -> StoreResult<Option<Profile>>;

    /// Insert or replace a profile by id
    async fn save_profile(&self, profile: &Profile) -> StoreResult<()>;

    async fn save_plan(&self, plan: &HealthPlan) -> StoreResult<()>;

    /// Pause every active plan of a profile, returning how many changed
    async fn deactivate_active_plans(&self, profile_id: Uuid) -> StoreResult<u64>;

    /// Most recently created active plan
    async fn active_plan(&self, profile_id: Uuid) -> StoreResult<Option<HealthPlan>>;

    /// Plans newest first, with the total count
    async fn list_plans(
        &self,
        profile_id: Uuid,
        pagination: Pagination,
    ) -> StoreResult<(Vec<PlanSummary>, u64)>;

    /// Apply `change` to a plan; `None` when the plan does not exist
    async fn update_plan_status(
        &self,
        plan_id: Uuid,
        change: &PlanStatusChange,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<HealthPlan>>;

    async fn find_activity(
        &self,
        profile_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<ActivityRecord>>;

    /// Insert or replace the activity for its (profile, date)
    async fn upsert_activity(&self, record: &ActivityRecord) -> StoreResult<()>;

    /// Activities with `from <= date < until`, oldest first
    async fn activities_between(
        &self,
        profile_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> StoreResult<Vec<ActivityRecord>>;

    /// Plan counts by status for one profile
    async fn plan_counts(&self, profile_id: Uuid) -> StoreResult<PlanCounts>;

    /// Service-wide counters; profiles updated since `active_since` are
    /// active, activity updated since `activity_since` is recent
    async fn usage_counts(
        &self,
        active_since: DateTime<Utc>,
        activity_since: DateTime<Utc>,
    ) -> StoreResult<UsageCounts>;

    /// Check the store is reachable
    async fn ping(&self) -> StoreResult<()>;
}
