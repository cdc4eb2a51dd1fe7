//! Daily activity tracking and weekly progress

use crate::error::ApiError;
use crate::repositories::HealthStore;
use chrono::{NaiveDate, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;
use vitatone_shared::activity::{week_range, week_start, DailyActivity, WeeklyProgressSummary};
use vitatone_shared::models::ActivityRecord;
use vitatone_shared::types::{TrackActivityRequest, TrackActivityResponse, WeeklyProgressResponse};

/// Activity service for business logic
pub struct ActivityService;

impl ActivityService {
    /// Record the day's activity, merging into what is already stored for that date
    #[instrument(skip(store, request), fields(profile_id = %request.profile_id, date = %request.date))]
    pub async fn track(
        store: &dyn HealthStore,
        request: TrackActivityRequest,
    ) -> Result<TrackActivityResponse, ApiError> {
        if store.find_profile_by_id(request.profile_id).await?.is_none() {
            return Err(ApiError::NotFound("Profile not found".to_string()));
        }

        let existing = store.find_activity(request.profile_id, request.date).await?;
        let created = existing.is_none();

        let (id, plan_id, base) = match existing {
            Some(record) => (record.id, record.plan_id, record.activity),
            None => (Uuid::new_v4(), None, DailyActivity::new(request.date)),
        };

        let record = ActivityRecord {
            id,
            profile_id: request.profile_id,
            plan_id: request.plan_id.or(plan_id),
            activity: base.merge(request.update)?,
            updated_at: Utc::now(),
        };
        store.upsert_activity(&record).await?;

        debug!(created, completion = record.activity.completion_percentage(), "Activity stored");

        let message = if created {
            "Activity tracked successfully"
        } else {
            "Activity updated successfully"
        };

        Ok(TrackActivityResponse {
            message: message.to_string(),
            created,
            activity: record.activity.summary(),
        })
    }

    /// Stored days and summary for the week starting at `start`
    ///
    /// Defaults to the Monday of the current week.
    pub async fn weekly_progress(
        store: &dyn HealthStore,
        profile_id: Uuid,
        start: Option<NaiveDate>,
    ) -> Result<WeeklyProgressResponse, ApiError> {
        let start = match start {
            Some(start) => start,
            None => week_start(Utc::now().date_naive())?,
        };
        let (from, until) = week_range(start)?;

        let activities: Vec<DailyActivity> = store
            .activities_between(profile_id, from, until)
            .await?
            .into_iter()
            .map(|record| record.activity)
            .collect();

        Ok(WeeklyProgressResponse {
            week_start: start,
            activities: activities.iter().map(DailyActivity::summary).collect(),
            summary: WeeklyProgressSummary::from_activities(&activities),
        })
    }

    /// Summarize days supplied by the client without touching the store
    pub fn summarize(activities: &[DailyActivity]) -> Result<WeeklyProgressSummary, ApiError> {
        for activity in activities {
            activity.validate()?;
        }
        Ok(WeeklyProgressSummary::from_activities(activities))
    }
}
