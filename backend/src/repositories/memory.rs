//! In-process store

use super::{HealthStore, PlanStatusChange, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use vitatone_shared::models::{ActivityRecord, HealthPlan, PlanSummary, Profile};
use vitatone_shared::plan_record::PlanStatus;
use vitatone_shared::stats::{rank_goals, PlanCounts, UsageCounts};
use vitatone_shared::types::Pagination;

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    plans: HashMap<Uuid, HealthPlan>,
    activities: HashMap<(Uuid, NaiveDate), ActivityRecord>,
}

/// `HealthStore` kept in memory, lost on restart
#[derive(Default)]
pub struct InMemoryHealthStore {
    tables: RwLock<Tables>,
}

impl InMemoryHealthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthStore for InMemoryHealthStore {
    async fn find_profile(&self, email: &str) -> StoreResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .find(|p| p.data.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_profile_by_id(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        if let Some(email) = profile.data.email.as_deref() {
            let taken = tables
                .profiles
                .values()
                .any(|p| p.id != profile.id && p.data.email.as_deref() == Some(email));
            if taken {
                return Err(StoreError::Validation(format!(
                    "A profile with email {} already exists",
                    email
                )));
            }
        }

        tables.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn save_plan(&self, plan: &HealthPlan) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&plan.profile_id) {
            return Err(StoreError::Validation(format!(
                "Profile {} does not exist",
                plan.profile_id
            )));
        }
        tables.plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn deactivate_active_plans(&self, profile_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for plan in tables.plans.values_mut() {
            if plan.profile_id == profile_id && plan.record.status == PlanStatus::Active {
                plan.record.status = PlanStatus::Paused;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn active_plan(&self, profile_id: Uuid) -> StoreResult<Option<HealthPlan>> {
        let tables = self.tables.read().await;
        Ok(tables
            .plans
            .values()
            .filter(|p| p.profile_id == profile_id && p.record.status == PlanStatus::Active)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn list_plans(
        &self,
        profile_id: Uuid,
        pagination: Pagination,
    ) -> StoreResult<(Vec<PlanSummary>, u64)> {
        let tables = self.tables.read().await;
        let mut plans: Vec<&HealthPlan> = tables
            .plans
            .values()
            .filter(|p| p.profile_id == profile_id)
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = plans.len() as u64;
        let page = plans
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.per_page as usize)
            .map(HealthPlan::summary)
            .collect();

        Ok((page, total))
    }

    async fn update_plan_status(
        &self,
        plan_id: Uuid,
        change: &PlanStatusChange,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<HealthPlan>> {
        let mut tables = self.tables.write().await;
        let Some(plan) = tables.plans.get_mut(&plan_id) else {
            return Ok(None);
        };

        let mut record = plan.record.clone();
        change
            .apply(&mut record, now)
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        plan.record = record;

        Ok(Some(plan.clone()))
    }

    async fn find_activity(
        &self,
        profile_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<ActivityRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .activities
            .get(&(profile_id, date))
            .cloned())
    }

    async fn upsert_activity(&self, record: &ActivityRecord) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&record.profile_id) {
            return Err(StoreError::Validation(format!(
                "Profile {} does not exist",
                record.profile_id
            )));
        }
        tables
            .activities
            .insert((record.profile_id, record.activity.date), record.clone());
        Ok(())
    }

    async fn activities_between(
        &self,
        profile_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> StoreResult<Vec<ActivityRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<ActivityRecord> = tables
            .activities
            .values()
            .filter(|r| r.profile_id == profile_id && r.activity.date >= from && r.activity.date < until)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.activity.date);
        Ok(records)
    }

    async fn plan_counts(&self, profile_id: Uuid) -> StoreResult<PlanCounts> {
        let tables = self.tables.read().await;
        Ok(count_plans(
            tables.plans.values().filter(|p| p.profile_id == profile_id),
        ))
    }

    async fn usage_counts(
        &self,
        active_since: DateTime<Utc>,
        activity_since: DateTime<Utc>,
    ) -> StoreResult<UsageCounts> {
        let tables = self.tables.read().await;
        let profiles: Vec<&Profile> = tables.profiles.values().collect();
        let bmis: Vec<f64> = profiles
            .iter()
            .map(|p| p.data.bmi)
            .filter(|bmi| bmi.is_finite())
            .collect();

        Ok(UsageCounts {
            profiles: profiles.len() as u64,
            active_profiles: profiles
                .iter()
                .filter(|p| p.updated_at >= active_since)
                .count() as u64,
            plans: count_plans(tables.plans.values()),
            average_bmi: (!bmis.is_empty()).then(|| bmis.iter().sum::<f64>() / bmis.len() as f64),
            bmi_samples: bmis.len() as u64,
            popular_goals: rank_goals(profiles.iter().map(|p| p.data.goal.as_str())),
            recent_activities: tables
                .activities
                .values()
                .filter(|r| r.updated_at >= activity_since)
                .count() as u64,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

fn count_plans<'a>(plans: impl Iterator<Item = &'a HealthPlan>) -> PlanCounts {
    plans.fold(PlanCounts::default(), |mut counts, plan| {
        counts.total += 1;
        match plan.record.status {
            PlanStatus::Active => counts.active += 1,
            PlanStatus::Completed => counts.completed += 1,
            _ => {}
        }
        counts
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vitatone_shared::activity::DailyActivity;
    use vitatone_shared::plan::{normalize_to_week, DayPlan};
    use vitatone_shared::plan_record::build_plan_record;
    use vitatone_shared::NormalizedProfile;

    fn profile(email: &str) -> Profile {
        let data = NormalizedProfile {
            email: Some(email.to_string()),
            ..Default::default()
        };
        Profile::new(data, Utc::now())
    }

    fn plan_for(profile: &Profile, created_at: DateTime<Utc>) -> HealthPlan {
        let week = normalize_to_week(&[DayPlan::default()], created_at).unwrap();
        let record = build_plan_record(&profile.data, week, "[]", "prompt", created_at);
        HealthPlan::new(profile.id, record, created_at)
    }

    #[tokio::test]
    async fn test_profile_round_trip_by_email_and_id() {
        let store = InMemoryHealthStore::new();
        let saved = profile("ana@example.com");
        store.save_profile(&saved).await.unwrap();

        let by_email = store.find_profile("ana@example.com").await.unwrap();
        assert_eq!(by_email.as_ref().map(|p| p.id), Some(saved.id));
        assert!(store.find_profile_by_id(saved.id).await.unwrap().is_some());
        assert!(store.find_profile("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryHealthStore::new();
        store.save_profile(&profile("dup@example.com")).await.unwrap();

        let result = store.save_profile(&profile("dup@example.com")).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_supersession_leaves_one_active_plan() {
        let store = InMemoryHealthStore::new();
        let owner = profile("plans@example.com");
        store.save_profile(&owner).await.unwrap();

        let now = Utc::now();
        let first = plan_for(&owner, now - Duration::days(1));
        store.save_plan(&first).await.unwrap();

        assert_eq!(store.deactivate_active_plans(owner.id).await.unwrap(), 1);
        let second = plan_for(&owner, now);
        store.save_plan(&second).await.unwrap();

        let active = store.active_plan(owner.id).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);

        let (history, total) = store.list_plans(owner.id, Pagination::default()).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].status, PlanStatus::Paused);
    }

    #[tokio::test]
    async fn test_plan_and_usage_counts() {
        let store = InMemoryHealthStore::new();
        let owner = profile("counts@example.com");
        let other = profile("other@example.com");
        store.save_profile(&owner).await.unwrap();
        store.save_profile(&other).await.unwrap();

        let now = Utc::now();
        let done = plan_for(&owner, now - Duration::days(2));
        store.save_plan(&done).await.unwrap();
        let change = PlanStatusChange {
            status: Some(PlanStatus::Completed),
            ..Default::default()
        };
        store.update_plan_status(done.id, &change, now).await.unwrap();
        store.save_plan(&plan_for(&owner, now)).await.unwrap();
        store.save_plan(&plan_for(&other, now)).await.unwrap();

        let counts = store.plan_counts(owner.id).await.unwrap();
        assert_eq!(counts, PlanCounts { total: 2, active: 1, completed: 1 });
        assert_eq!(store.plan_counts(Uuid::new_v4()).await.unwrap(), PlanCounts::default());

        let usage = store
            .usage_counts(now - Duration::days(30), now - Duration::days(7))
            .await
            .unwrap();
        assert_eq!(usage.profiles, 2);
        assert_eq!(usage.active_profiles, 2);
        assert_eq!(usage.plans, PlanCounts { total: 3, active: 2, completed: 1 });
        assert_eq!(usage.bmi_samples, 2);
        assert_eq!(usage.popular_goals.len(), 1);
        assert_eq!(usage.popular_goals[0].count, 2);
        assert_eq!(usage.recent_activities, 0);

        let later = store
            .usage_counts(now + Duration::days(1), now + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(later.active_profiles, 0);
    }

    #[tokio::test]
    async fn test_update_missing_plan_is_none() {
        let store = InMemoryHealthStore::new();
        let result = store
            .update_plan_status(Uuid::new_v4(), &PlanStatusChange::default(), Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_activities_between_is_half_open() {
        let store = InMemoryHealthStore::new();
        let owner = profile("days@example.com");
        store.save_profile(&owner).await.unwrap();

        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        for offset in [0, 3, 7] {
            let record = ActivityRecord {
                id: Uuid::new_v4(),
                profile_id: owner.id,
                plan_id: None,
                activity: DailyActivity::new(monday + Duration::days(offset)),
                updated_at: Utc::now(),
            };
            store.upsert_activity(&record).await.unwrap();
        }

        let week = store
            .activities_between(owner.id, monday, monday + Duration::days(7))
            .await
            .unwrap();
        let dates: Vec<NaiveDate> = week.iter().map(|r| r.activity.date).collect();
        assert_eq!(dates, vec![monday, monday + Duration::days(3)]);
    }
}
