//! Postgres store
//!
//! Owns the `ConnectionState`. A store created while the database is down
//! keeps serving `Connection` errors and reconnects on the next call.

use super::{HealthStore, PlanStatusChange, StoreError, StoreResult};
use crate::config::DatabaseConfig;
use crate::db::{self, ConnectionState, DbConfig};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use vitatone_shared::activity::{DailyActivity, ExerciseCompletion, MealsCompleted, Mood};
use vitatone_shared::health_metrics::ActivityLevel;
use vitatone_shared::models::{ActivityRecord, HealthPlan, PlanSummary, Profile};
use vitatone_shared::plan::WeekPlan;
use vitatone_shared::plan_record::{PlanNote, PlanRecord, PlanStatus, ProgressMetric};
use vitatone_shared::profile::{Gender, NormalizedProfile};
use vitatone_shared::stats::{GoalCount, PlanCounts, UsageCounts, POPULAR_GOALS_LIMIT};
use vitatone_shared::types::Pagination;

const PROFILE_COLUMNS: &str = "id, email, full_name, date_of_birth, gender, weight_kg, height_cm, bmi, \
     goal, exercise_frequency, diet_preference, meals_per_day, plan_duration, fav_nutrition_type, \
     food_allergies, nutrition_days, meals_num, fav_workout, workout_goal, workout_days, \
     health_conditions, chronic_conditions, activity_level, active_plan_id, created_at, updated_at";

const PLAN_COLUMNS: &str = "id, profile_id, plan_name, daily_plans, generated_prompt, raw_ai_response, \
     overall_goal, target_weight, estimated_duration, progress_metrics, health_guidelines, \
     safety_notes, status, start_date, end_date, rating, user_notes, created_at";

const ACTIVITY_COLUMNS: &str = "id, profile_id, plan_id, activity_date, meals_completed, \
     exercises_completed, water_intake, sleep_hours, weight_kg, energy_level, mood, daily_notes, \
     challenges, achievements, updated_at";

/// Profile row from database
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: Option<String>,
    full_name: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: String,
    weight_kg: Decimal,
    height_cm: Decimal,
    bmi: Decimal,
    goal: String,
    exercise_frequency: String,
    diet_preference: String,
    meals_per_day: i64,
    plan_duration: String,
    fav_nutrition_type: Option<String>,
    food_allergies: Vec<String>,
    nutrition_days: i64,
    meals_num: i64,
    fav_workout: Option<String>,
    workout_goal: Option<String>,
    workout_days: i64,
    health_conditions: Vec<String>,
    chronic_conditions: Vec<String>,
    activity_level: String,
    active_plan_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> StoreResult<Self> {
        let gender: Gender = row.gender.parse().map_err(StoreError::Validation)?;
        Ok(Profile {
            id: row.id,
            data: NormalizedProfile {
                full_name: row.full_name,
                email: row.email,
                date_of_birth: row.date_of_birth,
                gender,
                weight_kg: to_f64(row.weight_kg),
                height_cm: to_f64(row.height_cm),
                bmi: to_f64(row.bmi),
                goal: row.goal,
                exercise_frequency: row.exercise_frequency,
                diet_preference: row.diet_preference,
                meals_per_day: row.meals_per_day,
                plan_duration: row.plan_duration,
                fav_nutrition_type: row.fav_nutrition_type,
                food_allergies: row.food_allergies,
                nutrition_days: row.nutrition_days,
                meals_num: row.meals_num,
                fav_workout: row.fav_workout,
                workout_goal: row.workout_goal,
                workout_days: row.workout_days,
                health_conditions: row.health_conditions,
                chronic_conditions: row.chronic_conditions,
                activity_level: ActivityLevel::from_label_lenient(&row.activity_level),
            },
            active_plan_id: row.active_plan_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Plan row from database
#[derive(Debug, Clone, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    profile_id: Uuid,
    plan_name: String,
    daily_plans: Json<WeekPlan>,
    generated_prompt: String,
    raw_ai_response: String,
    overall_goal: String,
    target_weight: Decimal,
    estimated_duration: String,
    progress_metrics: Json<Vec<ProgressMetric>>,
    health_guidelines: Vec<String>,
    safety_notes: Vec<String>,
    status: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    rating: Option<i16>,
    user_notes: Json<Vec<PlanNote>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for HealthPlan {
    type Error = StoreError;

    fn try_from(row: PlanRow) -> StoreResult<Self> {
        let status: PlanStatus = row.status.parse().map_err(StoreError::Validation)?;
        Ok(HealthPlan {
            id: row.id,
            profile_id: row.profile_id,
            record: PlanRecord {
                plan_name: row.plan_name,
                daily_plans: row.daily_plans.0,
                generated_prompt: row.generated_prompt,
                raw_ai_response: row.raw_ai_response,
                overall_goal: row.overall_goal,
                target_weight: to_f64(row.target_weight),
                estimated_duration: row.estimated_duration,
                progress_metrics: row.progress_metrics.0,
                health_guidelines: row.health_guidelines,
                safety_notes: row.safety_notes,
                status,
                start_date: row.start_date,
                end_date: row.end_date,
                rating: row.rating.and_then(|r| u8::try_from(r).ok()),
                user_notes: row.user_notes.0,
            },
            created_at: row.created_at,
        })
    }
}

/// Activity row from database
#[derive(Debug, Clone, sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    profile_id: Uuid,
    plan_id: Option<Uuid>,
    activity_date: NaiveDate,
    meals_completed: Json<MealsCompleted>,
    exercises_completed: Json<Vec<ExerciseCompletion>>,
    water_intake: i32,
    sleep_hours: Decimal,
    weight_kg: Option<Decimal>,
    energy_level: Option<i16>,
    mood: Option<String>,
    daily_notes: Option<String>,
    challenges: Vec<String>,
    achievements: Vec<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityRecord {
    type Error = StoreError;

    fn try_from(row: ActivityRow) -> StoreResult<Self> {
        let mood = row
            .mood
            .as_deref()
            .map(str::parse::<Mood>)
            .transpose()
            .map_err(StoreError::Validation)?;

        Ok(ActivityRecord {
            id: row.id,
            profile_id: row.profile_id,
            plan_id: row.plan_id,
            activity: DailyActivity {
                date: row.activity_date,
                meals_completed: row.meals_completed.0,
                exercises_completed: row.exercises_completed.0,
                water_intake: u32::try_from(row.water_intake).unwrap_or_default(),
                sleep_hours: to_f64(row.sleep_hours),
                weight_kg: row.weight_kg.map(to_f64),
                energy_level: row.energy_level.and_then(|e| u8::try_from(e).ok()),
                mood,
                daily_notes: row.daily_notes,
                challenges: row.challenges,
                achievements: row.achievements,
            },
            updated_at: row.updated_at,
        })
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn to_decimal(value: f64, field: &str) -> StoreResult<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| StoreError::Validation(format!("{} must be a finite number", field)))
}

fn to_count(value: i64) -> u64 {
    value.max(0) as u64
}

/// Plan counts for one profile, or across all profiles
async fn count_plans(pool: &PgPool, profile_id: Option<Uuid>) -> StoreResult<PlanCounts> {
    let (total, active, completed): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COUNT(*) FILTER (WHERE status = 'active'),
               COUNT(*) FILTER (WHERE status = 'completed')
        FROM health_plans
        WHERE $1::uuid IS NULL OR profile_id = $1
        "#,
    )
    .bind(profile_id)
    .fetch_one(pool)
    .await?;

    Ok(PlanCounts {
        total: to_count(total),
        active: to_count(active),
        completed: to_count(completed),
    })
}

/// `HealthStore` over Postgres
pub struct PgHealthStore {
    config: DbConfig,
    run_migrations: bool,
    state: RwLock<ConnectionState>,
}

impl PgHealthStore {
    /// Create the store and make the first connection attempt
    ///
    /// A failed attempt is logged and kept in the connection state; the store
    /// is still returned.
    pub async fn connect(config: &DatabaseConfig) -> Self {
        let store = Self {
            config: DbConfig::from(config),
            run_migrations: config.run_migrations,
            state: RwLock::new(ConnectionState::disconnected()),
        };

        let state = store.establish().await;
        if let Some(message) = state.last_error() {
            warn!(error = %message, "Starting without a database connection");
        }
        *store.state.write().await = state;
        store
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.is_connected()
    }

    async fn establish(&self) -> ConnectionState {
        let state = db::connect(&self.config).await;
        if let (Some(pool), true) = (state.pool(), self.run_migrations) {
            if let Err(e) = db::run_migrations(pool).await {
                error!(error = %e, "Database migrations failed");
                return ConnectionState::Disconnected {
                    last_error: Some(format!("Migrations failed: {}", e)),
                };
            }
        }
        state
    }

    /// Pool for the current connection, connecting first when needed
    async fn pool(&self) -> StoreResult<PgPool> {
        if let Some(pool) = self.state.read().await.pool() {
            return Ok(pool.clone());
        }

        let mut state = self.state.write().await;
        if !state.is_connected() {
            info!("Reconnecting to database");
            *state = self.establish().await;
        }

        state.pool().cloned().ok_or_else(|| {
            StoreError::Connection(
                state
                    .last_error()
                    .unwrap_or("Database unavailable")
                    .to_string(),
            )
        })
    }
}

#[async_trait]
impl HealthStore for PgHealthStore {
    #[instrument(skip(self))]
    async fn find_profile(&self, email: &str) -> StoreResult<Option<Profile>> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE email = $1",
            PROFILE_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn find_profile_by_id(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    #[instrument(skip(self, profile), fields(profile_id = %profile.id))]
    async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
        let pool = self.pool().await?;
        let data = &profile.data;

        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, email, full_name, date_of_birth, gender, weight_kg, height_cm, bmi,
                goal, exercise_frequency, diet_preference, meals_per_day, plan_duration,
                fav_nutrition_type, food_allergies, nutrition_days, meals_num, fav_workout,
                workout_goal, workout_days, health_conditions, chronic_conditions,
                activity_level, active_plan_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                date_of_birth = EXCLUDED.date_of_birth,
                gender = EXCLUDED.gender,
                weight_kg = EXCLUDED.weight_kg,
                height_cm = EXCLUDED.height_cm,
                bmi = EXCLUDED.bmi,
                goal = EXCLUDED.goal,
                exercise_frequency = EXCLUDED.exercise_frequency,
                diet_preference = EXCLUDED.diet_preference,
                meals_per_day = EXCLUDED.meals_per_day,
                plan_duration = EXCLUDED.plan_duration,
                fav_nutrition_type = EXCLUDED.fav_nutrition_type,
                food_allergies = EXCLUDED.food_allergies,
                nutrition_days = EXCLUDED.nutrition_days,
                meals_num = EXCLUDED.meals_num,
                fav_workout = EXCLUDED.fav_workout,
                workout_goal = EXCLUDED.workout_goal,
                workout_days = EXCLUDED.workout_days,
                health_conditions = EXCLUDED.health_conditions,
                chronic_conditions = EXCLUDED.chronic_conditions,
                activity_level = EXCLUDED.activity_level,
                active_plan_id = EXCLUDED.active_plan_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.id)
        .bind(&data.email)
        .bind(&data.full_name)
        .bind(data.date_of_birth)
        .bind(data.gender.as_str())
        .bind(to_decimal(data.weight_kg, "weight_kg")?)
        .bind(to_decimal(data.height_cm, "height_cm")?)
        .bind(to_decimal(data.bmi, "bmi")?)
        .bind(&data.goal)
        .bind(&data.exercise_frequency)
        .bind(&data.diet_preference)
        .bind(data.meals_per_day)
        .bind(&data.plan_duration)
        .bind(&data.fav_nutrition_type)
        .bind(&data.food_allergies)
        .bind(data.nutrition_days)
        .bind(data.meals_num)
        .bind(&data.fav_workout)
        .bind(&data.workout_goal)
        .bind(data.workout_days)
        .bind(&data.health_conditions)
        .bind(&data.chronic_conditions)
        .bind(data.activity_level.as_str())
        .bind(profile.active_plan_id)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&pool)
        .await?;

        debug!("Profile saved");
        Ok(())
    }

    #[instrument(skip(self, plan), fields(plan_id = %plan.id, profile_id = %plan.profile_id))]
    async fn save_plan(&self, plan: &HealthPlan) -> StoreResult<()> {
        let pool = self.pool().await?;
        let record = &plan.record;

        sqlx::query(
            r#"
            INSERT INTO health_plans (
                id, profile_id, plan_name, daily_plans, generated_prompt, raw_ai_response,
                overall_goal, target_weight, estimated_duration, progress_metrics,
                health_guidelines, safety_notes, status, start_date, end_date, rating,
                user_notes, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(plan.id)
        .bind(plan.profile_id)
        .bind(&record.plan_name)
        .bind(Json(&record.daily_plans))
        .bind(&record.generated_prompt)
        .bind(&record.raw_ai_response)
        .bind(&record.overall_goal)
        .bind(to_decimal(record.target_weight, "target_weight")?)
        .bind(&record.estimated_duration)
        .bind(Json(&record.progress_metrics))
        .bind(&record.health_guidelines)
        .bind(&record.safety_notes)
        .bind(record.status.as_str())
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.rating.map(i16::from))
        .bind(Json(&record.user_notes))
        .bind(plan.created_at)
        .execute(&pool)
        .await?;

        debug!("Plan saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn deactivate_active_plans(&self, profile_id: Uuid) -> StoreResult<u64> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "UPDATE health_plans SET status = 'paused' WHERE profile_id = $1 AND status = 'active'",
        )
        .bind(profile_id)
        .execute(&pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn active_plan(&self, profile_id: Uuid) -> StoreResult<Option<HealthPlan>> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {} FROM health_plans WHERE profile_id = $1 AND status = 'active' \
             ORDER BY created_at DESC LIMIT 1",
            PLAN_COLUMNS
        ))
        .bind(profile_id)
        .fetch_optional(&pool)
        .await?;

        row.map(HealthPlan::try_from).transpose()
    }

    async fn list_plans(
        &self,
        profile_id: Uuid,
        pagination: Pagination,
    ) -> StoreResult<(Vec<PlanSummary>, u64)> {
        let pool = self.pool().await?;

        let rows = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {} FROM health_plans WHERE profile_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            PLAN_COLUMNS
        ))
        .bind(profile_id)
        .bind(i64::from(pagination.per_page))
        .bind(pagination.offset() as i64)
        .fetch_all(&pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM health_plans WHERE profile_id = $1")
            .bind(profile_id)
            .fetch_one(&pool)
            .await?;

        let summaries = rows
            .into_iter()
            .map(|row| HealthPlan::try_from(row).map(|plan| plan.summary()))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((summaries, total.0.max(0) as u64))
    }

    #[instrument(skip(self, change))]
    async fn update_plan_status(
        &self,
        plan_id: Uuid,
        change: &PlanStatusChange,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<HealthPlan>> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;

        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {} FROM health_plans WHERE id = $1 FOR UPDATE",
            PLAN_COLUMNS
        ))
        .bind(plan_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut plan = HealthPlan::try_from(row)?;
        change
            .apply(&mut plan.record, now)
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        sqlx::query(
            "UPDATE health_plans SET status = $2, end_date = $3, rating = $4, user_notes = $5 WHERE id = $1",
        )
        .bind(plan.id)
        .bind(plan.record.status.as_str())
        .bind(plan.record.end_date)
        .bind(plan.record.rating.map(i16::from))
        .bind(Json(&plan.record.user_notes))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(plan))
    }

    async fn find_activity(
        &self,
        profile_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<ActivityRecord>> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {} FROM daily_activities WHERE profile_id = $1 AND activity_date = $2",
            ACTIVITY_COLUMNS
        ))
        .bind(profile_id)
        .bind(date)
        .fetch_optional(&pool)
        .await?;

        row.map(ActivityRecord::try_from).transpose()
    }

    #[instrument(skip(self, record), fields(profile_id = %record.profile_id, date = %record.activity.date))]
    async fn upsert_activity(&self, record: &ActivityRecord) -> StoreResult<()> {
        let pool = self.pool().await?;
        let activity = &record.activity;
        let water_intake = i32::try_from(activity.water_intake)
            .map_err(|_| StoreError::Validation("water_intake is out of range".to_string()))?;
        let weight_kg = activity
            .weight_kg
            .map(|w| to_decimal(w, "weight_kg"))
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO daily_activities (
                id, profile_id, plan_id, activity_date, meals_completed, exercises_completed,
                water_intake, sleep_hours, weight_kg, energy_level, mood, daily_notes,
                challenges, achievements, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (profile_id, activity_date) DO UPDATE SET
                plan_id = EXCLUDED.plan_id,
                meals_completed = EXCLUDED.meals_completed,
                exercises_completed = EXCLUDED.exercises_completed,
                water_intake = EXCLUDED.water_intake,
                sleep_hours = EXCLUDED.sleep_hours,
                weight_kg = EXCLUDED.weight_kg,
                energy_level = EXCLUDED.energy_level,
                mood = EXCLUDED.mood,
                daily_notes = EXCLUDED.daily_notes,
                challenges = EXCLUDED.challenges,
                achievements = EXCLUDED.achievements,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.profile_id)
        .bind(record.plan_id)
        .bind(activity.date)
        .bind(Json(&activity.meals_completed))
        .bind(Json(&activity.exercises_completed))
        .bind(water_intake)
        .bind(to_decimal(activity.sleep_hours, "sleep_hours")?)
        .bind(weight_kg)
        .bind(activity.energy_level.map(i16::from))
        .bind(activity.mood.map(|m| m.as_str()))
        .bind(&activity.daily_notes)
        .bind(&activity.challenges)
        .bind(&activity.achievements)
        .bind(record.updated_at)
        .execute(&pool)
        .await?;

        Ok(())
    }

    async fn activities_between(
        &self,
        profile_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> StoreResult<Vec<ActivityRecord>> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {} FROM daily_activities \
             WHERE profile_id = $1 AND activity_date >= $2 AND activity_date < $3 \
             ORDER BY activity_date",
            ACTIVITY_COLUMNS
        ))
        .bind(profile_id)
        .bind(from)
        .bind(until)
        .fetch_all(&pool)
        .await?;

        rows.into_iter().map(ActivityRecord::try_from).collect()
    }

    async fn plan_counts(&self, profile_id: Uuid) -> StoreResult<PlanCounts> {
        let pool = self.pool().await?;
        count_plans(&pool, Some(profile_id)).await
    }

    #[instrument(skip(self))]
    async fn usage_counts(
        &self,
        active_since: DateTime<Utc>,
        activity_since: DateTime<Utc>,
    ) -> StoreResult<UsageCounts> {
        let pool = self.pool().await?;

        let (profiles, active_profiles, average_bmi, bmi_samples): (i64, i64, Option<Decimal>, i64) =
            sqlx::query_as(
                "SELECT COUNT(*), COUNT(*) FILTER (WHERE updated_at >= $1), AVG(bmi), COUNT(bmi) \
                 FROM profiles",
            )
            .bind(active_since)
            .fetch_one(&pool)
            .await?;

        let goals: Vec<(String, i64)> = sqlx::query_as(
            "SELECT goal, COUNT(*) FROM profiles WHERE btrim(goal) <> '' \
             GROUP BY goal ORDER BY COUNT(*) DESC, goal ASC LIMIT $1",
        )
        .bind(POPULAR_GOALS_LIMIT as i64)
        .fetch_all(&pool)
        .await?;

        let (recent_activities,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM daily_activities WHERE updated_at >= $1")
                .bind(activity_since)
                .fetch_one(&pool)
                .await?;

        Ok(UsageCounts {
            profiles: to_count(profiles),
            active_profiles: to_count(active_profiles),
            plans: count_plans(&pool, None).await?,
            average_bmi: average_bmi.map(to_f64),
            bmi_samples: to_count(bmi_samples),
            popular_goals: goals
                .into_iter()
                .map(|(goal, count)| GoalCount {
                    goal,
                    count: to_count(count),
                })
                .collect(),
            recent_activities: to_count(recent_activities),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let current = std::mem::replace(&mut *state, ConnectionState::disconnected());

        *state = if current.is_connected() {
            db::ensure_connection(&self.config, current).await
        } else {
            self.establish().await
        };

        match state.last_error() {
            None => Ok(()),
            Some(message) => Err(StoreError::Connection(message.to_string())),
        }
    }
}
