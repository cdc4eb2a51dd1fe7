//! Plan and usage counters, and the rates reported from them

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profiles updated within this many days count as active
pub const ACTIVE_PROFILE_DAYS: i64 = 30;

/// Activity tracked within this many days counts as recent
pub const RECENT_ACTIVITY_DAYS: i64 = 7;

/// Number of goals listed in the usage overview
pub const POPULAR_GOALS_LIMIT: usize = 5;

/// Plan counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCounts {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalCount {
    pub goal: String,
    pub count: u64,
}

/// Raw counters read from the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageCounts {
    pub profiles: u64,
    pub active_profiles: u64,
    pub plans: PlanCounts,
    /// Mean BMI over `bmi_samples` profiles
    pub average_bmi: Option<f64>,
    pub bmi_samples: u64,
    /// Most common goals, most frequent first
    pub popular_goals: Vec<GoalCount>,
    pub recent_activities: u64,
}

/// Plan figures for one profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePlanStats {
    pub total_plans: u64,
    pub completed_plans: u64,
    pub has_active_plan: bool,
    pub active_plan_id: Option<Uuid>,
}

impl ProfilePlanStats {
    pub fn new(counts: PlanCounts, active_plan_id: Option<Uuid>) -> Self {
        Self {
            total_plans: counts.total,
            completed_plans: counts.completed,
            has_active_plan: active_plan_id.is_some(),
            active_plan_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUsage {
    pub total: u64,
    pub active: u64,
    /// Percent of profiles that are active
    pub activity_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanUsage {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
    /// Percent of plans that were completed
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiUsage {
    /// Rounded to one decimal
    pub average_bmi: Option<f64>,
    pub bmi_sample_size: u64,
}

/// Service-wide usage overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub users: ProfileUsage,
    pub plans: PlanUsage,
    pub health: BmiUsage,
    pub popular_goals: Vec<GoalCount>,
    pub recent_activity: u64,
}

impl From<UsageCounts> for UsageStats {
    fn from(counts: UsageCounts) -> Self {
        Self {
            users: ProfileUsage {
                total: counts.profiles,
                active: counts.active_profiles,
                activity_rate: percent(counts.active_profiles, counts.profiles),
            },
            plans: PlanUsage {
                total: counts.plans.total,
                active: counts.plans.active,
                completed: counts.plans.completed,
                completion_rate: percent(counts.plans.completed, counts.plans.total),
            },
            health: BmiUsage {
                average_bmi: counts
                    .average_bmi
                    .filter(|bmi| bmi.is_finite())
                    .map(|bmi| (bmi * 10.0).round() / 10.0),
                bmi_sample_size: counts.bmi_samples,
            },
            popular_goals: counts.popular_goals,
            recent_activity: counts.recent_activities,
        }
    }
}

/// `part` as a whole percentage of `total`; 0 when `total` is 0
pub fn percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Rank goals by frequency, ties broken alphabetically, keeping the first
/// `POPULAR_GOALS_LIMIT`
pub fn rank_goals<'a>(goals: impl IntoIterator<Item = &'a str>) -> Vec<GoalCount> {
    let mut counts: Vec<GoalCount> = Vec::new();
    for goal in goals.into_iter().map(str::trim).filter(|g| !g.is_empty()) {
        match counts.iter_mut().find(|c| c.goal == goal) {
            Some(entry) => entry.count += 1,
            None => counts.push(GoalCount {
                goal: goal.to_string(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.goal.cmp(&b.goal)));
    counts.truncate(POPULAR_GOALS_LIMIT);
    counts
}
