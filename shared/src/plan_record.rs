//! Plan aggregator
//!
//! Wraps a normalized week in the metadata stored with every plan: name,
//! progress metrics, guidelines, safety notes and lifecycle status.

use crate::errors::{CoreError, CoreResult};
use crate::plan::WeekPlan;
use crate::profile::NormalizedProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const HEALTH_GUIDELINES: [&str; 4] = [
    "Follow your meal plan consistently",
    "Stay hydrated with at least 8 glasses of water daily",
    "Get adequate sleep (7-9 hours per night)",
    "Listen to your body and rest when needed",
];

pub const SAFETY_NOTES: [&str; 3] = [
    "Consult with healthcare provider before starting new exercise routines",
    "Monitor any existing health conditions closely",
    "Stop exercising if you experience unusual symptoms",
];

/// Plan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "active",
            PlanStatus::Paused => "paused",
            PlanStatus::Completed => "completed",
            PlanStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(PlanStatus::Active),
            "paused" => Ok(PlanStatus::Paused),
            "completed" => Ok(PlanStatus::Completed),
            "cancelled" => Ok(PlanStatus::Cancelled),
            _ => Err("Status must be one of: active, completed, paused, cancelled".to_string()),
        }
    }
}

/// A metric the user tracks against the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressMetric {
    pub metric_name: String,
    pub target_value: String,
    pub current_value: String,
    pub unit: String,
}

impl ProgressMetric {
    fn new(name: &str, target: impl ToString, unit: &str) -> Self {
        Self {
            metric_name: name.to_string(),
            target_value: target.to_string(),
            current_value: "0".to_string(),
            unit: unit.to_string(),
        }
    }
}

/// Free-text note the user attached to a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNote {
    pub date: DateTime<Utc>,
    pub note: String,
}

/// Everything stored about one generated plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub plan_name: String,
    pub daily_plans: WeekPlan,
    pub generated_prompt: String,
    pub raw_ai_response: String,
    pub overall_goal: String,
    pub target_weight: f64,
    pub estimated_duration: String,
    pub progress_metrics: Vec<ProgressMetric>,
    pub health_guidelines: Vec<String>,
    pub safety_notes: Vec<String>,
    pub status: PlanStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub rating: Option<u8>,
    pub user_notes: Vec<PlanNote>,
}

/// Assemble the stored record for a freshly generated week
///
/// Safety notes are attached only when the profile declares a health or
/// chronic condition.
pub fn build_plan_record(
    profile: &NormalizedProfile,
    week: WeekPlan,
    raw_output: &str,
    prompt: &str,
    started_at: DateTime<Utc>,
) -> PlanRecord {
    let safety_notes = if profile.has_conditions() {
        SAFETY_NOTES.iter().map(|note| note.to_string()).collect()
    } else {
        Vec::new()
    };

    PlanRecord {
        plan_name: format!("{}'s Health Plan", profile.display_name()),
        daily_plans: week,
        generated_prompt: prompt.to_string(),
        raw_ai_response: raw_output.to_string(),
        overall_goal: profile.goal.clone(),
        target_weight: profile.weight_kg,
        estimated_duration: profile.plan_duration.clone(),
        progress_metrics: vec![
            ProgressMetric::new("Weight", profile.weight_kg, "kg"),
            ProgressMetric::new("BMI", profile.bmi, "kg/m²"),
            ProgressMetric::new("Weekly Exercise Sessions", profile.workout_days, "sessions"),
        ],
        health_guidelines: HEALTH_GUIDELINES.iter().map(|g| g.to_string()).collect(),
        safety_notes,
        status: PlanStatus::Active,
        start_date: started_at,
        end_date: None,
        rating: None,
        user_notes: Vec::new(),
    }
}

impl PlanRecord {
    /// Move to `status`; completing a plan stamps its end date
    pub fn set_status(&mut self, status: PlanStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == PlanStatus::Completed {
            self.end_date = Some(now);
        }
    }

    /// Record a 1-5 rating
    pub fn set_rating(&mut self, rating: u8) -> CoreResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(CoreError::invalid("Rating must be between 1 and 5"));
        }
        self.rating = Some(rating);
        Ok(())
    }

    pub fn add_note(&mut self, note: &str, now: DateTime<Utc>) {
        let note = note.trim();
        if !note.is_empty() {
            self.user_notes.push(PlanNote {
                date: now,
                note: note.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{normalize_to_week, DayPlan};
    use chrono::{Duration, TimeZone};

    fn started_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    fn week() -> WeekPlan {
        let day = DayPlan {
            exercise: vec!["walk".to_string()],
            ..Default::default()
        };
        normalize_to_week(&[day], started_at()).unwrap()
    }

    fn profile() -> NormalizedProfile {
        NormalizedProfile {
            full_name: Some("Ada".to_string()),
            weight_kg: 62.5,
            bmi: 22.1,
            workout_days: 4,
            goal: "weight_loss".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_defaults() {
        let record = build_plan_record(&profile(), week(), "raw", "prompt", started_at());

        assert_eq!(record.plan_name, "Ada's Health Plan");
        assert_eq!(record.status, PlanStatus::Active);
        assert_eq!(record.overall_goal, "weight_loss");
        assert_eq!(record.estimated_duration, "1 month");
        assert_eq!(record.health_guidelines.len(), 4);
        assert!(record.safety_notes.is_empty());
        assert_eq!(record.start_date, started_at());
        assert_eq!(record.raw_ai_response, "raw");
        assert_eq!(record.generated_prompt, "prompt");

        let metrics: Vec<(&str, &str, &str, &str)> = record
            .progress_metrics
            .iter()
            .map(|m| (m.metric_name.as_str(), m.target_value.as_str(), m.current_value.as_str(), m.unit.as_str()))
            .collect();
        assert_eq!(
            metrics,
            vec![
                ("Weight", "62.5", "0", "kg"),
                ("BMI", "22.1", "0", "kg/m²"),
                ("Weekly Exercise Sessions", "4", "0", "sessions"),
            ]
        );
    }

    #[test]
    fn test_unnamed_profile_plan_name() {
        let record = build_plan_record(&NormalizedProfile::default(), week(), "", "", started_at());
        assert_eq!(record.plan_name, "Personal's Health Plan");
    }

    #[test]
    fn test_safety_notes_follow_conditions() {
        let mut with_health = profile();
        with_health.health_conditions = vec!["hypertension".to_string()];
        assert_eq!(build_plan_record(&with_health, week(), "", "", started_at()).safety_notes.len(), 3);

        let mut with_chronic = profile();
        with_chronic.chronic_conditions = vec!["asthma".to_string()];
        let record = build_plan_record(&with_chronic, week(), "", "", started_at());
        assert_eq!(record.safety_notes[0], SAFETY_NOTES[0]);
    }

    #[test]
    fn test_status_transitions() {
        let mut record = build_plan_record(&profile(), week(), "", "", started_at());
        let later = started_at() + Duration::days(30);

        record.set_status(PlanStatus::Paused, later);
        assert_eq!(record.end_date, None);

        record.set_status(PlanStatus::Completed, later);
        assert_eq!(record.status, PlanStatus::Completed);
        assert_eq!(record.end_date, Some(later));
    }

    #[test]
    fn test_rating_and_notes() {
        let mut record = build_plan_record(&profile(), week(), "", "", started_at());
        assert!(record.set_rating(0).is_err());
        assert!(record.set_rating(6).is_err());
        record.set_rating(5).unwrap();
        assert_eq!(record.rating, Some(5));

        record.add_note("   ", started_at());
        record.add_note(" felt great ", started_at());
        assert_eq!(record.user_notes.len(), 1);
        assert_eq!(record.user_notes[0].note, "felt great");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Paused".parse::<PlanStatus>().unwrap(), PlanStatus::Paused);
        assert!("archived".parse::<PlanStatus>().is_err());
    }
}
