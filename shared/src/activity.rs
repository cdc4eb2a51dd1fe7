//! Daily activity tracking and weekly progress summaries

use crate::errors::{CoreError, CoreResult};
use crate::health_metrics::{round_half_up, round_to_tenth};
use crate::validation::validate_weight_kg;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completion share at which a day counts as done
pub const DAY_COMPLETED_THRESHOLD: u8 = 80;

/// Self-reported mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Excellent,
    Good,
    Average,
    Poor,
    VeryPoor,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Excellent => "excellent",
            Mood::Good => "good",
            Mood::Average => "average",
            Mood::Poor => "poor",
            Mood::VeryPoor => "very_poor",
        }
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "excellent" => Ok(Mood::Excellent),
            "good" => Ok(Mood::Good),
            "average" => Ok(Mood::Average),
            "poor" => Ok(Mood::Poor),
            "very_poor" => Ok(Mood::VeryPoor),
            other => Err(format!("Unknown mood: {}", other)),
        }
    }
}

/// Which of the day's meals were eaten as planned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealsCompleted {
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
    pub snacks: bool,
}

impl MealsCompleted {
    fn flags(&self) -> [bool; 4] {
        [self.breakfast, self.lunch, self.dinner, self.snacks]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseCompletion {
    pub exercise_name: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One day of tracked activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub meals_completed: MealsCompleted,
    pub exercises_completed: Vec<ExerciseCompletion>,
    /// Glasses of water
    pub water_intake: u32,
    pub sleep_hours: f64,
    pub weight_kg: Option<f64>,
    /// 1..=10
    pub energy_level: Option<u8>,
    pub mood: Option<Mood>,
    pub daily_notes: Option<String>,
    pub challenges: Vec<String>,
    pub achievements: Vec<String>,
}

/// Partial update posted by the client; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityUpdate {
    pub meals_completed: Option<MealsCompleted>,
    pub exercises_completed: Option<Vec<ExerciseCompletion>>,
    pub water_intake: Option<u32>,
    pub sleep_hours: Option<f64>,
    pub weight_kg: Option<f64>,
    pub energy_level: Option<u8>,
    pub mood: Option<Mood>,
    pub daily_notes: Option<String>,
    pub challenges: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
}

impl DailyActivity {
    /// An untracked day
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            meals_completed: MealsCompleted::default(),
            exercises_completed: Vec::new(),
            water_intake: 0,
            sleep_hours: 0.0,
            weight_kg: None,
            energy_level: None,
            mood: None,
            daily_notes: None,
            challenges: Vec::new(),
            achievements: Vec::new(),
        }
    }

    /// Apply `update` on top of this day, then validate the result
    pub fn merge(mut self, update: ActivityUpdate) -> CoreResult<Self> {
        if let Some(meals) = update.meals_completed {
            self.meals_completed = meals;
        }
        if let Some(exercises) = update.exercises_completed {
            self.exercises_completed = exercises;
        }
        self.water_intake = update.water_intake.unwrap_or(self.water_intake);
        self.sleep_hours = update.sleep_hours.unwrap_or(self.sleep_hours);
        self.weight_kg = update.weight_kg.or(self.weight_kg);
        self.energy_level = update.energy_level.or(self.energy_level);
        self.mood = update.mood.or(self.mood);
        self.daily_notes = update.daily_notes.or(self.daily_notes);
        if let Some(challenges) = update.challenges {
            self.challenges = challenges;
        }
        if let Some(achievements) = update.achievements {
            self.achievements = achievements;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if let Some(level) = self.energy_level {
            if !(1..=10).contains(&level) {
                return Err(CoreError::invalid("Energy level must be between 1 and 10"));
            }
        }
        if !self.sleep_hours.is_finite() || !(0.0..=24.0).contains(&self.sleep_hours) {
            return Err(CoreError::invalid("Sleep hours must be between 0 and 24"));
        }
        if let Some(weight) = self.weight_kg {
            validate_weight_kg(weight).map_err(CoreError::InvalidInput)?;
        }
        Ok(())
    }

    /// Share of tasks done, 0..=100
    ///
    /// The four meal slots always count as tasks, plus one per exercise.
    pub fn completion_percentage(&self) -> u8 {
        let meal_flags = self.meals_completed.flags();
        let total = meal_flags.len() + self.exercises_completed.len();
        let done = meal_flags.iter().filter(|done| **done).count()
            + self.exercises_completed.iter().filter(|e| e.completed).count();

        round_half_up(done as f64 / total as f64 * 100.0) as u8
    }

    pub fn day_completed(&self) -> bool {
        self.completion_percentage() >= DAY_COMPLETED_THRESHOLD
    }

    pub fn summary(&self) -> DailySummary {
        DailySummary {
            date: self.date,
            completion_percentage: self.completion_percentage(),
            day_completed: self.day_completed(),
            meals_completed: self.meals_completed,
            exercises_planned: self.exercises_completed.len(),
            exercises_done: self.exercises_completed.iter().filter(|e| e.completed).count(),
            water_intake: self.water_intake,
            sleep_hours: self.sleep_hours,
            energy_level: self.energy_level,
            mood: self.mood,
            achievements: self.achievements.clone(),
            challenges: self.challenges.clone(),
        }
    }
}

/// Compact view of one tracked day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub completion_percentage: u8,
    pub day_completed: bool,
    pub meals_completed: MealsCompleted,
    pub exercises_planned: usize,
    pub exercises_done: usize,
    pub water_intake: u32,
    pub sleep_hours: f64,
    pub energy_level: Option<u8>,
    pub mood: Option<Mood>,
    pub achievements: Vec<String>,
    pub challenges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReading {
    pub date: NaiveDate,
    pub level: u8,
}

/// Aggregate over a week of tracked days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyProgressSummary {
    pub total_days: usize,
    pub completed_days: usize,
    pub average_completion: u8,
    pub total_water_intake: u32,
    pub average_sleep: f64,
    pub mood_distribution: BTreeMap<Mood, u32>,
    pub energy_levels: Vec<EnergyReading>,
}

impl WeeklyProgressSummary {
    pub fn from_activities(activities: &[DailyActivity]) -> Self {
        let total_days = activities.len();

        let (average_completion, average_sleep) = if total_days == 0 {
            (0, 0.0)
        } else {
            let completion_sum: u32 = activities
                .iter()
                .map(|a| u32::from(a.completion_percentage()))
                .sum();
            let sleep_sum: f64 = activities.iter().map(|a| a.sleep_hours).sum();
            (
                round_half_up(f64::from(completion_sum) / total_days as f64) as u8,
                round_to_tenth(sleep_sum / total_days as f64),
            )
        };

        let mut mood_distribution = BTreeMap::new();
        for mood in activities.iter().filter_map(|a| a.mood) {
            *mood_distribution.entry(mood).or_insert(0) += 1;
        }

        Self {
            total_days,
            completed_days: activities.iter().filter(|a| a.day_completed()).count(),
            average_completion,
            total_water_intake: activities.iter().map(|a| a.water_intake).sum(),
            average_sleep,
            mood_distribution,
            energy_levels: activities
                .iter()
                .filter_map(|a| a.energy_level.map(|level| EnergyReading { date: a.date, level }))
                .collect(),
        }
    }
}

/// Monday of the week containing `date`
///
/// # Errors
///
/// `InvalidInput` when that Monday falls before the earliest representable date.
pub fn week_start(date: NaiveDate) -> CoreResult<NaiveDate> {
    let offset = Duration::days(i64::from(date.weekday().num_days_from_monday()));
    date.checked_sub_signed(offset)
        .ok_or_else(|| CoreError::invalid(format!("No week starts before {}", date)))
}

/// Half-open `[start, start + 7 days)` range
///
/// # Errors
///
/// `InvalidInput` when the week runs past the latest representable date.
pub fn week_range(start: NaiveDate) -> CoreResult<(NaiveDate, NaiveDate)> {
    start
        .checked_add_signed(Duration::days(7))
        .map(|until| (start, until))
        .ok_or_else(|| CoreError::invalid(format!("Week starting {} is out of range", start)))
}
