//! Plan normalizer
//!
//! The text generator is asked for a JSON array of seven days but may return
//! fewer, more, or prose around the JSON. This module extracts whatever day
//! list it can find and turns it into a `WeekPlan`, which always holds
//! exactly seven days.

use crate::errors::{CoreError, CoreResult};
use crate::fields::describe_entries;
use chrono::{DateTime, Duration, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

pub const DAYS_PER_WEEK: usize = 7;

/// Glasses of water per day attached to every planned day
pub const DEFAULT_WATER_GLASSES: u32 = 8;

/// Hours of sleep per night attached to every planned day
pub const DEFAULT_SLEEP_HOURS: u32 = 8;

fn fenced_json_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\n(.*?)\n```").expect("fence pattern is valid"))
}

// ============================================================================
// Day shapes
// ============================================================================

/// Meals for one day
///
/// Each list is read on its own, so one odd field never costs the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodPlan {
    #[serde(deserialize_with = "lenient_entries")]
    pub breakfast: Vec<String>,
    #[serde(deserialize_with = "lenient_entries")]
    pub lunch: Vec<String>,
    #[serde(deserialize_with = "lenient_entries")]
    pub dinner: Vec<String>,
    #[serde(deserialize_with = "lenient_entries")]
    pub snacks: Vec<String>,
}

/// One day as produced by the generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayPlan {
    #[serde(deserialize_with = "lenient_food")]
    pub food: FoodPlan,
    #[serde(deserialize_with = "lenient_entries")]
    pub exercise: Vec<String>,
}

/// A string, an array or object items, as readable entries
fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| describe_entries(&value))
}

/// Meals from an object; anything else is a day without meals
fn lenient_food<'de, D>(deserializer: D) -> Result<FoodPlan, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl DayPlan {
    /// True when the day has no meals and no exercises
    pub fn is_empty(&self) -> bool {
        self.food.breakfast.is_empty()
            && self.food.lunch.is_empty()
            && self.food.dinner.is_empty()
            && self.food.snacks.is_empty()
            && self.exercise.is_empty()
    }
}

/// A day placed on the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedDay {
    /// 1..=7
    pub day: u8,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub plan: DayPlan,
    #[serde(default)]
    pub daily_tips: Vec<String>,
    pub water_intake_goal: u32,
    pub sleep_goal: u32,
}

impl PlannedDay {
    fn place(index: usize, plan: DayPlan, generated_at: DateTime<Utc>) -> Self {
        Self {
            day: (index + 1) as u8,
            date: generated_at + Duration::days(index as i64),
            plan,
            daily_tips: Vec::new(),
            water_intake_goal: DEFAULT_WATER_GLASSES,
            sleep_goal: DEFAULT_SLEEP_HOURS,
        }
    }
}

/// Exactly seven planned days, numbered 1 through 7
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekPlan {
    days: [PlannedDay; DAYS_PER_WEEK],
}

impl WeekPlan {
    pub fn days(&self) -> &[PlannedDay; DAYS_PER_WEEK] {
        &self.days
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlannedDay> {
        self.days.iter()
    }

    /// Plan day (1..=7) for `now` in a plan that started at `start`
    ///
    /// Whole days elapsed cycle through the week; dates before the start wrap
    /// backwards instead of going out of range.
    pub fn day_number_for(start: DateTime<Utc>, now: DateTime<Utc>) -> u8 {
        let elapsed_days = (now - start).num_seconds().div_euclid(86_400);
        (elapsed_days.rem_euclid(DAYS_PER_WEEK as i64) + 1) as u8
    }

    /// The planned day that applies on `now`
    pub fn day_for(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> &PlannedDay {
        let number = Self::day_number_for(start, now);
        self.days
            .iter()
            .find(|day| day.day == number)
            .unwrap_or(&self.days[0])
    }
}

impl<'a> IntoIterator for &'a WeekPlan {
    type Item = &'a PlannedDay;
    type IntoIter = std::slice::Iter<'a, PlannedDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Extract the day list from raw generator output
///
/// Accepts either a bare JSON array (trimmed text starting with `[` and ending
/// with `]`) or an array inside a fenced `json` block. Array elements that are
/// not day-shaped become empty days.
///
/// # Errors
///
/// `UnparseablePlan` when no array can be found or the JSON is malformed.
pub fn try_parse_generated_plan(text: &str) -> CoreResult<Vec<DayPlan>> {
    let trimmed = text.trim();
    let candidate = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        trimmed
    } else {
        fenced_json_block()
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|block| block.as_str())
            .ok_or_else(|| CoreError::UnparseablePlan("no JSON array found in response".to_string()))?
    };

    let parsed: Value = serde_json::from_str(candidate)
        .map_err(|e| CoreError::UnparseablePlan(format!("invalid JSON: {}", e)))?;

    match parsed {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect()),
        other => Err(CoreError::UnparseablePlan(format!(
            "expected a JSON array, found {}",
            json_kind(&other)
        ))),
    }
}

/// Like `try_parse_generated_plan`, discarding the reason
pub fn parse_generated_plan(text: &str) -> Option<Vec<DayPlan>> {
    try_parse_generated_plan(text).ok()
}

/// Whether the last day of a week starting at `start` is representable
pub fn week_fits_after(start: DateTime<Utc>) -> bool {
    start
        .checked_add_signed(Duration::days(DAYS_PER_WEEK as i64 - 1))
        .is_some()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fit a day list to exactly seven days
///
/// Longer lists keep their first seven entries; shorter ones repeat
/// cyclically so day `i` is entry `i mod len`. Days are numbered from 1 and
/// dated one day apart starting at `generated_at`. An empty list has no week,
/// and neither has a start too close to the end of the calendar to fit seven
/// days.
pub fn normalize_to_week(entries: &[DayPlan], generated_at: DateTime<Utc>) -> Option<WeekPlan> {
    if entries.is_empty() || !week_fits_after(generated_at) {
        return None;
    }

    let days = std::array::from_fn(|index| {
        PlannedDay::place(index, entries[index % entries.len()].clone(), generated_at)
    });

    Some(WeekPlan { days })
}
