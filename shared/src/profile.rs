//! Profile input normalization
//!
//! `ProfileInput` is what the health form posts: loosely typed, with counts as
//! free text and list fields split across several keys. `normalize` resolves
//! it against either the stored profile or the new-profile defaults.

use crate::errors::{CoreError, CoreResult};
use crate::fields::{collect_entries, extract_integer, extract_number, non_empty_text};
use crate::health_metrics::{compute_bmi, ActivityLevel, BiologicalSex, MetricsInput};
use crate::units::{HeightUnit, WeightUnit};
use crate::validation::{validate_date_of_birth, validate_email, validate_gender, ValidationError};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gender as stored on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Sex used by the BMR formula, when one applies
    pub fn biological_sex(&self) -> Option<BiologicalSex> {
        match self {
            Gender::Male => Some(BiologicalSex::Male),
            Gender::Female => Some(BiologicalSex::Female),
            Gender::Other => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_gender(s)?;
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Ok(Gender::Other),
        }
    }
}

/// Raw profile form as posted by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "dob")]
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub current_weight: Value,
    pub current_height: Value,
    /// Unit of `current_weight`, kg when absent
    pub weight_unit: Option<String>,
    /// Unit of `current_height`, cm when absent
    pub height_unit: Option<String>,
    /// Client-side BMI; ignored, always recomputed
    pub bmi: Value,
    pub goal: Option<String>,
    pub exercise_frequency: Option<String>,
    pub diet_preference: Option<String>,
    pub meals_per_day: Value,
    pub plan_duration: Option<String>,
    pub fav_nutrition_type: Option<String>,
    pub food_allergies: Value,
    pub food_allergies2: Value,
    pub other_food_allergies: Value,
    pub nutrition_days: Value,
    pub meals_num: Value,
    pub fav_workout: Option<String>,
    pub workout_goal: Option<String>,
    pub workout_days: Value,
    pub health_conditions: Value,
    pub other_health_conditions: Value,
    pub chronic_conditions: Value,
    pub other_chronic_conditions: Value,
    pub activity_level: Option<String>,
}

/// Canonical profile after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub goal: String,
    pub exercise_frequency: String,
    pub diet_preference: String,
    pub meals_per_day: i64,
    pub plan_duration: String,
    pub fav_nutrition_type: Option<String>,
    pub food_allergies: Vec<String>,
    pub nutrition_days: i64,
    pub meals_num: i64,
    pub fav_workout: Option<String>,
    pub workout_goal: Option<String>,
    pub workout_days: i64,
    pub health_conditions: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub activity_level: ActivityLevel,
}

impl Default for NormalizedProfile {
    /// Values a brand-new profile falls back to
    fn default() -> Self {
        Self {
            full_name: None,
            email: None,
            date_of_birth: None,
            gender: Gender::Other,
            weight_kg: 70.0,
            height_cm: 170.0,
            // 70 / 1.7² rounded
            bmi: 24.2,
            goal: "general_health".to_string(),
            exercise_frequency: "moderate".to_string(),
            diet_preference: "balanced".to_string(),
            meals_per_day: 3,
            plan_duration: "1 month".to_string(),
            fav_nutrition_type: None,
            food_allergies: Vec::new(),
            nutrition_days: 7,
            meals_num: 3,
            fav_workout: None,
            workout_goal: None,
            workout_days: 5,
            health_conditions: Vec::new(),
            chronic_conditions: Vec::new(),
            activity_level: ActivityLevel::Sedentary,
        }
    }
}

impl NormalizedProfile {
    /// Whole years of age on `today`, when a birth date is known
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| today.years_since(dob))
    }

    /// Calculator input, when age and a binary sex are known
    pub fn metrics_input(&self, today: NaiveDate) -> Option<MetricsInput> {
        Some(MetricsInput {
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            age_years: self.age_on(today)?,
            sex: self.gender.biological_sex()?,
            activity_level: self.activity_level,
        })
    }

    /// Whether any health or chronic condition was declared
    pub fn has_conditions(&self) -> bool {
        !self.health_conditions.is_empty() || !self.chronic_conditions.is_empty()
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Personal")
    }
}

fn field_error(field: &str, message: String) -> CoreError {
    CoreError::InvalidInput(ValidationError::new(field, message).user_message())
}

fn parse_birth_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| format!("Could not read date {:?}, expected YYYY-MM-DD", raw))
}

impl ProfileInput {
    /// Resolve this form into a canonical profile
    ///
    /// Fields the form leaves out fall back to `existing` when given, else to
    /// `NormalizedProfile::default()`. Allergy and condition lists always come
    /// from the form. BMI is recomputed from the resolved weight and height.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a malformed email, birth date, gender or unit, or
    /// for weight/height outside the accepted ranges.
    pub fn normalize(
        &self,
        existing: Option<&NormalizedProfile>,
        today: NaiveDate,
    ) -> CoreResult<NormalizedProfile> {
        let defaults = NormalizedProfile::default();
        let base = existing.unwrap_or(&defaults);

        let email = match non_empty_text(self.email.as_deref()) {
            Some(email) => {
                validate_email(&email).map_err(|m| field_error("email", m))?;
                Some(email.to_lowercase())
            }
            None => base.email.clone(),
        };

        let date_of_birth = match non_empty_text(self.date_of_birth.as_deref()) {
            Some(raw) => {
                let dob = parse_birth_date(&raw).map_err(|m| field_error("date_of_birth", m))?;
                validate_date_of_birth(dob, today).map_err(|m| field_error("date_of_birth", m))?;
                Some(dob)
            }
            None => base.date_of_birth,
        };

        let gender = match non_empty_text(self.gender.as_deref()) {
            Some(raw) => raw.parse::<Gender>().map_err(|m| field_error("gender", m))?,
            None => base.gender,
        };

        let weight_unit = match non_empty_text(self.weight_unit.as_deref()) {
            Some(raw) => raw.parse::<WeightUnit>().map_err(|m| field_error("weight_unit", m))?,
            None => WeightUnit::Kg,
        };
        let height_unit = match non_empty_text(self.height_unit.as_deref()) {
            Some(raw) => raw.parse::<HeightUnit>().map_err(|m| field_error("height_unit", m))?,
            None => HeightUnit::Cm,
        };

        let weight_kg = extract_number(&self.current_weight)
            .map(|w| weight_unit.to_kg(w))
            .unwrap_or(base.weight_kg);
        let height_cm = extract_number(&self.current_height)
            .map(|h| height_unit.to_cm(h))
            .unwrap_or(base.height_cm);
        let bmi = compute_bmi(weight_kg, height_cm)?;

        let activity_level = non_empty_text(self.activity_level.as_deref())
            .map(|label| ActivityLevel::from_label_lenient(&label))
            .unwrap_or(base.activity_level);

        let text_or = |value: &Option<String>, fallback: &String| {
            non_empty_text(value.as_deref()).unwrap_or_else(|| fallback.clone())
        };
        let optional_text_or = |value: &Option<String>, fallback: &Option<String>| {
            non_empty_text(value.as_deref()).or_else(|| fallback.clone())
        };
        let count_or = |value: &Value, fallback: i64| extract_integer(value, Some(fallback)).unwrap_or(fallback);

        Ok(NormalizedProfile {
            full_name: optional_text_or(&self.full_name, &base.full_name),
            email,
            date_of_birth,
            gender,
            weight_kg,
            height_cm,
            bmi,
            goal: text_or(&self.goal, &base.goal),
            exercise_frequency: text_or(&self.exercise_frequency, &base.exercise_frequency),
            diet_preference: text_or(&self.diet_preference, &base.diet_preference),
            meals_per_day: count_or(&self.meals_per_day, base.meals_per_day),
            plan_duration: text_or(&self.plan_duration, &base.plan_duration),
            fav_nutrition_type: optional_text_or(&self.fav_nutrition_type, &base.fav_nutrition_type),
            food_allergies: collect_entries([
                &self.food_allergies,
                &self.food_allergies2,
                &self.other_food_allergies,
            ]),
            nutrition_days: count_or(&self.nutrition_days, base.nutrition_days),
            meals_num: count_or(&self.meals_num, base.meals_num),
            fav_workout: optional_text_or(&self.fav_workout, &base.fav_workout),
            workout_goal: optional_text_or(&self.workout_goal, &base.workout_goal),
            workout_days: count_or(&self.workout_days, base.workout_days),
            health_conditions: collect_entries([&self.health_conditions, &self.other_health_conditions]),
            chronic_conditions: collect_entries([&self.chronic_conditions, &self.other_chronic_conditions]),
            activity_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health_metrics::compute_metrics;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn input(body: Value) -> ProfileInput {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = ProfileInput::default().normalize(None, today()).unwrap();

        assert_eq!(profile.weight_kg, 70.0);
        assert_eq!(profile.height_cm, 170.0);
        assert_eq!(profile.bmi, 24.2);
        assert_eq!(profile.gender, Gender::Other);
        assert_eq!(profile.goal, "general_health");
        assert_eq!(profile.exercise_frequency, "moderate");
        assert_eq!(profile.diet_preference, "balanced");
        assert_eq!(profile.meals_per_day, 3);
        assert_eq!(profile.plan_duration, "1 month");
        assert_eq!(profile.nutrition_days, 7);
        assert_eq!(profile.meals_num, 3);
        assert_eq!(profile.workout_days, 5);
        assert_eq!(profile.activity_level, ActivityLevel::Sedentary);
    }

    #[test]
    fn test_free_text_fields_are_coerced() {
        let profile = input(json!({
            "full_name": "Ada Lovelace",
            "email": "  Ada@Example.COM ",
            "dob": "1994-05-01",
            "gender": "Female",
            "current_weight": "62.5 kg",
            "current_height": 168,
            "meals_per_day": "4 meals (main + snacks)",
            "workout_days": "five_days",
            "nutrition_days": 6.0,
            "food_allergies": ["peanuts", " "],
            "other_food_allergies": " shellfish ",
            "chronic_conditions": "asthma",
            "activity_level": "very_active"
        }))
        .normalize(None, today())
        .unwrap();

        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(profile.date_of_birth, NaiveDate::from_ymd_opt(1994, 5, 1));
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.weight_kg, 62.5);
        assert_eq!(profile.meals_per_day, 4);
        assert_eq!(profile.workout_days, 5);
        assert_eq!(profile.nutrition_days, 6);
        assert_eq!(profile.food_allergies, vec!["peanuts", "shellfish"]);
        assert!(profile.health_conditions.is_empty());
        assert!(profile.has_conditions());
        assert_eq!(profile.activity_level, ActivityLevel::VeryActive);
        assert_eq!(profile.age_on(today()), Some(30));
    }

    #[test]
    fn test_existing_profile_supplies_fallbacks() {
        let existing = input(json!({
            "full_name": "Grace",
            "email": "grace@example.com",
            "current_weight": 80,
            "goal": "weight_loss",
            "workout_days": 3,
            "food_allergies": "gluten"
        }))
        .normalize(None, today())
        .unwrap();

        let updated = input(json!({ "current_height": 180, "meals_per_day": "n/a" }))
            .normalize(Some(&existing), today())
            .unwrap();

        assert_eq!(updated.full_name.as_deref(), Some("Grace"));
        assert_eq!(updated.email.as_deref(), Some("grace@example.com"));
        assert_eq!(updated.weight_kg, 80.0);
        assert_eq!(updated.height_cm, 180.0);
        assert_eq!(updated.bmi, 24.7);
        assert_eq!(updated.goal, "weight_loss");
        assert_eq!(updated.workout_days, 3);
        assert_eq!(updated.meals_per_day, 3);
        // Lists are replaced, not merged
        assert!(updated.food_allergies.is_empty());
    }

    #[test]
    fn test_imperial_units() {
        let profile = input(json!({
            "current_weight": 154,
            "weight_unit": "lbs",
            "current_height": 70,
            "height_unit": "in"
        }))
        .normalize(None, today())
        .unwrap();

        assert!((profile.weight_kg - 69.853).abs() < 0.01);
        assert!((profile.height_cm - 177.8).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_fields_rejected() {
        for body in [
            json!({ "email": "not-an-email" }),
            json!({ "dob": "yesterday" }),
            json!({ "dob": "2030-01-01" }),
            json!({ "gender": "robot" }),
            json!({ "current_weight": 1500 }),
            json!({ "current_height": 0 }),
            json!({ "weight_unit": "stone" }),
        ] {
            let result = input(body.clone()).normalize(None, today());
            assert!(
                matches!(result, Err(CoreError::InvalidInput(_))),
                "{} should be rejected",
                body
            );
        }
    }

    #[test]
    fn test_metrics_input_requires_age_and_binary_sex() {
        let without_dob = input(json!({ "gender": "male" })).normalize(None, today()).unwrap();
        assert!(without_dob.metrics_input(today()).is_none());

        let other = input(json!({ "gender": "other", "dob": "1990-01-01" }))
            .normalize(None, today())
            .unwrap();
        assert!(other.metrics_input(today()).is_none());

        let complete = input(json!({
            "gender": "male",
            "dob": "1994-01-01",
            "current_weight": 70,
            "current_height": 175,
            "activity_level": "moderately_active"
        }))
        .normalize(None, today())
        .unwrap();
        let metrics = compute_metrics(&complete.metrics_input(today()).unwrap()).unwrap();
        assert_eq!(metrics.maintenance_calories, 2556);
    }

    #[test]
    fn test_fake_profiles_normalize() {
        for _ in 0..20 {
            let name: String = Name().fake();
            let email: String = SafeEmail().fake();
            let weight: f64 = (40.0..150.0).fake();
            let profile = input(json!({
                "full_name": name,
                "email": email,
                "current_weight": weight
            }))
            .normalize(None, today())
            .unwrap();

            assert_eq!(profile.email, Some(email.to_lowercase()));
            assert_eq!(profile.display_name(), name);
        }
    }
}
