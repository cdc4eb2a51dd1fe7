//! Health metrics calculations module
//!
//! Turns body measurements into BMI, BMR, daily calorie targets and a macro
//! split. Every function here is pure.
//!
//! # Formulas
//!
//! - BMI = weight(kg) / height(m)², rounded to one decimal
//! - BMR (Mifflin-St Jeor) = 10·w + 6.25·h − 5·a + 5 (male) or − 161 (female)
//! - Maintenance = BMR × activity multiplier
//! - Macros from maintenance: 45% carbs (4 kcal/g), 25% protein (4 kcal/g),
//!   30% fat (9 kcal/g)

use crate::errors::{CoreError, CoreResult};
use crate::units::{bmi_formula, cm_to_m};
use crate::validation::{validate_age_years, validate_height_cm, validate_weight_kg};
use serde::{Deserialize, Serialize};

/// Daily deficit/surplus for roughly 1 lb per week
pub const WEEKLY_POUND_DELTA_KCAL: i32 = 500;

/// Lowest weight-loss target we will recommend
pub const MINIMUM_SAFE_CALORIES: i32 = 1200;

const CARB_RATIO: f64 = 0.45;
const PROTEIN_RATIO: f64 = 0.25;
const FAT_RATIO: f64 = 0.30;
const KCAL_PER_GRAM_CARB: f64 = 4.0;
const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

// ============================================================================
// Profile enums
// ============================================================================

/// Biological sex for physiological calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
}

impl std::str::FromStr for BiologicalSex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(BiologicalSex::Male),
            "female" => Ok(BiologicalSex::Female),
            _ => Err(format!("Gender must be either \"male\" or \"female\", got {:?}", s)),
        }
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise, physical job
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Wire label, e.g. `moderately_active`
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtraActive => "extra_active",
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::LightlyActive => "Light exercise 1-3 days/week",
            ActivityLevel::ModeratelyActive => "Moderate exercise 3-5 days/week",
            ActivityLevel::VeryActive => "Hard exercise 6-7 days/week",
            ActivityLevel::ExtraActive => "Very hard exercise or physical job",
        }
    }

    /// Resolve a free-form label, falling back to `Sedentary`
    ///
    /// Calorie calculations never fail on an unrecognised activity level;
    /// they assume the lowest multiplier instead. Use `FromStr` where an
    /// unknown label must be rejected.
    pub fn from_label_lenient(label: &str) -> Self {
        label.parse().unwrap_or(ActivityLevel::Sedentary)
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        ActivityLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| format!("Unknown activity level: {}", s))
    }
}

// ============================================================================
// BMI
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

/// Coarse health-risk band attached to a BMI category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthRisk {
    Low,
    Moderate,
    High,
}

impl BmiCategory {
    /// Half-open BMI range `[min, max)` for this category
    pub fn range(&self) -> (f64, f64) {
        match self {
            BmiCategory::Underweight => (0.0, 18.5),
            BmiCategory::Normal => (18.5, 25.0),
            BmiCategory::Overweight => (25.0, 30.0),
            BmiCategory::Obese => (30.0, f64::INFINITY),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }

    pub fn health_risk(&self) -> HealthRisk {
        match self {
            BmiCategory::Underweight | BmiCategory::Normal => HealthRisk::Low,
            BmiCategory::Overweight => HealthRisk::Moderate,
            BmiCategory::Obese => HealthRisk::High,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => {
                "Consider increasing caloric intake with nutrient-dense foods and consult a healthcare provider."
            }
            BmiCategory::Normal => {
                "Maintain your current healthy lifestyle with balanced diet and regular exercise."
            }
            BmiCategory::Overweight => {
                "Consider reducing caloric intake and increasing physical activity. Consult a healthcare provider for guidance."
            }
            BmiCategory::Obese => {
                "Strongly recommend consulting a healthcare provider for a comprehensive weight management plan."
            }
        }
    }
}

/// Round to one decimal place
#[inline]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round half up to an integer kcal/gram value
///
/// Halves always round toward positive infinity, so shifting the input by a
/// whole number shifts the output by exactly that number.
#[inline]
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Calculate BMI from weight and height, rounded to one decimal
///
/// # Errors
///
/// `InvalidInput` when weight ≤ 0, height ≤ 0, weight > 1000 kg,
/// height > 300 cm, or either value is not finite.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> CoreResult<f64> {
    validate_weight_kg(weight_kg).map_err(CoreError::InvalidInput)?;
    validate_height_cm(height_cm).map_err(CoreError::InvalidInput)?;
    Ok(round_to_tenth(bmi_formula(weight_kg, height_cm)))
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Healthy weight range in kg for a given height (BMI 18.5-25)
pub fn healthy_weight_range_kg(height_cm: f64) -> (f64, f64) {
    let height_m = cm_to_m(height_cm);
    let height_m_sq = height_m * height_m;
    (18.5 * height_m_sq, 25.0 * height_m_sq)
}

/// BMI calculation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    pub value: f64,
    pub category: BmiCategory,
    pub health_risk: HealthRisk,
    pub recommendation: String,
    /// Healthy weight range in kg for this height
    pub healthy_weight_range_kg: (f64, f64),
}

/// Calculate BMI with its classification
pub fn compute_bmi_result(weight_kg: f64, height_cm: f64) -> CoreResult<BmiResult> {
    let value = compute_bmi(weight_kg, height_cm)?;
    let category = classify_bmi(value);
    let (min, max) = healthy_weight_range_kg(height_cm);

    Ok(BmiResult {
        value,
        category,
        health_risk: category.health_risk(),
        recommendation: category.recommendation().to_string(),
        healthy_weight_range_kg: (round_to_tenth(min), round_to_tenth(max)),
    })
}

// ============================================================================
// BMR and calories
// ============================================================================

/// Unrounded Mifflin-St Jeor BMR
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age_years: u32, sex: BiologicalSex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    match sex {
        BiologicalSex::Male => base + 5.0,
        BiologicalSex::Female => base - 161.0,
    }
}

/// Basal Metabolic Rate rounded to the nearest kcal
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age_years: u32, sex: BiologicalSex) -> i32 {
    round_half_up(mifflin_st_jeor(weight_kg, height_cm, age_years, sex))
}

/// Maintenance calories: BMR × activity multiplier, rounded
///
/// Accepts the unrounded BMR so the multiplier is applied before rounding.
pub fn compute_daily_calories(bmr: f64, activity_level: ActivityLevel) -> i32 {
    round_half_up(bmr * activity_level.multiplier())
}

/// Calorie targets derived from maintenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieTargets {
    pub maintenance: i32,
    pub weight_loss: i32,
    pub weight_gain: i32,
}

impl CalorieTargets {
    /// Loss target is maintenance − 500, floored at `MINIMUM_SAFE_CALORIES`
    /// but never raised above maintenance itself.
    pub fn from_maintenance(maintenance: i32) -> Self {
        let floor = MINIMUM_SAFE_CALORIES.min(maintenance);
        Self {
            maintenance,
            weight_loss: (maintenance - WEEKLY_POUND_DELTA_KCAL).max(floor),
            weight_gain: maintenance + WEEKLY_POUND_DELTA_KCAL,
        }
    }
}

/// Target grams of each macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroGrams {
    pub carbs: i32,
    pub protein: i32,
    pub fat: i32,
}

impl MacroGrams {
    pub fn from_calories(calories: i32) -> Self {
        let kcal = f64::from(calories);
        Self {
            carbs: round_half_up(kcal * CARB_RATIO / KCAL_PER_GRAM_CARB),
            protein: round_half_up(kcal * PROTEIN_RATIO / KCAL_PER_GRAM_PROTEIN),
            fat: round_half_up(kcal * FAT_RATIO / KCAL_PER_GRAM_FAT),
        }
    }
}

// ============================================================================
// Combined result
// ============================================================================

/// Inputs for a full metrics calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsInput {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub sex: BiologicalSex,
    pub activity_level: ActivityLevel,
}

/// Everything the calculator derives from a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmr: i32,
    pub maintenance_calories: i32,
    pub weight_loss_calories: i32,
    pub weight_gain_calories: i32,
    pub macro_grams: MacroGrams,
}

/// Compute BMI, BMR, calorie targets and macro split in one pass
///
/// # Errors
///
/// `InvalidInput` for out-of-range weight, height or age.
pub fn compute_metrics(input: &MetricsInput) -> CoreResult<MetricsResult> {
    let bmi = compute_bmi(input.weight_kg, input.height_cm)?;
    validate_age_years(input.age_years).map_err(CoreError::InvalidInput)?;

    let raw_bmr = mifflin_st_jeor(input.weight_kg, input.height_cm, input.age_years, input.sex);
    let maintenance = compute_daily_calories(raw_bmr, input.activity_level);
    let targets = CalorieTargets::from_maintenance(maintenance);

    Ok(MetricsResult {
        bmi,
        bmi_category: classify_bmi(bmi),
        bmr: round_half_up(raw_bmr),
        maintenance_calories: targets.maintenance,
        weight_loss_calories: targets.weight_loss,
        weight_gain_calories: targets.weight_gain,
        macro_grams: MacroGrams::from_calories(maintenance),
    })
}
