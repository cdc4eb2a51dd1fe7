//! Input validation functions
//!
//! Range checks for body measurements and profile fields. Each check returns
//! `Result<(), String>` so callers can wrap the message in whatever error type
//! they surface.

use validator::ValidateEmail;

/// Upper bound for a believable body weight
pub const MAX_WEIGHT_KG: f64 = 1000.0;

/// Upper bound for a believable body height
pub const MAX_HEIGHT_CM: f64 = 300.0;

pub const MIN_AGE_YEARS: u32 = 1;
pub const MAX_AGE_YEARS: u32 = 120;

/// Validate weight value (in kg)
/// Valid range: (0, 1000]
pub fn validate_weight_kg(weight_kg: f64) -> Result<(), String> {
    if !weight_kg.is_finite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg <= 0.0 {
        return Err("Weight and height must be positive numbers".to_string());
    }
    if weight_kg > MAX_WEIGHT_KG {
        return Err("Weight or height values seem unrealistic".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
/// Valid range: (0, 300]
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if !height_cm.is_finite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm <= 0.0 {
        return Err("Weight and height must be positive numbers".to_string());
    }
    if height_cm > MAX_HEIGHT_CM {
        return Err("Weight or height values seem unrealistic".to_string());
    }
    Ok(())
}

/// Validate age in whole years
pub fn validate_age_years(age: u32) -> Result<(), String> {
    if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&age) {
        return Err(format!(
            "Age must be between {} and {} years",
            MIN_AGE_YEARS, MAX_AGE_YEARS
        ));
    }
    Ok(())
}

/// Validate date of birth
/// Must not be in the future, and the age on `today` must be 1..=120
pub fn validate_date_of_birth(dob: chrono::NaiveDate, today: chrono::NaiveDate) -> Result<(), String> {
    if dob > today {
        return Err("Date of birth cannot be in the future".to_string());
    }

    match today.years_since(dob) {
        Some(age) => validate_age_years(age),
        None => Err("Invalid date of birth".to_string()),
    }
}

/// Validate email syntax
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Valid gender values for a stored profile
pub const VALID_GENDERS: &[&str] = &["male", "female", "other"];

/// Validate gender label
pub fn validate_gender(gender: &str) -> Result<(), String> {
    let normalized = gender.trim().to_lowercase();
    if VALID_GENDERS.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(format!(
            "Invalid gender. Must be one of: {}",
            VALID_GENDERS.join(", ")
        ))
    }
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "full_name" => "Full Name",
        "email" => "Email",
        "current_weight" | "weight_kg" => "Current Weight",
        "current_height" | "height_cm" => "Height",
        "date_of_birth" => "Date of Birth",
        "gender" => "Gender",
        "activity_level" => "Activity Level",
        "meals_per_day" => "Meals Per Day",
        "workout_days" => "Workout Days",
        "nutrition_days" => "Nutrition Days",
        "age" => "Age",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}
