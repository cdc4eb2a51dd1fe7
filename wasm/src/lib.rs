//! Vitatone WASM Module
//!
//! Browser bindings for the pure calculators, so the health form can show
//! BMI and calorie targets and preview a plan without a server round trip.

use chrono::{TimeZone, Utc};
use serde_json::Value;
use vitatone_shared::health_metrics::{
    classify_bmi, compute_bmi, compute_metrics, ActivityLevel, BiologicalSex, MetricsInput,
};
use vitatone_shared::plan::week_fits_after;
use vitatone_shared::units::UnitSystem;
use vitatone_shared::{extract_integer, normalize_to_week, parse_generated_plan};
use wasm_bindgen::prelude::*;

/// BMI rounded to one decimal, or `undefined` for unrealistic input
#[wasm_bindgen]
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    compute_bmi(weight_kg, height_cm).ok()
}

/// Display label for a BMI value
#[wasm_bindgen]
pub fn bmi_category_label(bmi: f64) -> String {
    classify_bmi(bmi).description().to_string()
}

/// Full metrics as JSON
#[wasm_bindgen]
pub fn calculate_metrics(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    is_male: bool,
    activity_level: &str,
) -> Result<String, JsError> {
    metrics_json(weight_kg, height_cm, age_years, is_male, activity_level).map_err(|e| JsError::new(&e))
}

fn metrics_json(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    is_male: bool,
    activity_level: &str,
) -> Result<String, String> {
    let input = MetricsInput {
        weight_kg,
        height_cm,
        age_years,
        sex: if is_male {
            BiologicalSex::Male
        } else {
            BiologicalSex::Female
        },
        activity_level: ActivityLevel::from_label_lenient(activity_level),
    };
    let result = compute_metrics(&input).map_err(|e| e.to_string())?;
    serde_json::to_string(&result).map_err(|e| e.to_string())
}

/// Stored body measurements in the user's preferred units, as JSON
///
/// `unit_system` is `"metric"` or `"imperial"`; anything else is metric.
#[wasm_bindgen]
pub fn display_measurements(weight_kg: f64, height_cm: f64, unit_system: &str) -> String {
    let system = match unit_system.trim().to_lowercase().as_str() {
        "imperial" => UnitSystem::Imperial,
        _ => UnitSystem::Metric,
    };
    let (weight_unit, height_unit) = (system.weight_unit(), system.height_unit());
    let round = |value: f64| (value * 10.0).round() / 10.0;

    serde_json::json!({
        "weight": round(weight_unit.from_kg(weight_kg)),
        "weight_unit": weight_unit,
        "height": round(height_unit.from_cm(height_cm)),
        "height_unit": height_unit,
    })
    .to_string()
}

/// Read a count out of free text such as `"5 days"` or `"four meals"`
#[wasm_bindgen]
pub fn parse_count(text: &str, fallback: i32) -> i32 {
    extract_integer(&Value::String(text.to_string()), Some(i64::from(fallback)))
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(fallback)
}

/// Normalize raw generator output into a seven-day plan as JSON
///
/// Returns `"null"` when no plan can be extracted.
#[wasm_bindgen]
pub fn normalize_plan(raw_output: &str, generated_at_ms: f64) -> Result<String, JsError> {
    week_json(raw_output, generated_at_ms).map_err(|e| JsError::new(&e))
}

fn week_json(raw_output: &str, generated_at_ms: f64) -> Result<String, String> {
    let generated_at = Utc
        .timestamp_millis_opt(generated_at_ms as i64)
        .single()
        .filter(|at| week_fits_after(*at))
        .ok_or_else(|| format!("Invalid timestamp: {}", generated_at_ms))?;

    let week = parse_generated_plan(raw_output).and_then(|days| normalize_to_week(&days, generated_at));
    serde_json::to_string(&week).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi() {
        assert_eq!(calculate_bmi(70.0, 175.0), Some(22.9));
        assert_eq!(calculate_bmi(70.0, 0.0), None);
        assert_eq!(bmi_category_label(22.9), "Normal weight");
    }

    #[test]
    fn test_metrics_json() {
        let json = metrics_json(70.0, 175.0, 30, true, "moderately_active").unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["maintenance_calories"], 2556);
        assert_eq!(value["macro_grams"]["protein"], 160);

        assert!(metrics_json(70.0, 175.0, 0, true, "sedentary").is_err());
    }

    #[test]
    fn test_display_measurements() {
        let value: Value =
            serde_json::from_str(&display_measurements(70.0, 175.0, "imperial")).unwrap();
        assert_eq!(value["weight"], 154.3);
        assert_eq!(value["weight_unit"], "lbs");
        assert_eq!(value["height"], 68.9);
        assert_eq!(value["height_unit"], "inches");

        let value: Value = serde_json::from_str(&display_measurements(70.0, 175.0, "")).unwrap();
        assert_eq!(value["weight"], 70.0);
        assert_eq!(value["height_unit"], "cm");
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("5 days", 3), 5);
        assert_eq!(parse_count("two", 3), 2);
        assert_eq!(parse_count("", 3), 3);
    }

    #[test]
    fn test_week_json() {
        let json = week_json(r#"[{"exercise": ["run"]}]"#, 1_709_542_800_000.0).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 7);
        assert_eq!(value[6]["exercise"][0], "run");

        assert_eq!(week_json("no plan here", 0.0).unwrap(), "null");
    }

    #[test]
    fn test_week_json_rejects_timestamp_without_room_for_a_week() {
        let last_ms = chrono::DateTime::<Utc>::MAX_UTC.timestamp_millis() as f64;
        assert!(week_json(r#"[{"exercise": ["run"]}]"#, last_ms).is_err());

        let week_earlier = last_ms - 8.0 * 86_400_000.0;
        assert!(week_json(r#"[{"exercise": ["run"]}]"#, week_earlier).is_ok());
    }
}
