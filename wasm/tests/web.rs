//! Browser tests for the exported bindings
//!
//! Run with `wasm-pack test --headless --firefox wasm`.

#![cfg(target_arch = "wasm32")]

use serde_json::Value;
use vitatone_wasm::{calculate_bmi, calculate_metrics, display_measurements, normalize_plan, parse_count};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn bmi_is_rounded_and_rejects_unrealistic_input() {
    assert_eq!(calculate_bmi(70.0, 175.0), Some(22.9));
    assert_eq!(calculate_bmi(0.0, 175.0), None);
}

#[wasm_bindgen_test]
fn metrics_cross_the_boundary_as_json() {
    let json = calculate_metrics(70.0, 175.0, 30, true, "moderately_active")
        .ok()
        .expect("metrics for a valid profile");
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["bmr"], 1649);

    assert!(calculate_metrics(70.0, 175.0, 0, true, "").is_err());
}

#[wasm_bindgen_test]
fn plan_preview_from_raw_output() {
    let raw = r#"[{"food": {"breakfast": ["Oats"]}, "exercise": ["Walk"]}]"#;
    let json = normalize_plan(raw, 1_709_510_400_000.0)
        .ok()
        .expect("plan for a valid timestamp");
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(7));

    assert_eq!(
        normalize_plan("no plan here", 1_709_510_400_000.0).ok().as_deref(),
        Some("null")
    );
    assert!(normalize_plan(raw, f64::MAX).is_err());
}

#[wasm_bindgen_test]
fn measurements_and_counts() {
    let value: Value = serde_json::from_str(&display_measurements(70.0, 175.0, "imperial")).unwrap();
    assert_eq!(value["weight_unit"], "lbs");
    assert_eq!(parse_count("5 days", 3), 5);
}
