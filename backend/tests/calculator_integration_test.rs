//! Integration tests for the BMI and calorie calculators

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_bmi_calculation() {
    let app = common::TestApp::new();

    let (status, body) = app
        .post_json("/api/v1/metrics/bmi", json!({"weight": 70, "height": 175}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bmi"], 22.9);
    assert_eq!(body["category"], "Normal");
    assert!(body["recommendation"].as_str().is_some());
}

#[tokio::test]
async fn test_bmi_rejects_unknown_unit() {
    let app = common::TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/v1/metrics/bmi",
            json!({"weight": 11, "height": 175, "weight_unit": "stone"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_bmi_rejects_missing_fields() {
    let app = common::TestApp::new();

    let (status, _) = app.post("/api/v1/metrics/bmi", r#"{"weight": 70}"#).await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_calorie_calculation() {
    let app = common::TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/v1/metrics/calories",
            json!({
                "weight": 70,
                "height": 175,
                "age": 30,
                "gender": "male",
                "activity_level": "moderately_active"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bmr"], 1649);
    assert_eq!(body["maintenance"], 2556);
    assert_eq!(body["weight_loss"], 2056);
    assert_eq!(body["weight_gain"], 3056);
}

#[tokio::test]
async fn test_calories_default_to_sedentary() {
    let app = common::TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/v1/metrics/calories",
            json!({"weight": 60, "height": 165, "age": 40, "gender": "female"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activity_level"], "sedentary");
}
