//! Stateless BMI and calorie calculators

use crate::error::ApiError;
use chrono::Utc;
use vitatone_shared::health_metrics::{
    compute_bmi_result, compute_metrics, ActivityLevel, BiologicalSex, MetricsInput,
};
use vitatone_shared::types::{BmiRequest, BmiResponse, CaloriesRequest, CaloriesResponse};
use vitatone_shared::units::{HeightUnit, WeightUnit};

/// Metrics service for business logic
pub struct MetricsService;

impl MetricsService {
    /// BMI with category, risk and healthy weight range
    ///
    /// Weight and height default to kg and cm when no unit is given.
    pub fn bmi(request: &BmiRequest) -> Result<BmiResponse, ApiError> {
        let weight_unit = parse_unit::<WeightUnit>(request.weight_unit.as_deref())?;
        let height_unit = parse_unit::<HeightUnit>(request.height_unit.as_deref())?;

        let result = compute_bmi_result(
            weight_unit.to_kg(request.weight),
            height_unit.to_cm(request.height),
        )?;

        Ok(BmiResponse {
            bmi: result.value,
            category: result.category,
            health_risk: result.health_risk,
            recommendation: result.recommendation,
            healthy_weight_range_kg: result.healthy_weight_range_kg,
            calculated_at: Utc::now(),
        })
    }

    /// BMR, maintenance, loss and gain targets with a macro split
    pub fn calories(request: &CaloriesRequest) -> Result<CaloriesResponse, ApiError> {
        let sex: BiologicalSex = request.gender.parse().map_err(ApiError::Validation)?;
        let activity_level = request
            .activity_level
            .as_deref()
            .map(ActivityLevel::from_label_lenient)
            .unwrap_or_default();

        let metrics = compute_metrics(&MetricsInput {
            weight_kg: request.weight,
            height_cm: request.height,
            age_years: request.age,
            sex,
            activity_level,
        })?;

        Ok(CaloriesResponse {
            bmr: metrics.bmr,
            maintenance: metrics.maintenance_calories,
            weight_loss: metrics.weight_loss_calories,
            weight_gain: metrics.weight_gain_calories,
            activity_level: activity_level.as_str().to_string(),
            recommendations: metrics.macro_grams,
            calculated_at: Utc::now(),
        })
    }
}

fn parse_unit<U>(label: Option<&str>) -> Result<U, ApiError>
where
    U: std::str::FromStr<Err = String> + Default,
{
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        Some(label) => label.parse().map_err(ApiError::Validation),
        None => Ok(U::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use vitatone_shared::health_metrics::{classify_bmi, BmiCategory};
    use vitatone_shared::validation::{MAX_HEIGHT_CM, MAX_WEIGHT_KG};

    fn bmi_request(weight: f64, height: f64) -> BmiRequest {
        BmiRequest {
            weight,
            height,
            weight_unit: None,
            height_unit: None,
        }
    }

    #[test]
    fn test_bmi_metric() {
        let response = MetricsService::bmi(&bmi_request(70.0, 175.0)).unwrap();
        assert_eq!(response.bmi, 22.9);
        assert_eq!(response.category, BmiCategory::Normal);
    }

    #[test]
    fn test_bmi_imperial_units() {
        let request = BmiRequest {
            weight: 154.0,
            height: 69.0,
            weight_unit: Some("lbs".to_string()),
            height_unit: Some("inches".to_string()),
        };
        let response = MetricsService::bmi(&request).unwrap();
        assert_eq!(response.category, BmiCategory::Normal);
    }

    #[rstest]
    #[case(0.0, 175.0)]
    #[case(70.0, 0.0)]
    #[case(1200.0, 175.0)]
    fn test_bmi_rejects_unrealistic_input(#[case] weight: f64, #[case] height: f64) {
        assert!(matches!(
            MetricsService::bmi(&bmi_request(weight, height)),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_bmi_rejects_unknown_unit() {
        let mut request = bmi_request(70.0, 175.0);
        request.weight_unit = Some("stone".to_string());
        assert!(matches!(MetricsService::bmi(&request), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_calories_pinned_example() {
        let request = CaloriesRequest {
            weight: 70.0,
            height: 175.0,
            age: 30,
            gender: "male".to_string(),
            activity_level: Some("moderately_active".to_string()),
        };
        let response = MetricsService::calories(&request).unwrap();
        assert_eq!(response.bmr, 1649);
        assert_eq!(response.maintenance, 2556);
        assert_eq!(response.weight_loss, 2056);
        assert_eq!(response.weight_gain, 3056);
        assert_eq!(response.recommendations.carbs, 288);
    }

    #[test]
    fn test_calories_unknown_activity_is_sedentary() {
        let request = CaloriesRequest {
            weight: 70.0,
            height: 175.0,
            age: 30,
            gender: "female".to_string(),
            activity_level: Some("couch".to_string()),
        };
        let response = MetricsService::calories(&request).unwrap();
        assert_eq!(response.activity_level, "sedentary");
    }

    #[test]
    fn test_calories_requires_binary_sex() {
        let request = CaloriesRequest {
            weight: 70.0,
            height: 175.0,
            age: 30,
            gender: "other".to_string(),
            activity_level: None,
        };
        assert!(matches!(
            MetricsService::calories(&request),
            Err(ApiError::Validation(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_bmi_accepts_exactly_the_valid_range(
            weight in -10.0f64..1200.0,
            height in -10.0f64..350.0,
        ) {
            let valid = weight > 0.0 && weight <= MAX_WEIGHT_KG && height > 0.0 && height <= MAX_HEIGHT_CM;
            match MetricsService::bmi(&bmi_request(weight, height)) {
                Ok(response) => {
                    prop_assert!(valid);
                    prop_assert_eq!(response.category, classify_bmi(response.bmi));
                    let (low, high) = response.healthy_weight_range_kg;
                    prop_assert!(low <= high);
                }
                Err(ApiError::Validation(_)) => prop_assert!(!valid),
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }

        #[test]
        fn prop_calorie_targets_bracket_maintenance(
            weight in 30.0f64..250.0,
            height in 120.0f64..220.0,
            age in 18u32..90,
            male in any::<bool>(),
        ) {
            let request = CaloriesRequest {
                weight,
                height,
                age,
                gender: if male { "male" } else { "female" }.to_string(),
                activity_level: Some("very_active".to_string()),
            };
            let response = MetricsService::calories(&request).unwrap();
            prop_assert!(response.weight_loss <= response.maintenance);
            prop_assert!(response.maintenance < response.weight_gain);
            prop_assert!(response.bmr <= response.maintenance);
        }
    }
}
