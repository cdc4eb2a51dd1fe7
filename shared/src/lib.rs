//! Vitatone Shared Library
//!
//! The pure core of the health plan engine: unit conversion, BMI/BMR/calorie
//! calculations, profile and plan normalization, and the request/response
//! types shared by the backend and WASM modules.

pub mod activity;
pub mod errors;
pub mod fields;
pub mod health_metrics;
pub mod models;
pub mod plan;
pub mod plan_record;
pub mod profile;
pub mod prompts;
pub mod stats;
pub mod tips;
pub mod types;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use health_metrics::*;
pub use units::*;

pub use activity::{DailyActivity, WeeklyProgressSummary};
pub use fields::{extract_integer, extract_number};
pub use models::{ActivityRecord, HealthPlan, PlanSummary, Profile};
pub use plan::{normalize_to_week, parse_generated_plan, DayPlan, PlannedDay, WeekPlan};
pub use plan_record::{build_plan_record, PlanRecord, PlanStatus};
pub use profile::{Gender, NormalizedProfile, ProfileInput};
