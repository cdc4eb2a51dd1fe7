//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the store and the text generator.

pub mod activity;
pub mod advice;
pub mod metrics;
pub mod plan;
pub mod profile;
pub mod stats;

pub use activity::ActivityService;
pub use advice::AdviceService;
pub use metrics::MetricsService;
pub use plan::PlanService;
pub use profile::ProfileService;
pub use stats::StatsService;
