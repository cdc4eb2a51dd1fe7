//! Usage overview and health tips

use crate::error::ApiError;
use crate::repositories::HealthStore;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::instrument;
use vitatone_shared::stats::{UsageStats, ACTIVE_PROFILE_DAYS, RECENT_ACTIVITY_DAYS};
use vitatone_shared::tips::{TipCategory, TipResponse};

pub struct StatsService;

impl StatsService {
    /// Service-wide counts and rates as of `now`
    #[instrument(skip(store))]
    pub async fn usage(store: &dyn HealthStore, now: DateTime<Utc>) -> Result<UsageStats, ApiError> {
        let counts = store
            .usage_counts(
                now - Duration::days(ACTIVE_PROFILE_DAYS),
                now - Duration::days(RECENT_ACTIVITY_DAYS),
            )
            .await?;
        Ok(UsageStats::from(counts))
    }

    /// A random tip from the requested category
    pub fn tip<R: Rng + ?Sized>(category: &str, rng: &mut R) -> TipResponse {
        let count = TipCategory::resolve(category).tips().len();
        TipResponse::pick(category, rng.gen_range(0..count))
    }
}
