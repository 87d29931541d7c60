use persistence::repositories::UserRepository;
use sqlx::PgPool;
use std::sync::Arc;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::RateLimiterState;

/// Deletes expired sessions and drops idle rate-limit buckets.
pub struct HousekeepingJob {
    users: UserRepository,
    rate_limiter: Option<Arc<RateLimiterState>>,
}

impl HousekeepingJob {
    pub fn new(pool: PgPool, rate_limiter: Option<Arc<RateLimiterState>>) -> Self {
        Self {
            users: UserRepository::new(pool),
            rate_limiter,
        }
    }
}

#[async_trait::async_trait]
impl Job for HousekeepingJob {
    fn name(&self) -> &'static str {
        "housekeeping"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(30)
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let removed = self.users.delete_expired_sessions().await?;
        if removed > 0 {
            tracing::info!(removed, "Deleted expired sessions");
        }
        if let Some(limiter) = &self.rate_limiter {
            limiter.prune();
        }
        Ok(())
    }
}
