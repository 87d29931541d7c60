use chrono::{DateTime, Duration, Utc};
use persistence::repositories::SubscriptionRepository;
use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};

/// Expires subscriptions whose paid period ended more than the grace
/// period ago. Stripe usually reports this first; the job covers missed
/// webhooks.
pub struct ExpireSubscriptionsJob {
    subscriptions: SubscriptionRepository,
    grace: Duration,
}

impl ExpireSubscriptionsJob {
    pub fn new(pool: PgPool, grace_days: i64) -> Self {
        Self {
            subscriptions: SubscriptionRepository::new(pool),
            grace: Duration::days(grace_days.max(0)),
        }
    }

    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.grace
    }
}

#[async_trait::async_trait]
impl Job for ExpireSubscriptionsJob {
    fn name(&self) -> &'static str {
        "expire_subscriptions"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let cutoff = self.cutoff(Utc::now());
        let expired = self.subscriptions.expire_lapsed(cutoff).await?;
        if expired > 0 {
            tracing::info!(expired, %cutoff, "Expired lapsed subscriptions");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn test_cutoff_applies_grace() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let job = ExpireSubscriptionsJob::new(pool, 3);
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        assert_eq!(
            job.cutoff(now),
            Utc.with_ymd_and_hms(2024, 5, 7, 8, 0, 0).unwrap()
        );
        assert_eq!(job.name(), "expire_subscriptions");
        assert_eq!(job.frequency(), JobFrequency::Hourly);
    }
}
