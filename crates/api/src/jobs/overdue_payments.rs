use chrono::Utc;
use persistence::repositories::PaymentRepository;
use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};

/// Flags pending payments whose due date has passed.
pub struct OverduePaymentsJob {
    payments: PaymentRepository,
}

impl OverduePaymentsJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            payments: PaymentRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Job for OverduePaymentsJob {
    fn name(&self) -> &'static str {
        "overdue_payments"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let today = Utc::now().date_naive();
        let updated = self.payments.mark_overdue(today).await?;
        if updated > 0 {
            tracing::info!(updated, %today, "Marked payments overdue");
        }
        Ok(())
    }
}
