//! Background job scheduler and job implementations.

mod expire_subscriptions;
mod housekeeping;
mod overdue_payments;
mod pool_metrics;
mod scheduler;

pub use expire_subscriptions::ExpireSubscriptionsJob;
pub use housekeeping::HousekeepingJob;
pub use overdue_payments::OverduePaymentsJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{run_job, Job, JobFrequency, JobScheduler};

use crate::app::AppState;

/// Scheduler with every recurring job registered, not yet started.
pub fn build_scheduler(state: &AppState) -> JobScheduler {
    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(state.pool.clone()));
    scheduler.register(OverduePaymentsJob::new(state.pool.clone()));
    scheduler.register(ExpireSubscriptionsJob::new(
        state.pool.clone(),
        state.config.jobs.subscription_grace_days,
    ));
    scheduler.register(HousekeepingJob::new(
        state.pool.clone(),
        state.rate_limiter.clone(),
    ));
    scheduler
}
