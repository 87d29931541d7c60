//! Subscription repository and the Stripe webhook idempotency ledger.

use chrono::{DateTime, Utc};
use domain::models::subscription::SubscriptionUpsert;
use domain::models::{Subscription, SubscriptionStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PlanTypeDb, SubscriptionEntity, SubscriptionStatusDb};
use crate::metrics::QueryTimer;

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, plan_type, status, current_period_start, current_period_end, stripe_customer_id, stripe_subscription_id, cancel_at_period_end, created_at, updated_at";

/// Repository for subscription database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Subscription>, sqlx::Error> {
        let timer = QueryTimer::new("find_subscription_by_user");
        let sql = format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1");
        let result = sqlx::query_as::<_, SubscriptionEntity>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    pub async fn find_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let timer = QueryTimer::new("find_subscription_by_stripe_id");
        let sql = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE stripe_subscription_id = $1"
        );
        let result = sqlx::query_as::<_, SubscriptionEntity>(&sql)
            .bind(stripe_subscription_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Inserts or replaces the tenant's single subscription row.
    ///
    /// A row already tied to the same Stripe subscription that has been
    /// canceled or expired is left alone and `None` is returned; a replayed
    /// checkout must not revive it.
    pub async fn upsert(
        &self,
        input: &SubscriptionUpsert,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let timer = QueryTimer::new("upsert_subscription");
        let sql = format!(
            r#"
            INSERT INTO subscriptions (
                user_id, plan_type, status, current_period_start, current_period_end,
                stripe_customer_id, stripe_subscription_id, cancel_at_period_end
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE)
            ON CONFLICT (user_id) DO UPDATE SET
                plan_type = EXCLUDED.plan_type,
                status = EXCLUDED.status,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                stripe_customer_id = COALESCE(EXCLUDED.stripe_customer_id, subscriptions.stripe_customer_id),
                stripe_subscription_id = COALESCE(EXCLUDED.stripe_subscription_id, subscriptions.stripe_subscription_id),
                cancel_at_period_end = FALSE
            WHERE subscriptions.status = 'active'
                OR EXCLUDED.stripe_subscription_id IS NULL
                OR subscriptions.stripe_subscription_id IS DISTINCT FROM EXCLUDED.stripe_subscription_id
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, SubscriptionEntity>(&sql)
            .bind(input.user_id)
            .bind(PlanTypeDb::from(input.plan_type))
            .bind(SubscriptionStatusDb::from(input.status))
            .bind(input.current_period_start)
            .bind(input.current_period_end)
            .bind(&input.stripe_customer_id)
            .bind(&input.stripe_subscription_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Applies a `customer.subscription.updated` notification. `status` is
    /// left untouched when `None`.
    pub async fn update_from_stripe(
        &self,
        stripe_subscription_id: &str,
        status: Option<SubscriptionStatus>,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
        cancel_at_period_end: bool,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let timer = QueryTimer::new("update_subscription_from_stripe");
        let sql = format!(
            r#"
            UPDATE subscriptions
            SET
                status = COALESCE($2, status),
                current_period_start = COALESCE($3, current_period_start),
                current_period_end = COALESCE($4, current_period_end),
                cancel_at_period_end = $5
            WHERE stripe_subscription_id = $1
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, SubscriptionEntity>(&sql)
            .bind(stripe_subscription_id)
            .bind(status.map(SubscriptionStatusDb::from))
            .bind(period_start)
            .bind(period_end)
            .bind(cancel_at_period_end)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Applies `customer.subscription.deleted`.
    pub async fn mark_expired_by_stripe_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("expire_subscription_by_stripe_id");
        let result = sqlx::query(
            "UPDATE subscriptions SET status = 'expired', cancel_at_period_end = FALSE WHERE stripe_subscription_id = $1",
        )
        .bind(stripe_subscription_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Cancels the tenant's active subscription at the end of the paid period.
    pub async fn mark_canceled(&self, user_id: Uuid) -> Result<Option<Subscription>, sqlx::Error> {
        let timer = QueryTimer::new("cancel_subscription");
        let sql = format!(
            r#"
            UPDATE subscriptions
            SET status = 'canceled', cancel_at_period_end = TRUE
            WHERE user_id = $1 AND status = 'active'
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, SubscriptionEntity>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result?.map(Into::into))
    }

    /// Expires live subscriptions whose paid period ended before `cutoff`.
    pub async fn expire_lapsed(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("expire_lapsed_subscriptions");
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'expired', cancel_at_period_end = FALSE
            WHERE status IN ('active', 'canceled') AND current_period_end < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Records a webhook event ID. Returns `false` when it was already seen.
    pub async fn record_stripe_event(
        &self,
        event_id: &str,
        event_type: &str,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("record_stripe_event");
        let result = sqlx::query(
            "INSERT INTO stripe_events (id, event_type) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(event_id)
        .bind(event_type)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() == 1)
    }

    /// Forgets a recorded event so a failed delivery can be retried.
    pub async fn forget_stripe_event(&self, event_id: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("forget_stripe_event");
        let result = sqlx::query("DELETE FROM stripe_events WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result?;
        Ok(())
    }
}
