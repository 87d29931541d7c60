//! Subscription entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{PlanType, SubscriptionStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for plan_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "plan_type", rename_all = "lowercase")]
pub enum PlanTypeDb {
    Basic,
    Premium,
    Master,
}

impl From<PlanTypeDb> for PlanType {
    fn from(db: PlanTypeDb) -> Self {
        match db {
            PlanTypeDb::Basic => Self::Basic,
            PlanTypeDb::Premium => Self::Premium,
            PlanTypeDb::Master => Self::Master,
        }
    }
}

impl From<PlanType> for PlanTypeDb {
    fn from(plan: PlanType) -> Self {
        match plan {
            PlanType::Basic => Self::Basic,
            PlanType::Premium => Self::Premium,
            PlanType::Master => Self::Master,
        }
    }
}

/// Database enum for subscription_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
pub enum SubscriptionStatusDb {
    Active,
    Canceled,
    Expired,
}

impl From<SubscriptionStatusDb> for SubscriptionStatus {
    fn from(db: SubscriptionStatusDb) -> Self {
        match db {
            SubscriptionStatusDb::Active => Self::Active,
            SubscriptionStatusDb::Canceled => Self::Canceled,
            SubscriptionStatusDb::Expired => Self::Expired,
        }
    }
}

impl From<SubscriptionStatus> for SubscriptionStatusDb {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Active => Self::Active,
            SubscriptionStatus::Canceled => Self::Canceled,
            SubscriptionStatus::Expired => Self::Expired,
        }
    }
}

/// Database row mapping for the subscriptions table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: PlanTypeDb,
    pub status: SubscriptionStatusDb,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionEntity> for domain::models::Subscription {
    fn from(entity: SubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan_type: entity.plan_type.into(),
            status: entity.status.into(),
            current_period_start: entity.current_period_start,
            current_period_end: entity.current_period_end,
            stripe_customer_id: entity.stripe_customer_id,
            stripe_subscription_id: entity.stripe_subscription_id,
            cancel_at_period_end: entity.cancel_at_period_end,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_type_conversion() {
        assert_eq!(PlanType::from(PlanTypeDb::Master), PlanType::Master);
        assert_eq!(PlanTypeDb::from(PlanType::Basic), PlanTypeDb::Basic);
    }

    #[test]
    fn test_status_conversion() {
        assert_eq!(
            SubscriptionStatus::from(SubscriptionStatusDb::Canceled),
            SubscriptionStatus::Canceled
        );
        assert_eq!(
            SubscriptionStatusDb::from(SubscriptionStatus::Expired),
            SubscriptionStatusDb::Expired
        );
    }
}
