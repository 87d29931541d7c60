//! Turning Stripe objects into subscription rows.

use chrono::{DateTime, Months, TimeZone, Utc};
use domain::models::subscription::{PlanType, SubscriptionStatus, SubscriptionUpsert};
use thiserror::Error;
use uuid::Uuid;

use super::stripe::{CheckoutSession, Expandable, StripeSubscription};
use crate::error::ApiError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    #[error("Checkout session is not complete")]
    Incomplete,

    #[error("Checkout session belongs to another account")]
    WrongAccount,

    #[error("Checkout session carries no account reference")]
    MissingAccount,

    #[error("Checkout session carries no valid plan")]
    MissingPlan,

    #[error("Subscription of this checkout is no longer active")]
    InactiveSubscription,
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

fn session_user_id(session: &CheckoutSession) -> Option<Uuid> {
    session
        .client_reference_id
        .as_deref()
        .or_else(|| session.metadata.get("user_id").map(String::as_str))
        .and_then(|id| Uuid::parse_str(id).ok())
}

fn session_plan(session: &CheckoutSession) -> Option<PlanType> {
    let expanded = session.subscription.as_ref().and_then(Expandable::as_object);
    session
        .metadata
        .get("plan_type")
        .or_else(|| expanded.and_then(|s| s.metadata.get("plan_type")))
        .and_then(|plan| plan.parse().ok())
}

fn timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| Utc.timestamp_opt(s, 0).single())
}

/// Period bounds reported by Stripe, if both are present.
pub fn subscription_period(sub: &StripeSubscription) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    Some((
        timestamp(sub.current_period_start)?,
        timestamp(sub.current_period_end)?,
    ))
}

/// Builds the active subscription for a completed checkout.
///
/// When `caller` is given the session must belong to that account. The
/// paid period comes from the expanded subscription, or one month from
/// `now` when Stripe did not include it. An expanded subscription that
/// Stripe no longer reports as active is refused, so replaying an old
/// session cannot revive a canceled plan.
pub fn subscription_from_session(
    session: &CheckoutSession,
    caller: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<SubscriptionUpsert, BillingError> {
    let user_id = session_user_id(session).ok_or(BillingError::MissingAccount)?;
    if caller.is_some_and(|caller| caller != user_id) {
        return Err(BillingError::WrongAccount);
    }
    if !session.is_complete() {
        return Err(BillingError::Incomplete);
    }
    let plan_type = session_plan(session).ok_or(BillingError::MissingPlan)?;

    let expanded = session.subscription.as_ref().and_then(Expandable::as_object);
    if let Some(sub) = expanded {
        if SubscriptionStatus::from_stripe(&sub.status) != Some(SubscriptionStatus::Active) {
            return Err(BillingError::InactiveSubscription);
        }
    }

    let (current_period_start, current_period_end) = expanded
        .and_then(subscription_period)
        .unwrap_or_else(|| (now, now.checked_add_months(Months::new(1)).unwrap_or(now)));

    Ok(SubscriptionUpsert {
        user_id,
        plan_type,
        status: SubscriptionStatus::Active,
        current_period_start,
        current_period_end,
        stripe_customer_id: session.customer_id().map(str::to_string),
        stripe_subscription_id: session.subscription_id().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn session(value: serde_json::Value) -> CheckoutSession {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_completed_session_without_expansion_gets_one_month() {
        let user_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let upsert = subscription_from_session(
            &session(json!({
                "id": "cs_1",
                "status": "complete",
                "client_reference_id": user_id.to_string(),
                "customer": "cus_9",
                "subscription": "sub_9",
                "metadata": {"plan_type": "premium"}
            })),
            Some(user_id),
            now,
        )
        .unwrap();

        assert_eq!(upsert.user_id, user_id);
        assert_eq!(upsert.plan_type, PlanType::Premium);
        assert_eq!(upsert.status, SubscriptionStatus::Active);
        assert_eq!(upsert.current_period_start, now);
        assert_eq!(
            upsert.current_period_end,
            Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
        );
        assert_eq!(upsert.stripe_customer_id.as_deref(), Some("cus_9"));
        assert_eq!(upsert.stripe_subscription_id.as_deref(), Some("sub_9"));
    }

    #[test]
    fn test_expanded_subscription_period_wins() {
        let user_id = Uuid::new_v4();
        let upsert = subscription_from_session(
            &session(json!({
                "id": "cs_2",
                "payment_status": "paid",
                "metadata": {"user_id": user_id.to_string()},
                "subscription": {
                    "id": "sub_2",
                    "status": "active",
                    "current_period_start": 1_700_000_000,
                    "current_period_end": 1_702_592_000,
                    "metadata": {"plan_type": "master"}
                }
            })),
            None,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(upsert.plan_type, PlanType::Master);
        assert_eq!(
            upsert.current_period_end - upsert.current_period_start,
            Duration::seconds(2_592_000)
        );
    }

    #[test]
    fn test_rejects_other_account() {
        let result = subscription_from_session(
            &session(json!({
                "id": "cs_3",
                "status": "complete",
                "client_reference_id": Uuid::new_v4().to_string(),
                "metadata": {"plan_type": "basic"}
            })),
            Some(Uuid::new_v4()),
            Utc::now(),
        );
        assert_eq!(result.unwrap_err(), BillingError::WrongAccount);
    }

    #[test]
    fn test_rejects_open_session() {
        let user_id = Uuid::new_v4();
        let result = subscription_from_session(
            &session(json!({
                "id": "cs_4",
                "status": "open",
                "payment_status": "unpaid",
                "client_reference_id": user_id.to_string(),
                "metadata": {"plan_type": "basic"}
            })),
            Some(user_id),
            Utc::now(),
        );
        assert_eq!(result.unwrap_err(), BillingError::Incomplete);
    }

    #[test]
    fn test_rejects_unknown_plan() {
        let user_id = Uuid::new_v4();
        let result = subscription_from_session(
            &session(json!({
                "id": "cs_5",
                "status": "complete",
                "client_reference_id": user_id.to_string(),
                "metadata": {"plan_type": "gold"}
            })),
            None,
            Utc::now(),
        );
        assert_eq!(result.unwrap_err(), BillingError::MissingPlan);
    }

    #[test]
    fn test_rejects_canceled_expanded_subscription() {
        let user_id = Uuid::new_v4();
        let result = subscription_from_session(
            &session(json!({
                "id": "cs_6",
                "status": "complete",
                "payment_status": "paid",
                "client_reference_id": user_id.to_string(),
                "metadata": {"plan_type": "premium"},
                "subscription": {
                    "id": "sub_6",
                    "status": "canceled",
                    "current_period_start": 1_600_000_000,
                    "current_period_end": 1_602_592_000
                }
            })),
            Some(user_id),
            Utc::now(),
        );
        assert_eq!(result.unwrap_err(), BillingError::InactiveSubscription);
    }

    #[test]
    fn test_rejects_unpaid_and_incomplete_expanded_subscription() {
        let user_id = Uuid::new_v4();
        for status in ["unpaid", "incomplete_expired", "incomplete"] {
            let result = subscription_from_session(
                &session(json!({
                    "id": "cs_7",
                    "status": "complete",
                    "client_reference_id": user_id.to_string(),
                    "metadata": {"plan_type": "premium"},
                    "subscription": {"id": "sub_7", "status": status}
                })),
                None,
                Utc::now(),
            );
            assert_eq!(result.unwrap_err(), BillingError::InactiveSubscription, "{}", status);
        }
    }

    #[test]
    fn test_accepts_past_due_expanded_subscription() {
        let user_id = Uuid::new_v4();
        let upsert = subscription_from_session(
            &session(json!({
                "id": "cs_8",
                "status": "complete",
                "client_reference_id": user_id.to_string(),
                "metadata": {"plan_type": "premium"},
                "subscription": {"id": "sub_8", "status": "past_due"}
            })),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(upsert.status, SubscriptionStatus::Active);
        assert_eq!(upsert.stripe_subscription_id.as_deref(), Some("sub_8"));
    }
}
